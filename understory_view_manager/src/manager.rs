// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view manager: reconciles views, camera state, and canvas size into
//! viewports and long-lived controllers.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::{fmt, mem};

use hashbrown::HashMap;
use kurbo::Point;
use tracing::{debug, debug_span, trace, warn};

use crate::camera::{CameraState, ViewStates};
use crate::controller::{
    Controller, ControllerConfig, ControllerContext, ControllerKind, ControllerProps, InputEvent,
    InteractionState, InteractionStateCallback, ViewStateCallback, ViewStateChange,
    create_controller,
};
use crate::dirty::DirtyFlag;
use crate::error::InvalidSize;
use crate::id::ViewId;
use crate::view::{View, ViewLike, normalize_views, views_changed};
use crate::viewport::{PixelRegion, ProjectOptions, Viewport};

/// Canvas width and height used until the first size is provided.
pub const DEFAULT_CANVAS_SIZE: f64 = 100.0;

/// A partial update for [`ViewManager::set_props`].
///
/// Every field is optional; absent fields leave the manager's state alone.
#[derive(Clone, Debug, Default)]
pub struct ViewManagerProps {
    /// Replaces the view list.
    pub views: Option<Vec<ViewLike>>,
    /// Replaces the camera state. `Some(None)` is the explicit "no state"
    /// value, which is rejected with a warning and leaves the state unchanged.
    pub view_state: Option<Option<ViewStates>>,
    /// Replaces the canvas width.
    pub width: Option<f64>,
    /// Replaces the canvas height.
    pub height: Option<f64>,
}

impl ViewManagerProps {
    /// An update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the view list.
    #[must_use]
    pub fn views<I>(mut self, views: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ViewLike>,
    {
        self.views = Some(views.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the camera state.
    #[must_use]
    pub fn view_state(mut self, view_state: impl Into<ViewStates>) -> Self {
        self.view_state = Some(Some(view_state.into()));
        self
    }

    /// Passes an explicit "no state" value.
    #[must_use]
    pub fn missing_view_state(mut self) -> Self {
        self.view_state = Some(None);
        self
    }

    /// Sets both canvas dimensions.
    #[must_use]
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the canvas width.
    #[must_use]
    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the canvas height.
    #[must_use]
    pub fn height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

/// Construction-time wiring: where controller output goes.
#[derive(Clone, Default)]
pub struct ViewManagerOptions {
    /// Receives camera changes, tagged with the originating view id.
    pub on_view_state_change: Option<ViewStateCallback>,
    /// Receives interaction state changes from every controller.
    pub on_interaction_state_change: Option<InteractionStateCallback>,
}

impl ViewManagerOptions {
    /// Sets the camera change handler.
    #[must_use]
    pub fn with_view_state_change(mut self, handler: impl Fn(ViewStateChange) + 'static) -> Self {
        self.on_view_state_change = Some(Rc::new(handler));
        self
    }

    /// Sets the interaction state handler.
    #[must_use]
    pub fn with_interaction_state_change(
        mut self,
        handler: impl Fn(InteractionState) + 'static,
    ) -> Self {
        self.on_interaction_state_change = Some(Rc::new(handler));
        self
    }
}

impl fmt::Debug for ViewManagerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManagerOptions")
            .field("on_view_state_change", &self.on_view_state_change.is_some())
            .field(
                "on_interaction_state_change",
                &self.on_interaction_state_change.is_some(),
            )
            .finish()
    }
}

/// Options for [`ViewManager::needs_redraw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RedrawOptions {
    /// Whether reading the flag also clears it.
    pub clear_redraw_flags: bool,
}

impl RedrawOptions {
    /// Read and clear.
    pub const CONSUME: Self = Self {
        clear_redraw_flags: true,
    };
    /// Read without clearing.
    pub const PEEK: Self = Self {
        clear_redraw_flags: false,
    };
}

impl Default for RedrawOptions {
    fn default() -> Self {
        Self::CONSUME
    }
}

#[derive(Debug)]
struct ControllerSlot {
    kind: ControllerKind,
    controller: Box<dyn Controller>,
}

/// Reconciles a declarative view list with viewports and controllers.
///
/// [`ViewManager::set_props`] is the only way to change views, camera state,
/// or canvas size. Each call compares the new inputs with the cached ones and,
/// only if something differs, rebuilds every viewport in one synchronous pass.
/// Controllers survive rebuilds while their view id stays present with the
/// same [`ControllerKind`]; a vanished view's controller is finalized during
/// the rebuild that drops it.
///
/// Two sticky flags report work to an external scheduler: need-update (a
/// rebuild is pending) and need-redraw (a frame should be drawn). Each keeps
/// the first reason it was raised with until consumed.
///
/// ```rust
/// use understory_view_manager::{
///     CameraState, ControllerConfig, RedrawOptions, View, ViewManager, ViewManagerProps,
/// };
///
/// let mut manager = ViewManager::new(
///     ViewManagerProps::new()
///         .size(800.0, 600.0)
///         .views([View::new("main").with_controller(ControllerConfig::pan_zoom())])
///         .view_state(CameraState::default()),
/// );
/// assert_eq!(manager.needs_redraw(RedrawOptions::default()).as_deref(), Some("Initial render"));
/// assert_eq!(manager.needs_redraw(RedrawOptions::default()), None);
///
/// let viewport = manager.get_viewport("main").unwrap();
/// assert_eq!((viewport.x(), viewport.y(), viewport.width()), (0.0, 0.0, 800.0));
///
/// // Resizing rebuilds the viewports but keeps the controller.
/// manager.set_props(ViewManagerProps::new().size(1024.0, 768.0));
/// assert_eq!(manager.needs_redraw(RedrawOptions::default()).as_deref(), Some("Size changed"));
/// assert!(manager.controller("main").is_some());
/// ```
pub struct ViewManager {
    width: f64,
    height: f64,
    views: Vec<View>,
    view_states: ViewStates,
    controllers: HashMap<ViewId, ControllerSlot>,
    viewports: Vec<Viewport>,
    /// First viewport index per viewport id.
    viewport_map: HashMap<ViewId, usize>,
    needs_update: DirtyFlag,
    needs_redraw: DirtyFlag,
    on_view_state_change: ViewStateCallback,
    on_interaction_state_change: InteractionStateCallback,
    /// View whose controller owns the pointer between down and up.
    captured: Option<ViewId>,
}

impl ViewManager {
    /// Creates a manager without controller output handlers.
    ///
    /// # Panics
    ///
    /// Panics if `props` carries a non-finite size.
    #[must_use]
    pub fn new(props: ViewManagerProps) -> Self {
        Self::with_options(ViewManagerOptions::default(), props)
    }

    /// Creates a manager and applies the initial props.
    ///
    /// The canvas starts at [`DEFAULT_CANVAS_SIZE`] squared with no views and
    /// empty camera state. The first redraw reason is `"Initial render"`.
    ///
    /// # Panics
    ///
    /// Panics if `props` carries a non-finite size.
    #[must_use]
    pub fn with_options(options: ViewManagerOptions, props: ViewManagerProps) -> Self {
        let on_view_state_change: ViewStateCallback = match options.on_view_state_change {
            Some(handler) => handler,
            None => Rc::new(|_: ViewStateChange| {}),
        };
        let on_interaction_state_change: InteractionStateCallback =
            match options.on_interaction_state_change {
                Some(handler) => handler,
                None => Rc::new(|_: InteractionState| {}),
            };
        let mut manager = Self {
            width: DEFAULT_CANVAS_SIZE,
            height: DEFAULT_CANVAS_SIZE,
            views: Vec::new(),
            view_states: ViewStates::new(),
            controllers: HashMap::new(),
            viewports: Vec::new(),
            viewport_map: HashMap::new(),
            needs_update: DirtyFlag::raised("Initialize"),
            needs_redraw: DirtyFlag::raised("Initial render"),
            on_view_state_change,
            on_interaction_state_change,
            captured: None,
        };
        manager.set_props(props);
        manager
    }

    /// Applies a partial update, then rebuilds if anything changed.
    ///
    /// # Panics
    ///
    /// Panics on a non-finite width or height; a bad size is a caller bug.
    /// Use [`ViewManager::try_set_props`] to get an error instead.
    pub fn set_props(&mut self, props: ViewManagerProps) {
        if let Err(err) = self.try_set_props(props) {
            panic!("invalid view manager props: {err}");
        }
    }

    /// Like [`ViewManager::set_props`], but reports a non-finite size as an
    /// error. Nothing is applied when an error is returned.
    pub fn try_set_props(&mut self, props: ViewManagerProps) -> Result<(), InvalidSize> {
        let ViewManagerProps {
            views,
            view_state,
            width,
            height,
        } = props;

        let size = (width.is_some() || height.is_some())
            .then(|| (width.unwrap_or(self.width), height.unwrap_or(self.height)));
        if let Some((width, height)) = size {
            InvalidSize::check(width, height)?;
        }

        if let Some(views) = views {
            self.set_views(views);
        }
        if let Some(view_state) = view_state {
            self.set_view_state(view_state);
        }
        if let Some((width, height)) = size {
            self.set_size(width, height);
        }

        self.update();
        Ok(())
    }

    /// Returns the pending redraw reason, clearing it unless
    /// `options.clear_redraw_flags` is `false`.
    pub fn needs_redraw(&mut self, options: RedrawOptions) -> Option<String> {
        if options.clear_redraw_flags {
            self.needs_redraw.take()
        } else {
            self.needs_redraw.reason().map(ToString::to_string)
        }
    }

    /// Requests a redraw. An already pending request keeps its reason.
    pub fn set_needs_redraw(&mut self, reason: &str) {
        if self.needs_redraw.raise(reason) {
            debug!(reason, "redraw requested");
        }
    }

    /// Requests a rebuild on the next [`ViewManager::set_props`], and a
    /// redraw with the same reason.
    pub fn set_needs_update(&mut self, reason: &str) {
        if self.needs_update.raise(reason) {
            debug!(reason, "update requested");
        }
        self.set_needs_redraw(reason);
    }

    /// The pending rebuild reason, if any.
    #[must_use]
    pub fn needs_update(&self) -> Option<&str> {
        self.needs_update.reason()
    }

    /// Viewports in declaration order, optionally only those containing a
    /// pixel point or overlapping a pixel rect.
    pub fn get_viewports(&self, region: Option<PixelRegion>) -> impl Iterator<Item = &Viewport> + '_ {
        self.viewports.iter().filter(move |viewport| {
            region.is_none_or(|region| viewport.contains_pixel(region, ProjectOptions::default()))
        })
    }

    /// All viewports in declaration order; one per view.
    #[must_use]
    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    /// The first viewport carrying `id`. Later viewports with the same id are
    /// not reachable here.
    #[must_use]
    pub fn get_viewport(&self, id: &str) -> Option<&Viewport> {
        self.viewport_map
            .get(id)
            .and_then(|&index| self.viewports.get(index))
    }

    /// The camera for view `id`, falling back to the shared camera.
    ///
    /// Views declared with a view-state id read that key instead of their own.
    #[must_use]
    pub fn get_view_state(&self, id: &str) -> Option<&CameraState> {
        let key = self.view(id).map_or(id, |view| view.view_state_id().as_str());
        self.view_states.resolve(key)
    }

    /// Projects a world point through the topmost viewport that contains it.
    ///
    /// Views declared later are on top.
    #[must_use]
    pub fn project(&self, world: Point, opts: ProjectOptions) -> Option<Point> {
        self.viewports
            .iter()
            .rev()
            .find(|viewport| viewport.contains(world, opts))
            .and_then(|viewport| viewport.project(world, opts))
    }

    /// Unprojects a pixel through the topmost viewport under it.
    #[must_use]
    pub fn unproject(&self, pixel: Point, opts: ProjectOptions) -> Option<Point> {
        self.viewports
            .iter()
            .rev()
            .find(|viewport| viewport.contains_pixel(pixel, opts))
            .and_then(|viewport| viewport.unproject(pixel, opts))
    }

    /// The normalized view list.
    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// The first view with id `id`.
    #[must_use]
    pub fn view(&self, id: &str) -> Option<&View> {
        self.views.iter().find(|view| view.id().as_str() == id)
    }

    /// The current camera state.
    #[must_use]
    pub fn view_states(&self) -> &ViewStates {
        &self.view_states
    }

    /// Canvas width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The live controller for view `id`.
    #[must_use]
    pub fn controller(&self, id: &str) -> Option<&dyn Controller> {
        self.controllers.get(id).map(|slot| slot.controller.as_ref())
    }

    /// All live controllers, in no particular order.
    pub fn controllers(&self) -> impl Iterator<Item = (&ViewId, &dyn Controller)> + '_ {
        self.controllers
            .iter()
            .map(|(id, slot)| (id, slot.controller.as_ref()))
    }

    /// Routes an input event to a controller.
    ///
    /// Between a handled pointer-down and the next pointer-up, events go to
    /// the controller that took the press. Otherwise the topmost viewport
    /// under the pointer whose view has a controller receives the event.
    /// Returns whether a controller handled it.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        let target = match &self.captured {
            Some(id) => Some(id.clone()),
            None => self.controller_at(event.position()),
        };
        let Some(id) = target else {
            trace!(?event, "no controller under pointer");
            return false;
        };
        let Some(slot) = self.controllers.get_mut(&id) else {
            self.captured = None;
            return false;
        };

        let handled = slot.controller.handle_event(event);
        trace!(view = %id, ?event, handled, "event routed");
        match event {
            InputEvent::PointerDown { .. } if handled => self.captured = Some(id),
            InputEvent::PointerUp { .. } => self.captured = None,
            _ => {}
        }
        handled
    }

    /// Finalizes every controller. Later calls are no-ops; dropping the
    /// manager calls this too.
    pub fn finalize(&mut self) {
        for (id, mut slot) in self.controllers.drain() {
            trace!(view = %id, "controller finalized");
            slot.controller.finalize();
        }
        self.captured = None;
    }

    fn controller_at(&self, position: Point) -> Option<ViewId> {
        self.views
            .iter()
            .zip(&self.viewports)
            .rev()
            .find(|(view, viewport)| {
                self.controllers.contains_key(view.id())
                    && viewport.contains_pixel(position, ProjectOptions::default())
            })
            .map(|(view, _)| view.id().clone())
    }

    fn set_views(&mut self, items: Vec<ViewLike>) {
        let views = normalize_views(items);
        if views_changed(&views, &self.views) {
            self.set_needs_update("views changed");
        }
        self.views = views;
    }

    fn set_view_state(&mut self, view_state: Option<ViewStates>) {
        let Some(view_state) = view_state else {
            warn!("missing view state; keeping the previous one");
            return;
        };
        if view_state != self.view_states {
            self.set_needs_update("viewState changed");
        }
        self.view_states = view_state;
    }

    fn set_size(&mut self, width: f64, height: f64) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.set_needs_update("Size changed");
        }
    }

    fn update(&mut self) {
        if let Some(reason) = self.needs_update.take() {
            self.rebuild_viewports(&reason);
        }
    }

    fn rebuild_viewports(&mut self, reason: &str) {
        let _span = debug_span!("rebuild_viewports", reason, views = self.views.len()).entered();

        let mut old_controllers = mem::take(&mut self.controllers);
        let mut viewports = Vec::with_capacity(self.views.len());

        for view in &self.views {
            let view_state = self.view_states.resolve(view.view_state_id().as_str());
            let viewport = view.make_viewport(self.width, self.height, view_state);

            // With duplicate ids the first declaration owns the controller.
            if let Some(config) = view.controller()
                && !self.controllers.contains_key(view.id())
            {
                let props = ControllerProps::merge(view, config, view_state, &viewport);
                let slot = match old_controllers.remove(view.id()) {
                    Some(mut slot) if slot.kind == config.kind => {
                        trace!(view = %view.id(), "controller updated");
                        slot.controller.set_props(&props);
                        slot
                    }
                    stale => {
                        if let Some(mut stale) = stale {
                            trace!(view = %view.id(), "controller kind changed");
                            stale.controller.finalize();
                            if self.captured.as_ref() == Some(view.id()) {
                                self.captured = None;
                            }
                        }
                        spawn_controller(
                            view.id(),
                            config,
                            &props,
                            &self.on_view_state_change,
                            &self.on_interaction_state_change,
                        )
                    }
                };
                self.controllers.insert(view.id().clone(), slot);
            }

            viewports.push(viewport);
        }

        for (id, mut slot) in old_controllers {
            trace!(view = %id, "controller finalized");
            slot.controller.finalize();
        }
        if self
            .captured
            .as_ref()
            .is_some_and(|id| !self.controllers.contains_key(id))
        {
            self.captured = None;
        }

        let mut viewport_map = HashMap::with_capacity(viewports.len());
        for (index, viewport) in viewports.iter().enumerate() {
            if let Some(id) = viewport.id() {
                viewport_map.entry(id.clone()).or_insert(index);
            }
        }
        self.viewports = viewports;
        self.viewport_map = viewport_map;

        debug!(
            viewports = self.viewports.len(),
            controllers = self.controllers.len(),
            "viewports rebuilt"
        );
    }
}

impl Drop for ViewManager {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl fmt::Debug for ViewManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewManager")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("views", &self.views)
            .field("view_states", &self.view_states)
            .field("controllers", &self.controllers)
            .field("viewports", &self.viewports)
            .field("needs_update", &self.needs_update)
            .field("needs_redraw", &self.needs_redraw)
            .field("captured", &self.captured)
            .finish_non_exhaustive()
    }
}

/// Builds a controller whose camera changes are tagged with `view_id`.
fn spawn_controller(
    view_id: &ViewId,
    config: &ControllerConfig,
    props: &ControllerProps,
    on_view_state_change: &ViewStateCallback,
    on_interaction_state_change: &InteractionStateCallback,
) -> ControllerSlot {
    let forward = on_view_state_change.clone();
    let tag = view_id.clone();
    let context = ControllerContext {
        view_id: view_id.clone(),
        on_view_state_change: Rc::new(move |mut change: ViewStateChange| {
            change.view_id = Some(tag.clone());
            forward(change);
        }),
        on_interaction_state_change: on_interaction_state_change.clone(),
    };
    trace!(view = %view_id, "controller created");
    ControllerSlot {
        kind: config.kind.clone(),
        controller: create_controller(&config.kind, context, props),
    }
}
