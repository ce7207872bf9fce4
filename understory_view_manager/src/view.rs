// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View descriptors and the normalization of view-like inputs.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

use crate::camera::CameraState;
use crate::controller::ControllerConfig;
use crate::id::ViewId;
use crate::viewport::Viewport;

/// Id given to a wrapped bare viewport that carries no id of its own.
pub const DEFAULT_VIEW_ID: &str = "default-view";

/// A layout length, either absolute or relative to the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Extent {
    /// Device pixels.
    Pixels(f64),
    /// Percentage of the canvas width (for `x`/`width`) or height (for `y`/`height`).
    Percent(f64),
}

impl Extent {
    /// The full canvas extent.
    pub const FULL: Self = Self::Percent(100.0);

    /// Zero pixels.
    pub const ZERO: Self = Self::Pixels(0.0);

    /// Resolves the extent against a canvas length.
    #[must_use]
    pub fn resolve(self, total: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Percent(pct) => total * pct / 100.0,
        }
    }
}

impl From<f64> for Extent {
    fn from(px: f64) -> Self {
        Self::Pixels(px)
    }
}

/// Inputs to a custom viewport factory.
#[derive(Clone, Copy, Debug)]
pub struct ViewportRequest<'a> {
    /// The requesting view.
    pub id: &'a ViewId,
    /// The view's rect, already resolved against the canvas.
    pub rect: Rect,
    /// Canvas width in pixels.
    pub width: f64,
    /// Canvas height in pixels.
    pub height: f64,
    /// The camera in effect: the resolved view state, else the view's default
    /// state, else [`CameraState::default`].
    pub camera: CameraState,
}

/// Builds a viewport for a [`ViewKind::Custom`] view.
///
/// Factories compare by identity.
#[derive(Clone)]
pub struct ViewportFactory(Rc<dyn Fn(&ViewportRequest<'_>) -> Viewport>);

impl ViewportFactory {
    /// Wraps a viewport constructor.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&ViewportRequest<'_>) -> Viewport + 'static,
    {
        Self(Rc::new(build))
    }
}

impl PartialEq for ViewportFactory {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ViewportFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewportFactory")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// How a view turns its inputs into a viewport.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ViewKind {
    /// A planar viewport over the view rect, driven by the camera.
    #[default]
    Planar,
    /// A fixed viewport returned unchanged, whatever the size or camera.
    Fixed(Viewport),
    /// A caller-supplied factory.
    Custom(ViewportFactory),
}

/// A declarative view: where it sits on the canvas, how it projects, and
/// whether it is interactive.
///
/// Views are plain values. Two views are [`equal`](View::equals) when every
/// field matches, so rebuilding an identical view list each frame is cheap
/// for the [`ViewManager`](crate::ViewManager).
///
/// ```rust
/// use understory_view_manager::{ControllerConfig, Extent, View};
///
/// let main = View::new("main").with_controller(ControllerConfig::pan_zoom());
/// let minimap = View::new("minimap")
///     .with_x(Extent::Percent(75.0))
///     .with_width(Extent::Percent(25.0))
///     .with_height(Extent::Pixels(120.0));
///
/// let rect = minimap.rect(800.0, 600.0);
/// assert_eq!((rect.x0, rect.y0, rect.width(), rect.height()), (600.0, 0.0, 200.0, 120.0));
/// assert!(main.equals(&main.clone()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct View {
    id: ViewId,
    x: Extent,
    y: Extent,
    width: Extent,
    height: Extent,
    controller: Option<ControllerConfig>,
    default_state: Option<CameraState>,
    view_state_id: Option<ViewId>,
    kind: ViewKind,
}

impl View {
    /// Creates a full-canvas planar view without a controller.
    #[must_use]
    pub fn new(id: impl Into<ViewId>) -> Self {
        Self {
            id: id.into(),
            x: Extent::ZERO,
            y: Extent::ZERO,
            width: Extent::FULL,
            height: Extent::FULL,
            controller: None,
            default_state: None,
            view_state_id: None,
            kind: ViewKind::Planar,
        }
    }

    /// Creates a view whose viewport comes from `factory`.
    #[must_use]
    pub fn custom(id: impl Into<ViewId>, factory: ViewportFactory) -> Self {
        Self::new(id).with_kind(ViewKind::Custom(factory))
    }

    /// Wraps a bare viewport into a descriptor.
    ///
    /// The view takes the viewport's id (or [`DEFAULT_VIEW_ID`]) and its pixel
    /// rect, and always produces that same viewport, carrying the view's id.
    #[must_use]
    pub fn from_viewport(viewport: Viewport) -> Self {
        let id = viewport
            .id()
            .cloned()
            .unwrap_or_else(|| ViewId::new(DEFAULT_VIEW_ID));
        let rect = viewport.rect();
        Self::new(id)
            .with_x(Extent::Pixels(rect.x0))
            .with_y(Extent::Pixels(rect.y0))
            .with_width(Extent::Pixels(rect.width()))
            .with_height(Extent::Pixels(rect.height()))
            .with_kind(ViewKind::Fixed(viewport))
    }

    /// Sets the left edge.
    #[must_use]
    pub fn with_x(mut self, x: Extent) -> Self {
        self.x = x;
        self
    }

    /// Sets the top edge.
    #[must_use]
    pub fn with_y(mut self, y: Extent) -> Self {
        self.y = y;
        self
    }

    /// Sets the width.
    #[must_use]
    pub fn with_width(mut self, width: Extent) -> Self {
        self.width = width;
        self
    }

    /// Sets the height.
    #[must_use]
    pub fn with_height(mut self, height: Extent) -> Self {
        self.height = height;
        self
    }

    /// Attaches a controller configuration.
    #[must_use]
    pub fn with_controller(mut self, config: ControllerConfig) -> Self {
        self.controller = Some(config);
        self
    }

    /// Sets the camera used when no view state resolves for this view.
    #[must_use]
    pub fn with_default_state(mut self, state: CameraState) -> Self {
        self.default_state = Some(state);
        self
    }

    /// Reads camera state from another key, letting several views share one
    /// camera entry.
    #[must_use]
    pub fn with_view_state_id(mut self, id: impl Into<ViewId>) -> Self {
        self.view_state_id = Some(id.into());
        self
    }

    /// Sets how the viewport is produced.
    #[must_use]
    pub fn with_kind(mut self, kind: ViewKind) -> Self {
        self.kind = kind;
        self
    }

    /// The view id.
    #[must_use]
    pub fn id(&self) -> &ViewId {
        &self.id
    }

    /// The controller configuration, if the view is interactive.
    #[must_use]
    pub fn controller(&self) -> Option<&ControllerConfig> {
        self.controller.as_ref()
    }

    /// The fallback camera, if any.
    #[must_use]
    pub fn default_state(&self) -> Option<&CameraState> {
        self.default_state.as_ref()
    }

    /// The key this view reads camera state from; its own id by default.
    #[must_use]
    pub fn view_state_id(&self) -> &ViewId {
        self.view_state_id.as_ref().unwrap_or(&self.id)
    }

    /// How the viewport is produced.
    #[must_use]
    pub fn kind(&self) -> &ViewKind {
        &self.kind
    }

    /// Resolves the view's layout against a canvas size.
    #[must_use]
    pub fn rect(&self, width: f64, height: f64) -> Rect {
        let x = self.x.resolve(width);
        let y = self.y.resolve(height);
        Rect::new(
            x,
            y,
            x + self.width.resolve(width),
            y + self.height.resolve(height),
        )
    }

    /// Produces this view's viewport for a canvas size and camera.
    #[must_use]
    pub fn make_viewport(&self, width: f64, height: f64, view_state: Option<&CameraState>) -> Viewport {
        let camera = view_state
            .or(self.default_state.as_ref())
            .copied()
            .unwrap_or_default();
        let viewport = match &self.kind {
            ViewKind::Planar => Viewport::new(self.rect(width, height), camera),
            ViewKind::Fixed(viewport) => viewport.clone(),
            ViewKind::Custom(factory) => (factory.0)(&ViewportRequest {
                id: &self.id,
                rect: self.rect(width, height),
                width,
                height,
                camera,
            }),
        };
        // Anonymous viewports take the view's id.
        if viewport.id().is_none() {
            viewport.with_id(&self.id)
        } else {
            viewport
        }
    }

    /// Structural equality, used to decide whether a view list changed.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

/// Anything accepted where a view is expected.
#[derive(Clone, Debug)]
pub enum ViewLike {
    /// A view descriptor.
    View(View),
    /// A bare viewport, wrapped by [`View::from_viewport`].
    Viewport(Viewport),
    /// A nested list, flattened in order.
    Group(Vec<ViewLike>),
    /// A placeholder that is dropped.
    Empty,
}

impl From<View> for ViewLike {
    fn from(view: View) -> Self {
        Self::View(view)
    }
}

impl From<Viewport> for ViewLike {
    fn from(viewport: Viewport) -> Self {
        Self::Viewport(viewport)
    }
}

impl<T: Into<Self>> From<Vec<T>> for ViewLike {
    fn from(items: Vec<T>) -> Self {
        Self::Group(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for ViewLike {
    fn from(item: Option<T>) -> Self {
        item.map_or(Self::Empty, Into::into)
    }
}

/// Flattens nested inputs, drops empty entries, and wraps bare viewports,
/// preserving declaration order.
pub fn normalize_views<I>(items: I) -> Vec<View>
where
    I: IntoIterator,
    I::Item: Into<ViewLike>,
{
    fn push(out: &mut Vec<View>, item: ViewLike) {
        match item {
            ViewLike::View(view) => out.push(view),
            ViewLike::Viewport(viewport) => out.push(View::from_viewport(viewport)),
            ViewLike::Group(items) => {
                for item in items {
                    push(out, item);
                }
            }
            ViewLike::Empty => {}
        }
    }

    let mut out = Vec::new();
    for item in items {
        push(&mut out, item.into());
    }
    out
}

/// Returns `true` if the lists differ in length or in any position.
pub(crate) fn views_changed(new: &[View], old: &[View]) -> bool {
    new.len() != old.len() || new.iter().zip(old).any(|(a, b)| !a.equals(b))
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use kurbo::{Point, Rect};

    use super::{
        DEFAULT_VIEW_ID, Extent, View, ViewKind, ViewLike, ViewportFactory, normalize_views,
        views_changed,
    };
    use crate::{CameraState, ControllerConfig, Viewport};

    #[test]
    fn normalize_flattens_filters_and_wraps() {
        let bare = Viewport::new(Rect::new(10.0, 20.0, 110.0, 70.0), CameraState::default());
        let input: Vec<ViewLike> = vec![
            View::new("a").into(),
            ViewLike::Empty,
            vec![Some(View::new("b")), None].into(),
            bare.clone().into(),
            vec![vec![View::new("c")]].into(),
        ];

        let views = normalize_views(input);
        let ids: Vec<&str> = views.iter().map(|v| v.id().as_str()).collect();
        assert_eq!(ids, ["a", "b", DEFAULT_VIEW_ID, "c"]);

        let wrapped = &views[2];
        assert_eq!(wrapped.kind(), &ViewKind::Fixed(bare.clone()));
        assert_eq!(wrapped.rect(1.0, 1.0), bare.rect());
        assert_eq!(
            wrapped.make_viewport(800.0, 600.0, None),
            bare.with_id(DEFAULT_VIEW_ID)
        );
    }

    #[test]
    fn wrapped_viewport_keeps_its_id() {
        let bare = Viewport::new(Rect::new(0.0, 0.0, 10.0, 10.0), CameraState::default())
            .with_id("overlay");
        let views = normalize_views([bare]);
        assert_eq!(views[0].id().as_str(), "overlay");
    }

    #[test]
    fn planar_viewport_uses_rect_and_camera_precedence() {
        let default_state = CameraState::new(Point::new(1.0, 2.0), 3.0);
        let view = View::new("main")
            .with_x(Extent::Percent(50.0))
            .with_width(Extent::Percent(50.0))
            .with_default_state(default_state);

        let vp = view.make_viewport(400.0, 300.0, None);
        assert_eq!(vp.rect(), Rect::new(200.0, 0.0, 400.0, 300.0));
        assert_eq!(vp.camera(), &default_state);
        assert_eq!(vp.id().map(|id| id.as_str()), Some("main"));

        let explicit = CameraState::default();
        let vp = view.make_viewport(400.0, 300.0, Some(&explicit));
        assert_eq!(vp.camera(), &explicit);
    }

    #[test]
    fn custom_factory_receives_request() {
        let factory = ViewportFactory::new(|req| {
            Viewport::new(req.rect.inflate(-1.0, -1.0), req.camera).with_id(req.id)
        });
        let view = View::custom("inset", factory.clone());
        let vp = view.make_viewport(100.0, 100.0, None);
        assert_eq!(vp.rect(), Rect::new(1.0, 1.0, 99.0, 99.0));

        assert!(view.equals(&View::custom("inset", factory)));
        let other = ViewportFactory::new(|req| Viewport::new(req.rect, req.camera));
        assert!(!view.equals(&View::custom("inset", other)));
    }

    #[test]
    fn anonymous_custom_viewport_takes_view_id() {
        let factory = ViewportFactory::new(|req| Viewport::new(req.rect, req.camera));
        let vp = View::custom("plot", factory).make_viewport(100.0, 100.0, None);
        assert_eq!(vp.id().map(|id| id.as_str()), Some("plot"));

        let named = ViewportFactory::new(|req| Viewport::new(req.rect, req.camera).with_id("own"));
        let vp = View::custom("plot", named).make_viewport(100.0, 100.0, None);
        assert_eq!(vp.id().map(|id| id.as_str()), Some("own"));
    }

    #[test]
    fn view_list_change_detection() {
        let a = || View::new("a").with_controller(ControllerConfig::pan_zoom());
        let b = || View::new("b");

        assert!(!views_changed(&[a(), b()], &[a(), b()]));
        assert!(views_changed(&[a()], &[a(), b()]));
        assert!(views_changed(&[b(), a()], &[a(), b()]));
        assert!(views_changed(&[a().with_height(Extent::Pixels(5.0)), b()], &[a(), b()]));
    }

    #[test]
    fn view_state_id_defaults_to_own_id() {
        assert_eq!(View::new("a").view_state_id().as_str(), "a");
        assert_eq!(
            View::new("a").with_view_state_id("shared").view_state_id().as_str(),
            "shared"
        );
    }
}
