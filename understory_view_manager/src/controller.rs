// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction controllers and the data that flows into and out of them.
//!
//! A controller is a stateful gesture handler attached to one view. The
//! [`ViewManager`](crate::ViewManager) creates it on the first rebuild in which
//! its view declares a [`ControllerConfig`], refreshes it with
//! [`Controller::set_props`] on every later rebuild, and calls
//! [`Controller::finalize`] when the view goes away or changes controller kind.
//!
//! Controllers never write camera state back into the manager. They report a
//! proposed camera through the [`ViewStateCallback`] in their
//! [`ControllerContext`]; the application decides whether to feed it back via
//! [`ViewManager::set_props`](crate::ViewManager::set_props).

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::fmt;

use kurbo::{Point, Rect, Vec2};

use crate::camera::CameraState;
use crate::id::ViewId;
use crate::pan_zoom::PanZoomController;
use crate::view::View;
use crate::viewport::Viewport;

bitflags::bitflags! {
    /// What a controller is currently doing.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InteractionState: u8 {
        /// A pointer is held down on the controller's view.
        const DRAGGING = 0b0000_0001;
        /// The camera target is being moved by a drag.
        const PANNING  = 0b0000_0010;
        /// The zoom is being changed.
        const ZOOMING  = 0b0000_0100;
    }
}

/// A camera change proposed by a controller.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewStateChange {
    /// The originating view. Controllers leave this `None`; the manager fills
    /// it in before the change reaches the application.
    pub view_id: Option<ViewId>,
    /// The proposed camera.
    pub view_state: CameraState,
    /// Interaction state at the time of the change.
    pub interaction_state: InteractionState,
}

/// Receives camera changes proposed by controllers.
pub type ViewStateCallback = Rc<dyn Fn(ViewStateChange)>;

/// Receives interaction state changes from controllers.
pub type InteractionStateCallback = Rc<dyn Fn(InteractionState)>;

/// A pre-decoded input event in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// Primary pointer pressed.
    PointerDown {
        /// Pointer position in canvas pixels.
        position: Point,
    },
    /// Pointer moved.
    PointerMove {
        /// Pointer position in canvas pixels.
        position: Point,
    },
    /// Primary pointer released.
    PointerUp {
        /// Pointer position in canvas pixels.
        position: Point,
    },
    /// Scroll wheel or trackpad scroll. Negative `delta.y` zooms in.
    Wheel {
        /// Pointer position in canvas pixels.
        position: Point,
        /// Scroll delta in pixels.
        delta: Vec2,
    },
}

impl InputEvent {
    /// Returns the pointer position carried by the event.
    #[must_use]
    pub fn position(&self) -> Point {
        match *self {
            Self::PointerDown { position }
            | Self::PointerMove { position }
            | Self::PointerUp { position }
            | Self::Wheel { position, .. } => position,
        }
    }
}

/// Builds a caller-defined controller.
///
/// Factories compare by identity, so two views carrying clones of the same
/// factory are equal while two separately created factories are not.
#[derive(Clone)]
pub struct ControllerFactory(Rc<dyn Fn(ControllerContext, &ControllerProps) -> Box<dyn Controller>>);

impl ControllerFactory {
    /// Wraps a constructor closure.
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(ControllerContext, &ControllerProps) -> Box<dyn Controller> + 'static,
    {
        Self(Rc::new(build))
    }

    fn build(&self, context: ControllerContext, props: &ControllerProps) -> Box<dyn Controller> {
        (self.0)(context, props)
    }
}

impl PartialEq for ControllerFactory {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ControllerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ControllerFactory")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Which controller implementation a view asks for.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ControllerKind {
    /// The built-in [`PanZoomController`].
    #[default]
    PanZoom,
    /// A controller built by a caller-supplied factory.
    Custom(ControllerFactory),
}

const DEFAULT_MIN_ZOOM: f64 = 1e-3;
const DEFAULT_MAX_ZOOM: f64 = 1e3;

/// Controller configuration declared on a [`View`].
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerConfig {
    /// Controller implementation.
    pub kind: ControllerKind,
    /// Whether dragging pans the camera.
    pub drag_pan: bool,
    /// Whether the wheel zooms the camera.
    pub scroll_zoom: bool,
    /// Smallest zoom a controller may propose.
    pub min_zoom: f64,
    /// Largest zoom a controller may propose.
    pub max_zoom: f64,
}

impl ControllerConfig {
    /// The default pan/zoom configuration.
    #[must_use]
    pub fn pan_zoom() -> Self {
        Self::default()
    }

    /// A configuration for a caller-defined controller.
    #[must_use]
    pub fn custom(factory: ControllerFactory) -> Self {
        Self {
            kind: ControllerKind::Custom(factory),
            ..Self::default()
        }
    }

    /// Returns this configuration with the given zoom range.
    ///
    /// The range is normalized as by [`ControllerConfig::zoom_range`].
    #[must_use]
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        (self.min_zoom, self.max_zoom) = self.zoom_range();
        self
    }

    /// The usable zoom range: a NaN limit falls back to its default and the
    /// bounds are ordered so that `min <= max`.
    #[must_use]
    pub fn zoom_range(&self) -> (f64, f64) {
        let min = if self.min_zoom.is_nan() {
            DEFAULT_MIN_ZOOM
        } else {
            self.min_zoom
        };
        let max = if self.max_zoom.is_nan() {
            DEFAULT_MAX_ZOOM
        } else {
            self.max_zoom
        };
        if min <= max { (min, max) } else { (max, min) }
    }

    /// Returns this configuration with drag panning toggled.
    #[must_use]
    pub fn with_drag_pan(mut self, enabled: bool) -> Self {
        self.drag_pan = enabled;
        self
    }

    /// Returns this configuration with wheel zoom toggled.
    #[must_use]
    pub fn with_scroll_zoom(mut self, enabled: bool) -> Self {
        self.scroll_zoom = enabled;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            kind: ControllerKind::PanZoom,
            drag_pan: true,
            scroll_zoom: true,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

/// Everything a controller knows about its view after a rebuild.
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerProps {
    /// The owning view.
    pub id: ViewId,
    /// The view's controller configuration.
    pub config: ControllerConfig,
    /// The camera in effect for the view.
    pub view_state: CameraState,
    /// The viewport rect in canvas pixels.
    pub rect: Rect,
}

impl ControllerProps {
    /// Merges, in increasing precedence, the controller configuration, the
    /// view's default state, the resolved camera, the geometry of the
    /// just-built viewport, and the view id.
    #[must_use]
    pub fn merge(
        view: &View,
        config: &ControllerConfig,
        view_state: Option<&CameraState>,
        viewport: &Viewport,
    ) -> Self {
        let view_state = view_state
            .or(view.default_state())
            .copied()
            .unwrap_or_default();
        Self {
            id: view.id().clone(),
            config: config.clone(),
            view_state,
            rect: viewport.rect(),
        }
    }
}

/// Wiring handed to a controller when it is created.
#[derive(Clone)]
pub struct ControllerContext {
    /// The owning view.
    pub view_id: ViewId,
    /// View-scoped camera change sink. Changes sent here are tagged with
    /// [`ControllerContext::view_id`] before reaching the application.
    pub on_view_state_change: ViewStateCallback,
    /// Shared interaction state sink.
    pub on_interaction_state_change: InteractionStateCallback,
}

impl fmt::Debug for ControllerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerContext")
            .field("view_id", &self.view_id)
            .finish_non_exhaustive()
    }
}

/// A stateful interaction handler owned by the view manager.
pub trait Controller: fmt::Debug {
    /// Applies fresh props after a rebuild.
    ///
    /// Implementations must keep any in-flight gesture state.
    fn set_props(&mut self, props: &ControllerProps);

    /// Handles an input event routed to this controller's view.
    ///
    /// Returns `true` if the event was consumed.
    fn handle_event(&mut self, event: &InputEvent) -> bool;

    /// What the controller is currently doing.
    fn interaction_state(&self) -> InteractionState;

    /// Releases everything the controller holds. Called exactly once.
    fn finalize(&mut self);
}

/// Builds the controller for `kind`.
///
/// The returned controller has already seen `props`.
pub fn create_controller(
    kind: &ControllerKind,
    context: ControllerContext,
    props: &ControllerProps,
) -> Box<dyn Controller> {
    match kind {
        ControllerKind::PanZoom => Box::new(PanZoomController::new(context, props)),
        ControllerKind::Custom(factory) => factory.build(context, props),
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::{ControllerConfig, ControllerFactory, ControllerKind, ControllerProps, InputEvent};
    use crate::{CameraState, View, Viewport};

    #[test]
    fn zoom_limits_are_normalized() {
        let config = ControllerConfig::pan_zoom().with_zoom_limits(8.0, 0.5);
        assert_eq!(config.min_zoom, 0.5);
        assert_eq!(config.max_zoom, 8.0);
    }

    #[test]
    fn nan_zoom_limits_fall_back_to_defaults() {
        let defaults = ControllerConfig::default();
        let config = ControllerConfig::pan_zoom().with_zoom_limits(f64::NAN, 2.0);
        assert_eq!((config.min_zoom, config.max_zoom), (defaults.min_zoom, 2.0));

        let mut raw = ControllerConfig::pan_zoom();
        raw.min_zoom = 10.0;
        raw.max_zoom = f64::NAN;
        assert_eq!(raw.zoom_range(), (10.0, defaults.max_zoom));
        raw.max_zoom = 1.0;
        assert_eq!(raw.zoom_range(), (1.0, 10.0));
    }

    #[test]
    fn factories_compare_by_identity() {
        let factory = ControllerFactory::new(|context, props| {
            alloc::boxed::Box::new(crate::PanZoomController::new(context, props))
        });
        let other = ControllerFactory::new(|context, props| {
            alloc::boxed::Box::new(crate::PanZoomController::new(context, props))
        });
        assert_eq!(
            ControllerKind::Custom(factory.clone()),
            ControllerKind::Custom(factory.clone())
        );
        assert_ne!(ControllerKind::Custom(factory), ControllerKind::Custom(other));
    }

    #[test]
    fn merge_prefers_resolved_camera_over_default_state() {
        let default_state = CameraState::new(Point::new(1.0, 1.0), 2.0);
        let view = View::new("main")
            .with_controller(ControllerConfig::pan_zoom())
            .with_default_state(default_state);
        let viewport = Viewport::new(Rect::new(0.0, 0.0, 50.0, 40.0), CameraState::default());
        let config = view.controller().unwrap();

        let fallback = ControllerProps::merge(&view, config, None, &viewport);
        assert_eq!(fallback.view_state, default_state);
        assert_eq!(fallback.rect, viewport.rect());
        assert_eq!(fallback.id.as_str(), "main");

        let resolved = CameraState::default().with_zoom(4.0);
        let merged = ControllerProps::merge(&view, config, Some(&resolved), &viewport);
        assert_eq!(merged.view_state, resolved);
    }

    #[test]
    fn event_position() {
        let position = Point::new(3.0, 4.0);
        let wheel = InputEvent::Wheel {
            position,
            delta: (0.0, -1.0).into(),
        };
        assert_eq!(wheel.position(), position);
        assert_eq!(InputEvent::PointerUp { position }.position(), position);
    }
}
