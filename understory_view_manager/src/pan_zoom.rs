// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Built-in drag-to-pan and wheel-zoom controller.

use core::fmt;

use kurbo::{Point, Vec2};

use crate::camera::CameraState;
use crate::controller::{
    Controller, ControllerContext, ControllerProps, InputEvent, InteractionState, ViewStateChange,
};
use crate::viewport::{ProjectOptions, Viewport};

/// Zoom factor applied per wheel notch.
const WHEEL_ZOOM_STEP: f64 = 1.25;

/// Pointer positions recorded during a drag.
#[derive(Clone, Copy, Debug, Default)]
struct DragTrack {
    start_pos: Option<Point>,
    last_pos: Option<Point>,
}

impl DragTrack {
    fn start(&mut self, pos: Point) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
    }

    /// Returns the movement since the previous position.
    fn update(&mut self, pos: Point) -> Option<Vec2> {
        self.start_pos?;
        let delta = self.last_pos.map(|last| pos - last);
        self.last_pos = Some(pos);
        delta
    }

    fn end(&mut self) {
        self.start_pos = None;
        self.last_pos = None;
    }

    fn is_dragging(&self) -> bool {
        self.start_pos.is_some()
    }
}

/// Pans on drag and zooms about the pointer on wheel.
///
/// The controller keeps a working camera that starts from the props and
/// advances with each gesture step, so a drag keeps moving smoothly even if
/// the application is slow to feed the proposed camera back. Each update from
/// [`Controller::set_props`] resets the working camera to the camera the
/// manager resolved for the view, while the drag itself continues.
pub struct PanZoomController {
    context: ControllerContext,
    props: ControllerProps,
    camera: CameraState,
    drag: DragTrack,
    interaction: InteractionState,
    finalized: bool,
}

impl PanZoomController {
    /// Creates a controller for the view described by `props`.
    #[must_use]
    pub fn new(context: ControllerContext, props: &ControllerProps) -> Self {
        Self {
            context,
            props: props.clone(),
            camera: props.view_state,
            drag: DragTrack::default(),
            interaction: InteractionState::empty(),
            finalized: false,
        }
    }

    /// The props from the latest rebuild.
    #[must_use]
    pub fn props(&self) -> &ControllerProps {
        &self.props
    }

    /// The working camera, including any gesture steps not yet fed back.
    #[must_use]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    fn set_interaction(&mut self, interaction: InteractionState) {
        if self.interaction != interaction {
            self.interaction = interaction;
            (self.context.on_interaction_state_change)(interaction);
        }
    }

    fn propose(&mut self, camera: CameraState) {
        self.camera = camera;
        (self.context.on_view_state_change)(ViewStateChange {
            view_id: None,
            view_state: camera,
            interaction_state: self.interaction,
        });
    }

    fn on_down(&mut self, position: Point) -> bool {
        if !self.props.config.drag_pan || !self.props.rect.contains(position) {
            return false;
        }
        self.drag.start(position);
        self.set_interaction(InteractionState::DRAGGING);
        true
    }

    fn on_move(&mut self, position: Point) -> bool {
        let Some(delta) = self.drag.update(position) else {
            return false;
        };
        if delta == Vec2::ZERO || !(self.camera.zoom.is_finite() && self.camera.zoom > 0.0) {
            return true;
        }
        self.set_interaction(InteractionState::DRAGGING | InteractionState::PANNING);
        let target = self.camera.target - delta / self.camera.zoom;
        self.propose(self.camera.with_target(target));
        true
    }

    fn on_up(&mut self) -> bool {
        if !self.drag.is_dragging() {
            return false;
        }
        self.drag.end();
        self.set_interaction(InteractionState::empty());
        true
    }

    fn on_wheel(&mut self, position: Point, delta: Vec2) -> bool {
        let config = &self.props.config;
        if !config.scroll_zoom || delta.y == 0.0 || !self.props.rect.contains(position) {
            return false;
        }
        let factor = if delta.y < 0.0 {
            WHEEL_ZOOM_STEP
        } else {
            1.0 / WHEEL_ZOOM_STEP
        };
        let (min_zoom, max_zoom) = config.zoom_range();
        let zoom = (self.camera.zoom * factor).clamp(min_zoom, max_zoom);
        if (zoom - self.camera.zoom).abs() < f64::EPSILON {
            return true;
        }

        // Keep the world point under the pointer fixed.
        let before = Viewport::new(self.props.rect, self.camera);
        let Some(anchor) = before.unproject(position, ProjectOptions::default()) else {
            return false;
        };
        let offset = position - self.props.rect.center();
        let target = anchor - offset / zoom;

        let resting = self.interaction;
        self.set_interaction(resting | InteractionState::ZOOMING);
        self.propose(CameraState::new(target, zoom));
        self.set_interaction(resting);
        true
    }
}

impl Controller for PanZoomController {
    fn set_props(&mut self, props: &ControllerProps) {
        self.camera = props.view_state;
        self.props = props.clone();
    }

    fn handle_event(&mut self, event: &InputEvent) -> bool {
        if self.finalized {
            return false;
        }
        match *event {
            InputEvent::PointerDown { position } => self.on_down(position),
            InputEvent::PointerMove { position } => self.on_move(position),
            InputEvent::PointerUp { .. } => self.on_up(),
            InputEvent::Wheel { position, delta } => self.on_wheel(position, delta),
        }
    }

    fn interaction_state(&self) -> InteractionState {
        self.interaction
    }

    fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.drag.end();
        self.set_interaction(InteractionState::empty());
        self.finalized = true;
    }
}

impl fmt::Debug for PanZoomController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanZoomController")
            .field("props", &self.props)
            .field("camera", &self.camera)
            .field("drag", &self.drag)
            .field("interaction", &self.interaction)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}
