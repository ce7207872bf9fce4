// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Planar viewports: world/pixel projection for one canvas rect.

use kurbo::{Affine, Point, Rect};

use crate::camera::CameraState;
use crate::id::ViewId;

/// Options shared by the projection and containment queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectOptions {
    /// Whether pixel Y grows downward from the top of the viewport.
    ///
    /// When `false`, pixel coordinates are mirrored vertically inside the
    /// viewport rect so that Y grows upward from its bottom edge.
    pub top_left: bool,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self { top_left: true }
    }
}

/// A pixel-space query: either a single point or a rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PixelRegion {
    /// A single pixel-space point.
    Point(Point),
    /// A pixel-space rectangle.
    Rect(Rect),
}

impl From<Point> for PixelRegion {
    fn from(point: Point) -> Self {
        Self::Point(point)
    }
}

impl From<Rect> for PixelRegion {
    fn from(rect: Rect) -> Self {
        Self::Rect(rect)
    }
}

/// An immutable planar projection for one view.
///
/// A viewport covers a rectangle of the canvas (in device pixels, origin at
/// the canvas top-left) and maps world coordinates into it with a uniform
/// zoom, placing [`CameraState::target`] at the center of the rect.
///
/// Viewports are produced by [`View::make_viewport`](crate::View::make_viewport)
/// on every rebuild and are never mutated afterwards.
///
/// ```rust
/// use kurbo::{Point, Rect};
/// use understory_view_manager::{CameraState, ProjectOptions, Viewport};
///
/// let vp = Viewport::new(Rect::new(0.0, 0.0, 200.0, 100.0), CameraState::default());
/// let opts = ProjectOptions::default();
///
/// // The camera target sits at the viewport center.
/// assert_eq!(vp.project(Point::ORIGIN, opts), Some(Point::new(100.0, 50.0)));
/// assert_eq!(vp.unproject(Point::new(100.0, 50.0), opts), Some(Point::ORIGIN));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    id: Option<ViewId>,
    rect: Rect,
    camera: CameraState,
    world_to_pixel: Affine,
    pixel_to_world: Affine,
}

impl Viewport {
    /// Creates an anonymous viewport covering `rect` as seen through `camera`.
    #[must_use]
    pub fn new(rect: Rect, camera: CameraState) -> Self {
        let rect = rect.abs();
        // World -> pixel: center the target, scale, then move into the rect.
        let world_to_pixel = Affine::translate(rect.center().to_vec2())
            * Affine::scale(camera.zoom)
            * Affine::translate(-camera.target.to_vec2());
        Self {
            id: None,
            rect,
            camera,
            world_to_pixel,
            pixel_to_world: world_to_pixel.inverse(),
        }
    }

    /// Returns this viewport tagged with `id`.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ViewId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns the viewport id, if any.
    #[must_use]
    pub fn id(&self) -> Option<&ViewId> {
        self.id.as_ref()
    }

    /// Left edge in canvas pixels.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.rect.x0
    }

    /// Top edge in canvas pixels.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.rect.y0
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.rect.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.rect.height()
    }

    /// The covered canvas rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// The camera this viewport was built from.
    #[must_use]
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// The world-to-pixel transform (top-left pixel convention).
    #[must_use]
    pub fn world_to_pixel(&self) -> Affine {
        self.world_to_pixel
    }

    /// World-space rectangle currently visible through the viewport.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        self.pixel_to_world.transform_rect_bbox(self.rect)
    }

    /// Returns `true` if the world point projects inside the viewport rect.
    #[must_use]
    pub fn contains(&self, world: Point, opts: ProjectOptions) -> bool {
        self.project(world, opts)
            .is_some_and(|pixel| self.contains_pixel(pixel, opts))
    }

    /// Returns `true` if the pixel point lies inside the rect, or if the pixel
    /// rectangle overlaps it with positive area.
    ///
    /// Point containment is half-open, so a point on the shared edge of two
    /// adjacent viewports belongs to the one on its right or below.
    #[must_use]
    pub fn contains_pixel(&self, region: impl Into<PixelRegion>, opts: ProjectOptions) -> bool {
        match region.into() {
            PixelRegion::Point(point) => self.rect.contains(self.flip_point(point, opts)),
            PixelRegion::Rect(query) => {
                let query = if opts.top_left {
                    query
                } else {
                    let a = self.flip_point(Point::new(query.x0, query.y0), opts);
                    let b = self.flip_point(Point::new(query.x1, query.y1), opts);
                    Rect::from_points(a, b)
                };
                self.rect.intersect(query.abs()).area() > 0.0
            }
        }
    }

    /// Projects a world point into pixel space.
    ///
    /// Returns `None` when the camera is degenerate (for example a zero zoom),
    /// so the result would not be finite.
    #[must_use]
    pub fn project(&self, world: Point, opts: ProjectOptions) -> Option<Point> {
        if self.is_degenerate() {
            return None;
        }
        let pixel = self.world_to_pixel * world;
        pixel.is_finite().then(|| self.flip_point(pixel, opts))
    }

    /// Converts a pixel point back into world space.
    ///
    /// Returns `None` when the camera is degenerate.
    #[must_use]
    pub fn unproject(&self, pixel: Point, opts: ProjectOptions) -> Option<Point> {
        if self.is_degenerate() {
            return None;
        }
        let world = self.pixel_to_world * self.flip_point(pixel, opts);
        world.is_finite().then_some(world)
    }

    /// Returns `true` when the zoom is not a positive finite number.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.camera.zoom.is_finite() && self.camera.zoom > 0.0)
    }

    /// Converts between the top-left and bottom-left conventions. The mapping
    /// is its own inverse.
    fn flip_point(&self, point: Point, opts: ProjectOptions) -> Point {
        if opts.top_left {
            point
        } else {
            Point::new(point.x, self.rect.y0 + self.rect.y1 - point.y)
        }
    }
}
