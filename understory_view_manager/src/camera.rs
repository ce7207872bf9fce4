// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Camera state and the per-view camera map.

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;

use kurbo::Point;

use crate::id::ViewId;

/// Planar camera: the world point shown at the viewport center and a zoom.
///
/// `zoom` is expressed in device pixels per world unit, so `2.0` shows the
/// world at twice its natural size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// World-space point mapped to the center of the viewport.
    pub target: Point,
    /// Uniform zoom factor in pixels per world unit.
    pub zoom: f64,
}

impl CameraState {
    /// Creates a camera looking at `target` with the given zoom.
    #[must_use]
    pub const fn new(target: Point, zoom: f64) -> Self {
        Self { target, zoom }
    }

    /// Returns a copy of this camera looking at `target`.
    #[must_use]
    pub const fn with_target(mut self, target: Point) -> Self {
        self.target = target;
        self
    }

    /// Returns a copy of this camera with the given zoom.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(Point::ORIGIN, 1.0)
    }
}

/// Camera state for a set of views.
///
/// A `ViewStates` holds an optional shared camera plus per-view entries keyed
/// by view-state id. Lookups via [`ViewStates::resolve`] prefer the per-view
/// entry and fall back to the shared camera, so a single-camera application
/// can use [`ViewStates::shared`] and never mention view ids.
///
/// Equality is structural: two independently built `ViewStates` with the same
/// content compare equal, which is what dirty tracking relies on.
///
/// ```rust
/// use kurbo::Point;
/// use understory_view_manager::{CameraState, ViewStates};
///
/// let main = CameraState::new(Point::new(10.0, 0.0), 2.0);
/// let states = ViewStates::shared(CameraState::default()).with_view("main", main);
///
/// assert_eq!(states.resolve("main"), Some(&main));
/// assert_eq!(states.resolve("minimap"), Some(&CameraState::default()));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewStates {
    shared: Option<CameraState>,
    by_id: BTreeMap<ViewId, CameraState>,
}

impl ViewStates {
    /// Creates an empty set with no shared camera and no per-view entries.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            shared: None,
            by_id: BTreeMap::new(),
        }
    }

    /// Creates a set whose only entry is a camera shared by every view.
    #[must_use]
    pub const fn shared(state: CameraState) -> Self {
        Self {
            shared: Some(state),
            by_id: BTreeMap::new(),
        }
    }

    /// Creates a set from `(id, camera)` pairs.
    pub fn by_id<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, CameraState)>,
        K: Into<ViewId>,
    {
        Self {
            shared: None,
            by_id: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Returns this set with a per-view entry added or replaced.
    #[must_use]
    pub fn with_view(mut self, id: impl Into<ViewId>, state: CameraState) -> Self {
        self.insert(id, state);
        self
    }

    /// Inserts a per-view entry, returning the previous one.
    pub fn insert(&mut self, id: impl Into<ViewId>, state: CameraState) -> Option<CameraState> {
        self.by_id.insert(id.into(), state)
    }

    /// Removes a per-view entry.
    pub fn remove(&mut self, id: &str) -> Option<CameraState> {
        self.by_id.remove(id)
    }

    /// Sets or clears the shared camera.
    pub fn set_shared(&mut self, state: Option<CameraState>) {
        self.shared = state;
    }

    /// Returns the shared camera, if any.
    #[must_use]
    pub fn shared_state(&self) -> Option<&CameraState> {
        self.shared.as_ref()
    }

    /// Returns the per-view entry for `id` without falling back.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CameraState> {
        self.by_id.get(id)
    }

    /// Returns the camera for `id`: its own entry, else the shared camera.
    #[must_use]
    pub fn resolve(&self, id: &str) -> Option<&CameraState> {
        self.by_id.get(id).or(self.shared.as_ref())
    }

    /// Returns `true` when there is neither a shared camera nor any entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.is_none() && self.by_id.is_empty()
    }

    /// Iterates per-view entries in id order.
    pub fn iter(&self) -> btree_map::Iter<'_, ViewId, CameraState> {
        self.by_id.iter()
    }
}

impl From<CameraState> for ViewStates {
    fn from(state: CameraState) -> Self {
        Self::shared(state)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::{CameraState, ViewStates};

    #[test]
    fn resolve_prefers_per_view_entry() {
        let a = CameraState::new(Point::new(1.0, 2.0), 3.0);
        let shared = CameraState::default().with_zoom(0.5);
        let states = ViewStates::shared(shared).with_view("a", a);

        assert_eq!(states.resolve("a"), Some(&a));
        assert_eq!(states.resolve("b"), Some(&shared));
        assert_eq!(states.get("b"), None);
    }

    #[test]
    fn resolve_without_shared_camera() {
        let states = ViewStates::by_id([("a", CameraState::default())]);
        assert!(states.resolve("a").is_some());
        assert!(states.resolve("b").is_none());
        assert!(!states.is_empty());
        assert!(ViewStates::new().is_empty());
    }

    #[test]
    fn equality_is_structural() {
        let build = || ViewStates::by_id([("a", CameraState::new(Point::new(5.0, 5.0), 2.0))]);
        assert_eq!(build(), build());
        assert_ne!(build(), build().with_view("b", CameraState::default()));
    }
}
