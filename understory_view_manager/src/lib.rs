// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_view_manager --heading-base-level=0

//! Understory View Manager: declarative views, derived viewports, and
//! long-lived interaction controllers.
//!
//! An application describes what it wants to show as a list of [`View`]s:
//! a layout on the canvas (pixels or percentages), an optional controller
//! configuration, and an optional default camera. The [`ViewManager`] turns
//! that list, the current [`ViewStates`], and the canvas size into concrete
//! [`Viewport`]s, and keeps one [`Controller`] per view alive across rebuilds
//! so that gestures survive re-renders.
//!
//! The manager is push-based and side-effect free apart from controller
//! lifetime:
//! - [`ViewManager::set_props`] is the single entry point for changes.
//!   Inputs equal to the cached ones do no work.
//! - Two sticky flags tell an external scheduler what to do next: a pending
//!   rebuild ([`ViewManager::needs_update`]) and a pending frame
//!   ([`ViewManager::needs_redraw`]). Each keeps the first reason it was
//!   raised with.
//! - Controllers never mutate camera state. They propose changes through a
//!   callback tagged with the originating view id, and the application feeds
//!   accepted state back in.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use understory_view_manager::{
//!     CameraState, Extent, ProjectOptions, RedrawOptions, View, ViewManager, ViewManagerProps,
//!     ViewStates,
//! };
//!
//! let mut manager = ViewManager::new(
//!     ViewManagerProps::new()
//!         .size(800.0, 600.0)
//!         .views([
//!             View::new("map").with_width(Extent::Percent(50.0)),
//!             View::new("minimap")
//!                 .with_x(Extent::Percent(50.0))
//!                 .with_width(Extent::Percent(50.0)),
//!         ])
//!         .view_state(ViewStates::shared(CameraState::default())),
//! );
//!
//! // The first frame is always requested.
//! assert_eq!(manager.needs_redraw(RedrawOptions::default()).as_deref(), Some("Initial render"));
//!
//! // The right half belongs to the minimap; the world origin sits at its center.
//! let world = manager.unproject(Point::new(600.0, 300.0), ProjectOptions::default());
//! assert_eq!(world, Some(Point::ORIGIN));
//! ```
//!
//! ## Controllers
//!
//! Attach a [`ControllerConfig`] to a view to get a [`PanZoomController`], or
//! supply a [`ControllerFactory`] for a custom [`Controller`]. Input reaches
//! controllers through [`ViewManager::handle_event`], which routes to the
//! topmost view under the pointer and keeps routing to the same controller
//! between pointer-down and pointer-up.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod camera;
mod controller;
mod dirty;
mod error;
mod id;
mod manager;
mod pan_zoom;
mod view;
mod viewport;

pub use camera::{CameraState, ViewStates};
pub use controller::{
    Controller, ControllerConfig, ControllerContext, ControllerFactory, ControllerKind,
    ControllerProps, InputEvent, InteractionState, InteractionStateCallback, ViewStateCallback,
    ViewStateChange, create_controller,
};
pub use dirty::DirtyFlag;
pub use error::InvalidSize;
pub use id::ViewId;
pub use manager::{
    DEFAULT_CANVAS_SIZE, RedrawOptions, ViewManager, ViewManagerOptions, ViewManagerProps,
};
pub use pan_zoom::PanZoomController;
pub use view::{
    DEFAULT_VIEW_ID, Extent, View, ViewKind, ViewLike, ViewportFactory, ViewportRequest,
    normalize_views,
};
pub use viewport::{PixelRegion, ProjectOptions, Viewport};
