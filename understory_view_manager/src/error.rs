// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use core::fmt;

/// Error returned when a canvas size is not made of finite numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InvalidSize {
    /// The rejected width.
    pub width: f64,
    /// The rejected height.
    pub height: f64,
}

impl InvalidSize {
    /// Checks a canvas size.
    pub(crate) fn check(width: f64, height: f64) -> Result<(), Self> {
        if width.is_finite() && height.is_finite() {
            Ok(())
        } else {
            Err(Self { width, height })
        }
    }
}

impl fmt::Display for InvalidSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "canvas size must be finite, got {}x{}",
            self.width, self.height
        )
    }
}

impl core::error::Error for InvalidSize {}
