// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sticky invalidation flags carrying a human-readable reason.

use alloc::string::{String, ToString};

/// A level-triggered dirty flag that remembers why it was raised.
///
/// Raising an already raised flag keeps the first reason; the flag only
/// returns to clean when it is explicitly taken or cleared. Several raises
/// between two consumptions therefore coalesce into one pending signal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyFlag {
    reason: Option<String>,
}

impl DirtyFlag {
    /// A clean flag.
    #[must_use]
    pub const fn clean() -> Self {
        Self { reason: None }
    }

    /// A flag already raised with `reason`.
    #[must_use]
    pub fn raised(reason: &str) -> Self {
        Self {
            reason: Some(reason.to_string()),
        }
    }

    /// Raises the flag unless it is already raised.
    ///
    /// Returns `true` if this call raised it.
    pub fn raise(&mut self, reason: &str) -> bool {
        if self.reason.is_some() {
            return false;
        }
        self.reason = Some(reason.to_string());
        true
    }

    /// Returns `true` while the flag is raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.reason.is_some()
    }

    /// Returns the pending reason without consuming it.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Consumes the pending reason, leaving the flag clean.
    pub fn take(&mut self) -> Option<String> {
        self.reason.take()
    }
}

#[cfg(test)]
mod tests {
    use super::DirtyFlag;

    #[test]
    fn first_reason_wins_until_taken() {
        let mut flag = DirtyFlag::clean();
        assert!(flag.raise("Size changed"));
        assert!(!flag.raise("views changed"));
        assert_eq!(flag.reason(), Some("Size changed"));

        assert_eq!(flag.take().as_deref(), Some("Size changed"));
        assert!(!flag.is_raised());
        assert_eq!(flag.take(), None);

        assert!(flag.raise("views changed"));
        assert_eq!(flag.reason(), Some("views changed"));
    }
}
