// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View identifiers.

use alloc::string::String;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::fmt;

/// Identifier of a view descriptor.
///
/// View ids key controllers, per-view camera state, and the viewport lookup
/// map. Cloning is cheap (a reference-count bump), and a `ViewId` can be looked
/// up in maps by `&str` through its [`Borrow`] impl.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(Arc<str>);

impl ViewId {
    /// Creates a view id from a string slice.
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewId").field(&&*self.0).finish()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ViewId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ViewId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ViewId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ViewId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&Self> for ViewId {
    fn from(id: &Self) -> Self {
        id.clone()
    }
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;
    use alloc::format;

    use super::ViewId;

    #[test]
    fn lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(ViewId::new("main"), 1);
        assert_eq!(map.get("main"), Some(&1));
        assert_eq!(map.get("minimap"), None);
    }

    #[test]
    fn display_and_debug() {
        let id = ViewId::from("main");
        assert_eq!(format!("{id}"), "main");
        assert_eq!(format!("{id:?}"), "ViewId(\"main\")");
    }
}
