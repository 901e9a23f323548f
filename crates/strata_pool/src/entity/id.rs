//! # Entity Identifiers
//!
//! Entities are named by a persistent id that survives slot relocation.
//! Slot indices are physical and change when other entities are removed;
//! ids never do.

use std::fmt;

/// Stable identifier of an entity in an [`EntityPool`](super::EntityPool).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u32::MAX);

    /// Creates an entity ID from its raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345);
        assert_eq!(id.get(), 12345);
        assert!(!id.is_null());
        assert!(EntityId::default().is_null());
        assert_eq!(id.to_string(), "#12345");
    }
}
