//! Arena storage for proxies, zones and groups.
//!
//! Items are addressed by small `Copy` ids. Adding is an amortized push;
//! registering and unregistering only flip a flag, so both are O(1) and safe
//! to repeat.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Handle to a [`PlaybackProxy`](crate::playback::proxy::PlaybackProxy).
    ProxyId
);
arena_id!(
    /// Handle to a [`TriggerZone`](crate::zones::trigger::TriggerZone).
    ZoneId
);
arena_id!(
    /// Handle to a [`ZoneGroup`](crate::zones::group::ZoneGroup).
    GroupId
);

struct Entry<T> {
    item: T,
    registered: bool,
}

/// Append-only arena with a registration flag per item.
pub struct Registry<T> {
    entries: Vec<Entry<T>>,
    registered: usize,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            registered: 0,
        }
    }

    /// Store `item` (registered) and return its index.
    pub fn insert(&mut self, item: T) -> usize {
        self.entries.push(Entry {
            item,
            registered: true,
        });
        self.registered += 1;
        self.entries.len() - 1
    }

    /// Returns `true` if the flag changed.
    pub fn register(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if !entry.registered => {
                entry.registered = true;
                self.registered += 1;
                true
            }
            _ => false,
        }
    }

    /// Returns `true` if the flag changed.
    pub fn unregister(&mut self, index: usize) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.registered => {
                entry.registered = false;
                self.registered -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn is_registered(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.registered)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|e| &e.item)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|e| &mut e.item)
    }

    /// Registered items with their indices.
    pub fn iter_registered(&self) -> impl Iterator<Item = (usize, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.registered)
            .map(|(i, e)| (i, &e.item))
    }

    pub fn iter_registered_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> {
        self.entries
            .iter_mut()
            .enumerate()
            .filter(|(_, e)| e.registered)
            .map(|(i, e)| (i, &mut e.item))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn registered_count(&self) -> usize {
        self.registered
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = Registry::new();
        let idx = registry.insert("zone");

        assert!(!registry.register(idx));
        assert_eq!(registry.registered_count(), 1);

        assert!(registry.unregister(idx));
        assert!(!registry.unregister(idx));
        assert_eq!(registry.registered_count(), 0);
        assert_eq!(registry.iter_registered().count(), 0);

        assert!(registry.register(idx));
        assert!(registry.is_registered(idx));
    }

    #[test]
    fn unknown_indices_are_ignored() {
        let mut registry: Registry<u8> = Registry::new();
        assert!(!registry.register(3));
        assert!(!registry.unregister(3));
        assert!(registry.get(3).is_none());
    }
}
