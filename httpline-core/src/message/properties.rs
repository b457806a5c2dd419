//! Per-request property bag.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Shared value stored in [`Properties`].
pub type PropertyValue = Arc<dyn Any + Send + Sync>;

/// Opaque metadata carried alongside a request so stages can talk to each
/// other without touching headers.
///
/// Values are reference counted, so cloning the bag is shallow: both copies
/// point at the same values.
#[derive(Clone, Default)]
pub struct Properties {
    entries: HashMap<String, PropertyValue>,
}

impl Properties {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under `key`, returning the previous one.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T) -> Option<PropertyValue>
    where
        T: Any + Send + Sync,
    {
        self.entries.insert(key.into(), Arc::new(value))
    }

    /// Store an already shared value.
    pub fn insert_shared(
        &mut self,
        key: impl Into<String>,
        value: PropertyValue,
    ) -> Option<PropertyValue> {
        self.entries.insert(key.into(), value)
    }

    /// Typed lookup. Returns `None` if the key is missing or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Untyped lookup.
    pub fn get_shared(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.remove(key)
    }

    /// Check for a key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Properties").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_lookup() {
        let mut props = Properties::new();
        props.insert("tenant", "contoso".to_string());
        props.insert("priority", 7u32);

        assert_eq!(props.get::<String>("tenant").unwrap(), "contoso");
        assert_eq!(props.get::<u32>("priority"), Some(&7));
        assert!(props.get::<u64>("priority").is_none());
        assert!(props.get::<u32>("missing").is_none());
    }

    #[test]
    fn test_clone_is_shallow() {
        let mut props = Properties::new();
        props.insert("tenant", "contoso".to_string());

        let copy = props.clone();
        let a = props.get_shared("tenant").unwrap();
        let b = copy.get_shared("tenant").unwrap();
        assert!(Arc::ptr_eq(a, b));
    }
}
