//! Ordered map type for JSON objects.
//!
//! [`Map`] wraps an [`IndexMap`] so that keys iterate in insertion order, which is the
//! order the parser read them in and the order the writer emits them in.
//!
//! A map can be switched to read-only with [`Map::make_read_only`]; afterwards every
//! mutating method fails with [`Error::ReadOnly`](crate::Error::ReadOnly). The flag is
//! shallow: nested containers carry their own.
//!
//! ## Examples
//!
//! ```rust
//! use serde_pivot::{Map, Value};
//!
//! let mut map = Map::new();
//! map.insert("name", Value::from("Alice")).unwrap();
//! map.insert("age", Value::from(30)).unwrap();
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//!
//! map.make_read_only();
//! assert!(map.insert("other", Value::Null).is_err());
//! ```

use crate::path::Dictionary;
use crate::{Error, Result, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// An insertion-ordered map of string keys to values.
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: IndexMap<String, Value>,
    read_only: bool,
}

impl Map {
    /// Creates an empty, mutable `Map`.
    #[must_use]
    pub fn new() -> Self {
        Map::default()
    }

    /// Creates an empty `Map` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map {
            entries: IndexMap::with_capacity(capacity),
            read_only: false,
        }
    }

    /// Inserts a key-value pair, returning the previous value for the key.
    ///
    /// An existing key keeps its position; a new key is appended.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ReadOnly`] if the map is read-only.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_pivot::{Map, Value};
    ///
    /// let mut map = Map::new();
    /// assert!(map.insert("key", Value::from(42)).unwrap().is_none());
    /// assert_eq!(map.insert("key", Value::from(43)).unwrap(), Some(Value::from(42)));
    /// ```
    pub fn insert<K: Into<String>>(&mut self, key: K, value: Value) -> Result<Option<Value>> {
        self.check_writable()?;
        Ok(self.entries.insert(key.into(), value))
    }

    /// Removes a key, preserving the order of the remaining entries.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ReadOnly`] if the map is read-only.
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        self.check_writable()?;
        Ok(self.entries.shift_remove(key))
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ReadOnly`] if the map is read-only.
    pub fn get_mut(&mut self, key: &str) -> Result<Option<&mut Value>> {
        self.check_writable()?;
        Ok(self.entries.get_mut(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.entries.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.entries.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Marks this map, and every container nested in it, read-only.
    pub fn make_read_only(&mut self) {
        for value in self.entries.values_mut() {
            value.make_read_only();
        }
        self.read_only = true;
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(Error::read_only("map"))
        } else {
            Ok(())
        }
    }
}

/// Maps are equal when they hold the same entries in the same order.
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Dictionary for Map {
    fn get(&self, key: &str) -> Option<Value> {
        Map::get(self, key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<Option<Value>> {
        self.insert(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        Map::remove(self, key)
    }

    fn contains_key(&self, key: &str) -> bool {
        Map::contains_key(self, key)
    }
}

impl From<HashMap<String, Value>> for Map {
    fn from(map: HashMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Map> for HashMap<String, Value> {
    fn from(map: Map) -> Self {
        map.entries.into_iter().collect()
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Map {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;
        let mut out = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            out.serialize_entry(k, v)?;
        }
        out.end()
    }
}

impl<'de> Deserialize<'de> for Map {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Map(map) => Ok(map),
            other => Err(serde::de::Error::custom(format!(
                "expected a map, found {}",
                other.type_name()
            ))),
        }
    }
}

impl FromIterator<(String, Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Map {
            entries: IndexMap::from_iter(iter),
            read_only: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut map = Map::new();
        map.insert("c", Value::from(1)).unwrap();
        map.insert("a", Value::from(2)).unwrap();
        map.insert("b", Value::from(3)).unwrap();
        map.remove("a").unwrap();

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["c", "b"]);
    }

    #[test]
    fn test_read_only_rejects_mutation() {
        let mut map = Map::new();
        map.insert("a", Value::from(1)).unwrap();
        map.make_read_only();

        assert!(matches!(map.insert("b", Value::Null), Err(Error::ReadOnly(_))));
        assert!(map.remove("a").is_err());
        assert!(map.get_mut("a").is_err());
        assert_eq!(map.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn test_equality_respects_order() {
        let ab: Map = vec![("a".to_string(), Value::from(1)), ("b".to_string(), Value::from(2))]
            .into_iter()
            .collect();
        let ba: Map = vec![("b".to_string(), Value::from(2)), ("a".to_string(), Value::from(1))]
            .into_iter()
            .collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn test_equality_ignores_read_only_flag() {
        let mut a: Map = vec![("k".to_string(), Value::from("v"))].into_iter().collect();
        let b = a.clone();
        a.make_read_only();
        assert_eq!(a, b);
    }
}
