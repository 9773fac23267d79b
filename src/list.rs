//! Ordered list type for JSON arrays.
//!
//! [`List`] is a `Vec<Value>` with the same shallow read-only flag as [`Map`](crate::Map).

use crate::{Error, Result, Value};

/// An ordered sequence of values.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::{List, Value};
///
/// let mut list = List::new();
/// list.push(Value::from(1)).unwrap();
/// list.push(Value::from("two")).unwrap();
///
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(1).and_then(|v| v.as_str()), Some("two"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct List {
    items: Vec<Value>,
    read_only: bool,
}

impl List {
    #[must_use]
    pub fn new() -> Self {
        List::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        List {
            items: Vec::with_capacity(capacity),
            read_only: false,
        }
    }

    /// Appends a value.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ReadOnly`] if the list is read-only.
    pub fn push(&mut self, value: Value) -> Result<()> {
        self.check_writable()?;
        self.items.push(value);
        Ok(())
    }

    /// Inserts a value at `index`, shifting later values back.
    pub fn insert(&mut self, index: usize, value: Value) -> Result<()> {
        self.check_writable()?;
        if index > self.items.len() {
            return Err(Error::index_out_of_bounds(index, self.items.len()));
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Replaces the value at `index`, returning the previous one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_pivot::{List, Value};
    ///
    /// let mut list: List = vec![Value::from(1)].into();
    /// assert_eq!(list.set(0, Value::from(2)).unwrap(), Value::from(1));
    /// assert!(list.set(5, Value::Null).is_err());
    /// ```
    pub fn set(&mut self, index: usize, value: Value) -> Result<Value> {
        self.check_writable()?;
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(Error::index_out_of_bounds(index, len)),
        }
    }

    /// Removes and returns the value at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Value> {
        self.check_writable()?;
        if index >= self.items.len() {
            return Err(Error::index_out_of_bounds(index, self.items.len()));
        }
        Ok(self.items.remove(index))
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Returns a mutable reference to the value at `index`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::ReadOnly`] if the list is read-only.
    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut Value>> {
        self.check_writable()?;
        Ok(self.items.get_mut(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Marks this list, and every container nested in it, read-only.
    pub fn make_read_only(&mut self) {
        for value in &mut self.items {
            value.make_read_only();
        }
        self.read_only = true;
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            Err(Error::read_only("list"))
        } else {
            Ok(())
        }
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        List {
            items,
            read_only: false,
        }
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for List {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut list: List = vec![Value::from(1), Value::from(2)].into();
        assert!(matches!(
            list.remove(2),
            Err(Error::IndexOutOfBounds { index: 2, len: 2 })
        ));
        assert!(list.insert(2, Value::from(3)).is_ok());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_read_only_is_recursive() {
        let inner: List = vec![Value::from(1)].into();
        let mut outer: List = vec![Value::List(inner)].into();
        outer.make_read_only();

        assert!(outer.push(Value::Null).is_err());
        match outer.get(0) {
            Some(Value::List(inner)) => assert!(inner.is_read_only()),
            other => panic!("Expected nested list, got {:?}", other),
        }
    }
}
