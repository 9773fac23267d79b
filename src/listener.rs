//! Callbacks fired while the codecs read their input.
//!
//! Register listeners with [`JsonSerializer::add_listener`](crate::JsonSerializer::add_listener)
//! or [`CsvSerializer::add_listener`](crate::CsvSerializer::add_listener). Every method has
//! an empty default body, so implementors only override the events they care about.
//!
//! ```rust
//! use serde_pivot::listener::JsonListener;
//! use serde_pivot::{JsonSerializer, Value};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct KeyCollector(Rc<RefCell<Vec<String>>>);
//!
//! impl JsonListener for KeyCollector {
//!     fn read_key(&mut self, key: &str) {
//!         self.0.borrow_mut().push(key.to_string());
//!     }
//! }
//!
//! let keys = Rc::new(RefCell::new(Vec::new()));
//! let mut serializer = JsonSerializer::new();
//! serializer.add_listener(KeyCollector(keys.clone()));
//! serializer.read_str("{a: 1, b: {c: 2}}").unwrap();
//!
//! assert_eq!(*keys.borrow(), vec!["a", "b", "c"]);
//! ```

use crate::{Number, Value};

/// Events produced by the JSON reader, in document order.
pub trait JsonListener {
    fn read_null(&mut self) {}

    fn read_string(&mut self, _value: &str) {}

    fn read_number(&mut self, _value: Number) {}

    fn read_boolean(&mut self, _value: bool) {}

    fn begin_list(&mut self) {}

    fn end_list(&mut self) {}

    fn begin_map(&mut self) {}

    /// A map key was read; its value follows.
    fn read_key(&mut self, _key: &str) {}

    fn end_map(&mut self) {}
}

/// Events produced by the CSV reader.
pub trait CsvListener {
    fn begin_list(&mut self) {}

    /// A record was read, before it is bound to the item type.
    fn read_item(&mut self, _item: &Value) {}

    fn end_list(&mut self) {}
}

/// A listener list, notified in registration order.
pub(crate) struct Listeners<L: ?Sized> {
    listeners: Vec<Box<L>>,
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Listeners {
            listeners: Vec::new(),
        }
    }
}

impl<L: ?Sized> Listeners<L> {
    pub(crate) fn add(&mut self, listener: Box<L>) {
        self.listeners.push(listener);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn each(&mut self, mut f: impl FnMut(&mut L)) {
        for listener in &mut self.listeners {
            f(listener.as_mut());
        }
    }
}

impl<L: ?Sized> std::fmt::Debug for Listeners<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listeners({})", self.listeners.len())
    }
}
