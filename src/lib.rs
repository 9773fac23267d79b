//! # serde_pivot
//!
//! Stream codecs for lenient JSON and CSV, path navigation over JSON values, and an
//! offset-indexed rich-text document tree.
//!
//! ## What's inside
//!
//! - **JSON** ([`json`], [`JsonSerializer`]): a hand-written recursive-descent reader that
//!   accepts `//` and `/* */` comments, single-quoted strings and unquoted identifier keys,
//!   and a writer that quotes keys only when it has to. Integers narrow to `i32` when they
//!   fit, to `i64` otherwise; anything with `.`, `e` or `E` is a double. Optional
//!   `#define`/`${NAME}` macro expansion is available for configuration-style input.
//! - **CSV** ([`csv`], [`CsvSerializer`]): quoted fields with embedded commas, quotes and
//!   line breaks, header inference, batch reads and a streaming record iterator.
//! - **Paths** ([`path`]): `a[0].b` or `map["odd key"]` navigation with `get`, `put`,
//!   `remove` and `contains_key`, over [`Value`] trees or any [`Dictionary`].
//! - **Documents** ([`document`]): elements, paragraphs and text nodes with character-offset
//!   range extraction, removal and insertion, and change notification.
//! - **Serde**: [`from_str`], [`to_string`], [`to_value`] and [`from_value`] bind Rust types
//!   to the JSON dialect. String fields coerce to numbers and booleans on the way in, which
//!   is what lets CSV rows bind to typed structs.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_pivot::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user: User = from_str("{ id: 123, name: 'Alice', /* flag */ active: true }").unwrap();
//! assert_eq!(user, User { id: 123, name: "Alice".to_string(), active: true });
//!
//! assert_eq!(to_string(&user).unwrap(), r#"{id: 123, name: "Alice", active: true}"#);
//! ```
//!
//! ### Dynamic values
//!
//! ```rust
//! use serde_pivot::{json, path, Value};
//!
//! let mut data = json!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//!
//! assert_eq!(path::get_str(&data, "tags[1]").unwrap(), Some("serde"));
//! path::put(&mut data, "name", Value::from("Bob")).unwrap();
//! assert_eq!(path::get_str(&data, "name").unwrap(), Some("Bob"));
//! ```
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]: read failures at `error`, input and output echo at
//! `debug` when the `verbose` option is set, and tree mutations and macro definitions at
//! `trace`. No subscriber is installed.
//!
//! ## Examples
//!
//! The `demos/` directory holds runnable programs:
//!
//! - **`json_paths.rs`** - parse, navigate and modify a JSON document
//! - **`csv_stream.rs`** - stream typed records out of CSV and write them back
//! - **`document_ranges.rs`** - cut and paste ranges in a document tree
//!
//! Run any of them with: `cargo run --example <name>`

pub mod csv;
pub mod de;
pub mod document;
pub mod error;
pub mod json;
pub mod list;
pub mod listener;
pub mod macros;
pub mod map;
pub mod options;
pub mod path;
mod reader;
pub mod ser;
pub mod value;

pub use csv::{CsvRecords, CsvSerializer};
pub use de::{from_value, Deserializer};
pub use document::{DocumentTree, ElementKind, NodeId, TreeEvent, TreeListener};
pub use error::{Error, Result};
pub use json::JsonSerializer;
pub use list::List;
pub use listener::{CsvListener, JsonListener};
pub use map::Map;
pub use options::{Charset, CsvOptions, JsonOptions};
pub use path::{BeanAdapter, Dictionary};
pub use ser::{to_value, ValueSerializer};
pub use value::{Number, Value};

use serde::{Deserialize, Serialize};
use std::io;

/// Serialize any `T: Serialize` to a JSON string.
///
/// Map keys are written bare when they are identifiers and quoted otherwise.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::to_string;
/// use std::collections::BTreeMap;
///
/// let mut map = BTreeMap::new();
/// map.insert("plain", 1);
/// map.insert("two words", 2);
///
/// assert_eq!(to_string(&map).unwrap(), r#"{plain: 1, "two words": 2}"#);
/// ```
///
/// # Errors
///
/// Returns an error for values the value model cannot hold, such as non-finite floats or
/// map keys that are not strings, numbers or booleans.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    ser::value_to_string(&value, &JsonOptions::default())
}

/// Serialize any `T: Serialize` to a writer as UTF-8 JSON.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &vec!["a", "b"]).unwrap();
/// assert_eq!(buffer, br#"["a", "b"]"#.to_vec());
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let value = to_value(value)?;
    JsonSerializer::new().write_value(&value, writer)
}

/// Deserialize an instance of type `T` from a string of JSON text.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{x: 1, y: '2'}").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is malformed or cannot be bound to `T`.
/// Syntax errors carry line and column information.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_str(s);
    T::deserialize(&mut deserializer)
}

/// Deserialize an instance of type `T` from a UTF-8 byte stream.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::from_reader;
/// use std::io::Cursor;
///
/// let values: Vec<i64> = from_reader(Cursor::new(b"[1, 2, 3]")).unwrap();
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, the input is malformed, or the data cannot be
/// bound to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(reader: R) -> Result<T>
where
    R: io::Read,
    T: for<'de> Deserialize<'de>,
{
    let mut deserializer = Deserializer::from_reader(reader);
    T::deserialize(&mut deserializer)
}

/// Deserialize an instance of type `T` from bytes of UTF-8 JSON text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, the input is malformed, or the data
/// cannot be bound to `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}
