//! The JSON codec facade.
//!
//! [`JsonSerializer`] reads and writes [`Value`]s over byte streams using a
//! [`JsonOptions`] configuration and notifies registered [`JsonListener`]s while reading.
//! The free functions in this module cover the common string-based cases.
//!
//! ## Examples
//!
//! ```rust
//! use serde_pivot::json;
//!
//! let value = json::parse("{ /* c */ \"a\": 1 // tail\n }").unwrap();
//! assert_eq!(value, json::parse(r#"{"a":1}"#).unwrap());
//!
//! assert_eq!(json::parse_i32("42").unwrap(), 42);
//! assert_eq!(json::parse_string("'hi'").unwrap(), "hi");
//! ```

use crate::de::Parser;
use crate::listener::{JsonListener, Listeners};
use crate::options::JsonOptions;
use crate::reader::Cursor;
use crate::{Error, List, Map, Result, Value};
use std::io::{Read, Write};

/// Reads and writes JSON values over byte streams.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::{Charset, JsonOptions, JsonSerializer};
///
/// let mut serializer = JsonSerializer::with_options(
///     JsonOptions::new().with_charset(Charset::Iso8859_1),
/// );
/// assert_eq!(serializer.mime_type(), "application/json; charset=ISO-8859-1");
///
/// let value = serializer.read_value(&b"['caf\xe9']"[..]).unwrap();
///
/// let mut out = Vec::new();
/// serializer.write_value(&value, &mut out).unwrap();
/// assert_eq!(out, b"[\"caf\xe9\"]".to_vec());
/// ```
#[derive(Debug, Default)]
pub struct JsonSerializer {
    options: JsonOptions,
    listeners: Listeners<dyn JsonListener>,
}

impl JsonSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: JsonOptions) -> Self {
        JsonSerializer {
            options,
            listeners: Listeners::default(),
        }
    }

    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    /// Registers a listener to be notified during subsequent reads.
    pub fn add_listener<L: JsonListener + 'static>(&mut self, listener: L) {
        self.listeners.add(Box::new(listener));
    }

    /// The MIME type of the output, including the configured charset.
    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("application/json; charset={}", self.options.charset.name())
    }

    /// Reads one value from `reader`, decoding it with the configured charset.
    ///
    /// Reading stops right after the value; trailing input is not examined.
    ///
    /// # Errors
    ///
    /// [`Error::Syntax`] for malformed input, [`Error::Io`] if the stream fails.
    pub fn read_value<R: Read>(&mut self, reader: R) -> Result<Value> {
        let cursor = Cursor::for_reader(reader, self.options.charset, self.options.allow_macros);
        self.read_from(cursor)
    }

    /// Reads one value from a string.
    pub fn read_str(&mut self, text: &str) -> Result<Value> {
        let cursor = Cursor::for_str(text, self.options.allow_macros);
        self.read_from(cursor)
    }

    fn read_from(&mut self, cursor: Cursor<'_>) -> Result<Value> {
        let mut cursor = cursor.with_echo(self.options.verbose);
        let result = Parser::new(&mut cursor, &mut self.listeners).parse();

        if let Some(echo) = cursor.take_echo() {
            tracing::debug!(input = %echo, "json read");
        }
        if let Err(err) = &result {
            tracing::error!(line = err.line().unwrap_or_else(|| cursor.line()), error = %err, "failed to read JSON");
        }
        result
    }

    /// Writes `value` to `writer`, encoded with the configured charset.
    ///
    /// # Errors
    ///
    /// Fails for non-finite doubles, or if the writer fails.
    pub fn write_value<W: Write>(&self, value: &Value, mut writer: W) -> Result<()> {
        let text = self.write_to_string(value)?;
        writer.write_all(&self.options.charset.encode(&text))?;
        writer.flush()?;
        Ok(())
    }

    /// Renders `value` as JSON text without encoding it.
    pub fn write_to_string(&self, value: &Value) -> Result<String> {
        let text = crate::ser::value_to_string(value, &self.options)?;
        if self.options.verbose {
            tracing::debug!(output = %text, "json write");
        }
        Ok(text)
    }
}

/// Parses a JSON value from a string with default options.
///
/// # Errors
///
/// Returns [`Error::Syntax`] for malformed input.
pub fn parse(text: &str) -> Result<Value> {
    JsonSerializer::new().read_str(text)
}

/// Renders a value as JSON text with default options.
pub fn to_string(value: &Value) -> Result<String> {
    crate::ser::value_to_string(value, &JsonOptions::default())
}

/// Renders a value as JSON text, quoting map keys when `always_delimit_map_keys` is set.
///
/// ```rust
/// use serde_pivot::json;
///
/// let value = json::parse("{a: 1}").unwrap();
/// assert_eq!(json::to_string_delimited(&value, true).unwrap(), r#"{"a": 1}"#);
/// assert_eq!(json::to_string_delimited(&value, false).unwrap(), "{a: 1}");
/// ```
pub fn to_string_delimited(value: &Value, always_delimit_map_keys: bool) -> Result<String> {
    let options = JsonOptions::new().with_always_delimit_map_keys(always_delimit_map_keys);
    crate::ser::value_to_string(value, &options)
}

fn parse_as<T>(text: &str, expected: &str, extract: impl FnOnce(Value) -> Option<T>) -> Result<T> {
    let value = parse(text)?;
    let found = value.type_name();
    extract(value).ok_or_else(|| Error::type_mismatch(expected, found))
}

/// Parses a JSON string literal.
pub fn parse_string(text: &str) -> Result<String> {
    parse_as(text, "string", |v| match v {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Parses a JSON number that fits in an `i32`.
///
/// ```rust
/// use serde_pivot::json;
///
/// assert_eq!(json::parse_i32("-7").unwrap(), -7);
/// assert!(json::parse_i32("2147483648").is_err());
/// assert!(json::parse_i32("'7'").is_err());
/// ```
pub fn parse_i32(text: &str) -> Result<i32> {
    parse_as(text, "integer", |v| v.as_number().and_then(|n| n.as_i32()))
}

pub fn parse_i64(text: &str) -> Result<i64> {
    parse_as(text, "integer", |v| v.as_i64())
}

pub fn parse_f64(text: &str) -> Result<f64> {
    parse_as(text, "number", |v| v.as_f64())
}

pub fn parse_bool(text: &str) -> Result<bool> {
    parse_as(text, "boolean", |v| v.as_bool())
}

pub fn parse_list(text: &str) -> Result<List> {
    parse_as(text, "list", |v| match v {
        Value::List(list) => Some(list),
        _ => None,
    })
}

pub fn parse_map(text: &str) -> Result<Map> {
    parse_as(text, "map", |v| match v {
        Value::Map(map) => Some(map),
        _ => None,
    })
}
