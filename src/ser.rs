//! JSON serialization.
//!
//! Two halves live here:
//!
//! - the text writer, which renders a [`Value`] as JSON for a given [`JsonOptions`]
//! - [`ValueSerializer`], a serde `Serializer` that turns any `T: Serialize` into a [`Value`]
//!
//! The writer quotes map keys only when they are not identifiers, separates entries with
//! `", "` and writes `key: value` pairs:
//!
//! ```rust
//! use serde_pivot::json;
//!
//! let value = json::parse(r#"{"name": "Ada", "born in": 1815, "tags": ['x']}"#).unwrap();
//! assert_eq!(json::to_string(&value).unwrap(), r#"{name: "Ada", "born in": 1815, tags: ["x"]}"#);
//! ```
//!
//! Characters the output charset cannot hold are written as `\uXXXX` escapes, using
//! surrogate pairs outside the Basic Multilingual Plane.

use crate::de::is_identifier;
use crate::options::JsonOptions;
use crate::{Error, List, Map, Number, Result, Value};
use serde::{ser, Serialize};
use std::fmt::Write;

/// Renders `value` as JSON text.
pub(crate) fn value_to_string(value: &Value, options: &JsonOptions) -> Result<String> {
    let mut output = String::new();
    write_value(&mut output, value, options)?;
    Ok(output)
}

/// Appends `value` to `output`, rejecting non-finite doubles before anything is written.
pub(crate) fn write_value(output: &mut String, value: &Value, options: &JsonOptions) -> Result<()> {
    check_finite(value)?;
    render(output, value, options);
    Ok(())
}

/// Text for `Display`: like [`write_value`], but non-finite doubles print as `NaN`/`inf`.
pub(crate) fn display_string(value: &Value) -> String {
    let mut output = String::new();
    render(&mut output, value, &JsonOptions::default());
    output
}

fn check_finite(value: &Value) -> Result<()> {
    match value {
        Value::Number(Number::Double(d)) if !d.is_finite() => Err(Error::invalid_argument(format!(
            "{} is not a valid JSON number",
            d
        ))),
        Value::List(list) => list.iter().try_for_each(check_finite),
        Value::Map(map) => map.values().try_for_each(check_finite),
        _ => Ok(()),
    }
}

fn render(output: &mut String, value: &Value, options: &JsonOptions) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(b) => output.push_str(if *b { "true" } else { "false" }),
        // Writing to a String cannot fail.
        Value::Number(n) => {
            let _ = write!(output, "{}", n);
        }
        Value::String(s) => write_string(output, s, options),
        Value::List(list) => render_list(output, list, options),
        Value::Map(map) => render_map(output, map, options),
    }
}

fn render_list(output: &mut String, list: &List, options: &JsonOptions) {
    output.push('[');
    for (i, item) in list.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        render(output, item, options);
    }
    output.push(']');
}

fn render_map(output: &mut String, map: &Map, options: &JsonOptions) {
    output.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        if options.always_delimit_map_keys || !is_identifier(key) {
            write_string(output, key, options);
        } else {
            output.push_str(key);
        }
        output.push_str(": ");
        render(output, value, options);
    }
    output.push('}');
}

fn write_string(output: &mut String, s: &str, options: &JsonOptions) {
    let max = options.charset.max_char();
    output.push('"');
    for ch in s.chars() {
        match ch {
            '\t' => output.push_str("\\t"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\u{c}' => output.push_str("\\f"),
            '\u{8}' => output.push_str("\\b"),
            '\\' => output.push_str("\\\\"),
            '"' => output.push_str("\\\""),
            '\'' => output.push_str("\\'"),
            c if c.is_control() || c > max => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(output, "\\u{:04X}", unit);
                }
            }
            c => output.push(c),
        }
    }
    output.push('"');
}

/// Serializes any `T: Serialize` into a [`Value`].
///
/// Integers keep their width where it fits the value model: `i8`, `i16`, `i32`, `u8` and
/// `u16` become `Int`; `i64` and `u32` become `Long`; `u64` becomes `Long`, or `Double`
/// above `i64::MAX`. Enum variants with data become single-entry maps keyed by the
/// variant name.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_pivot::{to_value, Number, Value};
///
/// #[derive(Serialize)]
/// enum Shape { Circle { r: f64 } }
///
/// let value = to_value(&Shape::Circle { r: 1.5 }).unwrap();
/// assert_eq!(value.to_string(), "{Circle: {r: 1.5}}");
/// assert_eq!(to_value(&7u8).unwrap(), Value::Number(Number::Int(7)));
/// ```
pub struct ValueSerializer;

pub struct SerializeVec {
    items: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: Map,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

/// Wraps `value` as `{variant: value}`.
fn variant_entry(variant: &str, value: Value) -> Value {
    Value::Map(std::iter::once((variant.to_string(), value)).collect())
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        match i64::try_from(v) {
            Ok(l) => Ok(Value::Number(Number::Long(l))),
            Err(_) => Ok(Value::Number(Number::Double(v as f64))),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::List(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(variant_entry(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            items: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn finish(self) -> Value {
        let list = Value::List(List::from(self.items));
        match self.variant {
            Some(variant) => variant_entry(variant, list),
            None => list,
        }
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Map::new(),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Value {
        let map = Value::Map(self.map);
        match self.variant {
            Some(variant) => variant_entry(variant, map),
            None => map,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = match to_value(key)? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => return Err(Error::type_mismatch("string key", other.type_name())),
        };
        self.current_key = Some(key);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?)?;
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

/// Converts any `T: Serialize` to a [`Value`].
///
/// # Errors
///
/// Fails when a map key is not a scalar, or when `T`'s `Serialize` impl reports an error.
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Charset;

    fn render(value: &Value, options: &JsonOptions) -> String {
        value_to_string(value, options).unwrap()
    }

    #[test]
    fn test_escapes() {
        let value = Value::from("tab\t quote\" apos' back\\ nul\u{0}");
        assert_eq!(
            render(&value, &JsonOptions::default()),
            r#""tab\t quote\" apos\' back\\ nul\u0000""#
        );
    }

    #[test]
    fn test_charset_limits() {
        let value = Value::from("caf\u{e9} \u{20ac} \u{1f600}");
        assert_eq!(
            render(&value, &JsonOptions::default()),
            "\"caf\u{e9} \u{20ac} \u{1f600}\""
        );
        assert_eq!(
            render(&value, &JsonOptions::new().with_charset(Charset::Iso8859_1)),
            "\"caf\u{e9} \\u20AC \\uD83D\\uDE00\""
        );
        assert_eq!(
            render(&value, &JsonOptions::new().with_charset(Charset::UsAscii)),
            "\"caf\\u00E9 \\u20AC \\uD83D\\uDE00\""
        );
    }

    #[test]
    fn test_key_delimiting() {
        let map: Map = vec![
            ("plain".to_string(), Value::from(1)),
            ("with space".to_string(), Value::from(2)),
            ("".to_string(), Value::from(3)),
        ]
        .into_iter()
        .collect();
        let value = Value::Map(map);

        assert_eq!(
            render(&value, &JsonOptions::default()),
            r#"{plain: 1, "with space": 2, "": 3}"#
        );
        assert_eq!(
            render(&value, &JsonOptions::new().with_always_delimit_map_keys(true)),
            r#"{"plain": 1, "with space": 2, "": 3}"#
        );
    }

    #[test]
    fn test_non_finite_double_rejected() {
        assert!(value_to_string(&Value::from(f64::NAN), &JsonOptions::default()).is_err());
        assert!(value_to_string(&Value::from(f64::INFINITY), &JsonOptions::default()).is_err());
        let nested = Value::from(vec![Value::from(1), Value::from(f64::NEG_INFINITY)]);
        let mut output = String::from("kept");
        assert!(write_value(&mut output, &nested, &JsonOptions::default()).is_err());
        assert_eq!(output, "kept");
    }

    #[test]
    fn test_to_value_widths() {
        assert_eq!(to_value(&5i8).unwrap(), Value::Number(Number::Int(5)));
        assert!(matches!(to_value(&5i64).unwrap(), Value::Number(Number::Long(5))));
        assert!(matches!(
            to_value(&u64::MAX).unwrap(),
            Value::Number(Number::Double(_))
        ));
    }

    #[test]
    fn test_to_value_map_keys() {
        let mut source = std::collections::BTreeMap::new();
        source.insert(1, "one");
        let value = to_value(&source).unwrap();
        assert_eq!(value.as_map().and_then(|m| m.get("1")), Some(&Value::from("one")));

        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![1], 1);
        assert!(to_value(&bad).is_err());
    }
}
