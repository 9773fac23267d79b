//! Dynamic value representation for JSON data.
//!
//! [`Value`] is the closed set of things the JSON reader can produce and the writer can
//! emit: null, booleans, numbers, strings, [`List`]s and [`Map`]s.
//!
//! ## Numbers
//!
//! [`Number`] keeps the width the text was read at. Integer literals become the narrowest
//! of `Int` (i32) and `Long` (i64) that holds them; anything with a decimal point or an
//! exponent is a `Double`. `Int` and `Long` compare by value, so `Int(5) == Long(5)`.
//!
//! ```rust
//! use serde_pivot::{json, Number, Value};
//!
//! assert_eq!(json::parse("2147483647").unwrap(), Value::Number(Number::Int(i32::MAX)));
//! assert_eq!(json::parse("2147483648").unwrap(), Value::Number(Number::Long(2147483648)));
//! assert_eq!(json::parse("3.0").unwrap(), Value::Number(Number::Double(3.0)));
//! ```
//!
//! ## Extracting Values
//!
//! ```rust
//! use serde_pivot::Value;
//! use std::convert::TryFrom;
//!
//! let value = Value::from(42);
//! assert!(value.is_number());
//! assert_eq!(i64::try_from(value).unwrap(), 42);
//! ```

use crate::{List, Map};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Any value the JSON codec can read or write.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("a", Value::from(1)).unwrap();
/// let value = Value::Map(map);
///
/// assert!(value.is_map());
/// assert_eq!(value.to_string(), "{a: 1}");
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(List),
    Map(Map),
}

/// A numeric value at the width it was read or built at.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::Number;
///
/// assert_eq!(Number::Int(5), Number::Long(5));
/// assert_ne!(Number::Int(5), Number::Double(5.0));
/// assert_eq!(Number::from_i64(1 << 40), Number::Long(1 << 40));
/// assert!(Number::from_i64(7).is_i32());
/// ```
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i32),
    Long(i64),
    Double(f64),
}

impl Number {
    /// Picks `Int` when the value fits in 32 bits and `Long` otherwise.
    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Long(value),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_i32(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_i64(&self) -> bool {
        matches!(self, Number::Long(_))
    }

    /// Returns `true` for `Int` and `Long`.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_) | Number::Long(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_double(&self) -> bool {
        matches!(self, Number::Double(_))
    }

    /// Converts to `i64`; doubles convert only when they are whole and in range.
    ///
    /// ```rust
    /// use serde_pivot::Number;
    ///
    /// assert_eq!(Number::Int(42).as_i64(), Some(42));
    /// assert_eq!(Number::Double(42.0).as_i64(), Some(42));
    /// assert_eq!(Number::Double(42.5).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Int(i) => Some(i64::from(*i)),
            Number::Long(l) => Some(*l),
            Number::Double(d) => {
                if d.fract() == 0.0 && *d >= i64::MIN as f64 && *d < i64::MAX as f64 {
                    Some(*d as i64)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|l| i32::try_from(l).ok())
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => f64::from(*i),
            Number::Long(l) => *l as f64,
            Number::Double(d) => *d,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Double(a), Number::Double(b)) => a == b,
            (Number::Double(_), _) | (_, Number::Double(_)) => false,
            _ => self.as_i64() == other.as_i64(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Long(l) => write!(f, "{}", l),
            // `{:?}` always keeps a decimal point or an exponent, so the text reads back as a double
            Number::Double(d) => write!(f, "{:?}", d),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Int(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Long(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Double(value)
    }
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// A short name for the variant, used in type mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// If the value is an integer or a whole double, returns it as `i64`.
    ///
    /// ```rust
    /// use serde_pivot::{Number, Value};
    ///
    /// assert_eq!(Value::Number(Number::Int(42)).as_i64(), Some(42));
    /// assert_eq!(Value::Number(Number::Double(42.5)).as_i64(), None);
    /// assert_eq!(Value::from("42").as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list_mut(&mut self) -> Option<&mut List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map_mut(&mut self) -> Option<&mut Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Marks every list and map reachable from this value read-only.
    ///
    /// ```rust
    /// use serde_pivot::json;
    ///
    /// let mut value = json::parse("{a: [1, 2]}").unwrap();
    /// value.make_read_only();
    /// assert!(value.is_read_only());
    /// assert!(serde_pivot::path::put(&mut value, "a[0]", 5.into()).is_err());
    /// ```
    pub fn make_read_only(&mut self) {
        match self {
            Value::List(list) => list.make_read_only(),
            Value::Map(map) => map.make_read_only(),
            _ => {}
        }
    }

    /// Returns `true` if this is a read-only container. Scalars are never read-only.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        match self {
            Value::List(list) => list.is_read_only(),
            Value::Map(map) => map.is_read_only(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Formats the value as compact JSON text; non-finite doubles print as `NaN` or `inf`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::ser::display_string(self))
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i32(*i),
            Value::Number(Number::Long(l)) => serializer.serialize_i64(*l),
            Value::Number(Number::Double(d)) => serializer.serialize_f64(*d),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(list) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for element in list {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                use serde::ser::SerializeMap;
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::from_i64(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                match i64::try_from(value) {
                    Ok(l) => Ok(Value::Number(Number::from_i64(l))),
                    Err(_) => Ok(Value::Number(Number::Double(value as f64))),
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Double(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut items = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    items.push(elem);
                }
                Ok(Value::List(List::from(items)))
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(Value::Map(entries.into_iter().collect()))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i32 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match &value {
            Value::Number(n) => n
                .as_i32()
                .ok_or_else(|| crate::Error::custom(format!("cannot convert {} to i32", n))),
            other => Err(crate::Error::type_mismatch("integer", other.type_name())),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match &value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| crate::Error::custom(format!("cannot convert {} to i64", n))),
            other => Err(crate::Error::type_mismatch("integer", other.type_name())),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(n) => Ok(n.as_f64()),
            other => Err(crate::Error::type_mismatch("number", other.type_name())),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(crate::Error::type_mismatch("boolean", other.type_name())),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(crate::Error::type_mismatch("string", other.type_name())),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Number(Number::Int(i32::from(value)))
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Number(Number::Int(i32::from(value)))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(Number::Int(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::Long(value))
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Number(Number::Int(i32::from(value)))
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Number(Number::Int(i32::from(value)))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(Number::Long(i64::from(value)))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::Double(f64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Double(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(List::from(value))
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
