//! JSON deserialization.
//!
//! The reader is a single-pass recursive-descent parser over a character [`Cursor`]. It is
//! deliberately lenient about the input it accepts:
//!
//! - `//` line comments and `/* */` block comments wherever whitespace may appear
//! - strings delimited by either `"` or `'`
//! - map keys written as bare identifiers
//! - a leading `+` on numbers
//! - a leading byte-order mark
//!
//! Integer literals are read at the narrowest width that holds them (see [`Number`]).
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_pivot::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let point: Point = from_str("{ x: 1, /* second */ y: '2' }").unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```
//!
//! ## Binding
//!
//! [`from_value`] converts an already parsed [`Value`] into any `T: Deserialize`. Scalars
//! are coerced where the text is unambiguous: a string holding `"42"` binds to an integer
//! field, `"true"` to a boolean, and a number binds to a string field as its decimal text.

use crate::listener::{JsonListener, Listeners};
use crate::reader::Cursor;
use crate::{Error, List, Map, Number, Result, Value};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;
use std::io::Read;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Recursive-descent reader producing a [`Value`] and firing listener events.
pub(crate) struct Parser<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
    listeners: &'c mut Listeners<dyn JsonListener>,
}

impl<'c, 'a> Parser<'c, 'a> {
    pub(crate) fn new(cursor: &'c mut Cursor<'a>, listeners: &'c mut Listeners<dyn JsonListener>) -> Self {
        Parser { cursor, listeners }
    }

    /// Reads one value from the start of the stream. Trailing content is left unread.
    pub(crate) fn parse(&mut self) -> Result<Value> {
        if self.cursor.advance()? == Some(BYTE_ORDER_MARK) {
            self.cursor.advance()?;
        }
        self.read_value()
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.cursor.current()
    }

    #[inline]
    fn advance(&mut self) -> Result<Option<char>> {
        self.cursor.advance()
    }

    fn unexpected(&self) -> Error {
        match self.current() {
            Some(ch) => self
                .cursor
                .error(&format!("Unexpected character in input stream: '{}'", ch.escape_default())),
            None => self.cursor.error("Unexpected end of input stream."),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        loop {
            match self.current() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance()?;
                }
                Some('/') => {
                    match self.advance()? {
                        Some('/') => {
                            while !matches!(self.advance()?, None | Some('\n') | Some('\r')) {}
                        }
                        Some('*') => {
                            let mut star = false;
                            loop {
                                match self.advance()? {
                                    None => return Err(self.cursor.error("Unterminated comment in input stream.")),
                                    Some('/') if star => break,
                                    Some(ch) => star = ch == '*',
                                }
                            }
                            self.advance()?;
                        }
                        _ => return Err(self.unexpected()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_value(&mut self) -> Result<Value> {
        self.skip_whitespace_and_comments()?;
        match self.current() {
            None => Err(self.cursor.error("Unexpected end of input stream.")),
            Some('n') => self.read_null(),
            Some('"') | Some('\'') => {
                let string = self.read_string()?;
                self.listeners.each(|l| l.read_string(&string));
                Ok(Value::String(string))
            }
            Some('+') | Some('-') => self.read_number(),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some('t') | Some('f') => self.read_boolean(),
            Some('[') => self.read_list(),
            Some('{') => self.read_map(),
            Some(_) => Err(self.unexpected()),
        }
    }

    /// Matches `text` against the input one character at a time.
    fn read_literal(&mut self, text: &str, kind: &str) -> Result<()> {
        for expected in text.chars() {
            match self.current() {
                Some(ch) if ch == expected => {
                    self.advance()?;
                }
                Some(_) => return Err(self.unexpected()),
                None => {
                    return Err(self
                        .cursor
                        .error(&format!("Incomplete {} value in input stream.", kind)))
                }
            }
        }
        Ok(())
    }

    fn read_null(&mut self) -> Result<Value> {
        self.read_literal("null", "null")?;
        self.listeners.each(|l| l.read_null());
        Ok(Value::Null)
    }

    fn read_boolean(&mut self) -> Result<Value> {
        let value = self.current() == Some('t');
        self.read_literal(if value { "true" } else { "false" }, "boolean")?;
        self.listeners.each(|l| l.read_boolean(value));
        Ok(Value::Bool(value))
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = match self.advance()? {
                Some(ch) => ch.to_digit(16),
                None => return Err(self.cursor.error("Unterminated string in input stream.")),
            };
            match digit {
                Some(d) => code = code * 16 + d,
                None => return Err(self.cursor.error("Invalid unicode escape sequence in input stream.")),
            }
        }
        Ok(code)
    }

    /// Reads the four hex digits after `\u`, combining a following low surrogate escape.
    fn read_unicode_escape(&mut self) -> Result<char> {
        let high = self.read_hex4()?;
        if (0xDC00..0xE000).contains(&high) {
            return Err(self.cursor.error("Unpaired surrogate in unicode escape sequence."));
        }
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high)
                .ok_or_else(|| self.cursor.error("Invalid unicode escape sequence in input stream."));
        }

        if self.advance()? != Some('\\') || self.advance()? != Some('u') {
            return Err(self.cursor.error("Unpaired surrogate in unicode escape sequence."));
        }
        let low = self.read_hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.cursor.error("Unpaired surrogate in unicode escape sequence."));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| self.cursor.error("Invalid unicode escape sequence in input stream."))
    }

    /// Reads a string delimited by the current quote character. Raw control
    /// characters inside the string are dropped.
    fn read_string(&mut self) -> Result<String> {
        let quote = match self.current() {
            Some(q) => q,
            None => return Err(self.cursor.error("Unexpected end of input stream.")),
        };

        let mut text = String::new();
        let mut ch = self.advance()?;
        while let Some(c) = ch {
            if c == quote {
                break;
            }
            if !c.is_control() {
                if c == '\\' {
                    let escaped = match self.advance()? {
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => self.read_unicode_escape()?,
                        Some(e) if e == '\\' || e == '/' || e == '"' || e == '\'' || e == quote => e,
                        Some(_) => {
                            return Err(self.cursor.error("Unsupported escape sequence in input stream."))
                        }
                        None => break,
                    };
                    text.push(escaped);
                } else {
                    text.push(c);
                }
            }
            ch = self.advance()?;
        }

        if self.current() != Some(quote) {
            return Err(self.cursor.error("Unterminated string in input stream."));
        }
        self.advance()?;
        Ok(text)
    }

    fn read_number(&mut self) -> Result<Value> {
        let mut negative = false;
        if let Some(sign @ ('+' | '-')) = self.current() {
            negative = sign == '-';
            self.advance()?;
        }

        let mut text = String::new();
        if negative {
            text.push('-');
        }
        let mut integer = true;
        while let Some(ch) = self.current() {
            if !(ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '+' | '-')) {
                break;
            }
            if matches!(ch, '.' | 'e' | 'E') {
                integer = false;
            }
            text.push(ch);
            self.advance()?;
        }

        let number = if integer {
            match text.parse::<i64>() {
                Ok(l) => Number::from_i64(l),
                Err(_) => {
                    return Err(self
                        .cursor
                        .error(&format!("Invalid integer value in input stream: {}", text)))
                }
            }
        } else {
            match text.parse::<f64>() {
                Ok(d) => Number::Double(d),
                Err(_) => {
                    return Err(self
                        .cursor
                        .error(&format!("Invalid numeric value in input stream: {}", text)))
                }
            }
        };

        self.listeners.each(|l| l.read_number(number));
        Ok(Value::Number(number))
    }

    fn read_list(&mut self) -> Result<Value> {
        let mut list = List::new();
        self.listeners.each(|l| l.begin_list());

        self.advance()?;
        self.skip_whitespace_and_comments()?;

        while let Some(ch) = self.current() {
            if ch == ']' {
                break;
            }
            list.push(self.read_value()?)?;
            self.skip_whitespace_and_comments()?;

            match self.current() {
                Some(',') => {
                    self.advance()?;
                    self.skip_whitespace_and_comments()?;
                    if self.current() == Some(']') {
                        return Err(self.cursor.error("Dangling comma in list."));
                    }
                }
                Some(']') => {}
                _ => return Err(self.unexpected()),
            }
        }

        if self.current().is_none() {
            return Err(self.cursor.error("Unexpected end of input stream."));
        }
        self.advance()?;

        self.listeners.each(|l| l.end_list());
        Ok(Value::List(list))
    }

    fn read_key(&mut self) -> Result<String> {
        let key = match self.current() {
            Some('"') | Some('\'') => self.read_string()?,
            Some(ch) => {
                if !is_identifier_start(ch) {
                    return Err(self.cursor.error("Illegal identifier start character."));
                }
                let mut key = String::new();
                while let Some(c) = self.current() {
                    if c == ':' || c.is_whitespace() {
                        break;
                    }
                    if !is_identifier_part(c) {
                        return Err(self.cursor.error("Illegal identifier character."));
                    }
                    key.push(c);
                    self.advance()?;
                }
                if self.current().is_none() {
                    return Err(self.cursor.error("Unexpected end of input stream."));
                }
                key
            }
            None => return Err(self.cursor.error("Unexpected end of input stream.")),
        };

        if key.is_empty() {
            return Err(self.cursor.error("\"\" is not a valid key."));
        }
        Ok(key)
    }

    fn read_map(&mut self) -> Result<Value> {
        let mut map = Map::new();
        self.listeners.each(|l| l.begin_map());

        self.advance()?;
        self.skip_whitespace_and_comments()?;

        while let Some(ch) = self.current() {
            if ch == '}' {
                break;
            }

            let key = self.read_key()?;
            self.listeners.each(|l| l.read_key(&key));

            self.skip_whitespace_and_comments()?;
            if self.current() != Some(':') {
                return Err(self.unexpected());
            }
            self.advance()?;

            let value = self.read_value()?;
            map.insert(key, value)?;
            self.skip_whitespace_and_comments()?;

            match self.current() {
                Some(',') => {
                    self.advance()?;
                    self.skip_whitespace_and_comments()?;
                    if self.current() == Some('}') {
                        return Err(self.cursor.error("Dangling comma in map."));
                    }
                }
                Some('}') => {}
                _ => return Err(self.unexpected()),
            }
        }

        if self.current().is_none() {
            return Err(self.cursor.error("Unexpected end of input stream."));
        }
        self.advance()?;

        self.listeners.each(|l| l.end_map());
        Ok(Value::Map(map))
    }
}

#[inline]
pub(crate) fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

#[inline]
pub(crate) fn is_identifier_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Returns `true` if `key` can be written without delimiters.
pub(crate) fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => is_identifier_start(first) && chars.all(is_identifier_part),
        None => false,
    }
}

/// The JSON deserializer.
///
/// Reads one complete value from its input and hands it to serde through the same
/// coercing rules as [`from_value`].
pub struct Deserializer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Deserializer<'a> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Deserializer {
            cursor: Cursor::for_str(input, false),
        }
    }

    /// Reads UTF-8 JSON from a byte stream.
    pub fn from_reader<R: Read + 'a>(reader: R) -> Self {
        Deserializer {
            cursor: Cursor::for_reader(reader, crate::Charset::Utf8, false),
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        let mut listeners = Listeners::default();
        Parser::new(&mut self.cursor, &mut listeners).parse()
    }
}

macro_rules! forward_parsed {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let value = self.parse_value()?;
                de::Deserializer::$method(ValueDeserializer::new(value), visitor)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'_> {
    type Error = Error;

    forward_parsed! {
        deserialize_any deserialize_bool deserialize_i8 deserialize_i16 deserialize_i32
        deserialize_i64 deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64
        deserialize_f32 deserialize_f64 deserialize_char deserialize_str deserialize_string
        deserialize_bytes deserialize_byte_buf deserialize_option deserialize_unit
        deserialize_seq deserialize_map deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_unit_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_value()?;
        de::Deserializer::deserialize_unit_struct(ValueDeserializer::new(value), name, visitor)
    }

    fn deserialize_newtype_struct<V>(self, name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_value()?;
        de::Deserializer::deserialize_newtype_struct(ValueDeserializer::new(value), name, visitor)
    }

    fn deserialize_tuple<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_value()?;
        de::Deserializer::deserialize_tuple(ValueDeserializer::new(value), len, visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_value()?;
        de::Deserializer::deserialize_tuple_struct(ValueDeserializer::new(value), name, len, visitor)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_value()?;
        de::Deserializer::deserialize_struct(ValueDeserializer::new(value), name, fields, visitor)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = self.parse_value()?;
        de::Deserializer::deserialize_enum(ValueDeserializer::new(value), name, variants, visitor)
    }
}

/// Converts a [`Value`] into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_pivot::{from_value, json};
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Row { id: u32, price: f64, active: bool }
///
/// let value = json::parse("{id: '7', price: '2.5', active: 'true'}").unwrap();
/// let row: Row = from_value(value).unwrap();
/// assert_eq!(row, Row { id: 7, price: 2.5, active: true });
/// ```
///
/// # Errors
///
/// Fails when the value's shape does not match `T`, or a string cannot be
/// coerced to the scalar type `T` asks for.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: de::DeserializeOwned,
{
    T::deserialize(ValueDeserializer::new(value))
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(list: List) -> Self {
        SeqDeserializer {
            iter: list.into_vec().into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: Map) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(IntoDeserializer::<'de, Error>::into_deserializer(self.variant))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::Null) | None => Ok(()),
            Some(other) => Err(Error::type_mismatch("unit variant", other.type_name())),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::List(list)) => visitor.visit_seq(SeqDeserializer::new(list)),
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Map(map)) => visitor.visit_map(MapDeserializer::new(map)),
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}

/// Deserializes from an owned [`Value`], coercing strings to scalars on demand.
pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

macro_rules! deserialize_integer {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self.value {
                Value::Number(n) => {
                    let whole = n
                        .as_i64()
                        .ok_or_else(|| Error::type_mismatch(stringify!($ty), "fractional number"))?;
                    let narrowed = <$ty>::try_from(whole).map_err(|_| {
                        Error::custom(format!("{} is out of range for {}", whole, stringify!($ty)))
                    })?;
                    visitor.$visit(narrowed)
                }
                Value::String(s) => {
                    let parsed = s
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| Error::type_mismatch(stringify!($ty), &format!("string {:?}", s)))?;
                    visitor.$visit(parsed)
                }
                other => ValueDeserializer::new(other).deserialize_any(visitor),
            }
        }
    };
}

macro_rules! deserialize_float {
    ($method:ident, $visit:ident, $ty:ty) => {
        fn $method<V>(self, visitor: V) -> Result<V::Value>
        where
            V: de::Visitor<'de>,
        {
            match self.value {
                Value::Number(n) => visitor.$visit(n.as_f64() as $ty),
                Value::String(s) => {
                    let parsed = s
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| Error::type_mismatch(stringify!($ty), &format!("string {:?}", s)))?;
                    visitor.$visit(parsed)
                }
                other => ValueDeserializer::new(other).deserialize_any(visitor),
            }
        }
    };
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(Number::Int(i)) => visitor.visit_i32(i),
            Value::Number(Number::Long(l)) => visitor.visit_i64(l),
            Value::Number(Number::Double(d)) => visitor.visit_f64(d),
            Value::String(s) => visitor.visit_string(s),
            Value::List(list) => visitor.visit_seq(SeqDeserializer::new(list)),
            Value::Map(map) => visitor.visit_map(MapDeserializer::new(map)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => visitor.visit_bool(true),
                "false" => visitor.visit_bool(false),
                _ => Err(Error::type_mismatch("boolean", &format!("string {:?}", s))),
            },
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    deserialize_integer!(deserialize_i8, visit_i8, i8);
    deserialize_integer!(deserialize_i16, visit_i16, i16);
    deserialize_integer!(deserialize_i32, visit_i32, i32);
    deserialize_integer!(deserialize_i64, visit_i64, i64);
    deserialize_integer!(deserialize_u8, visit_u8, u8);
    deserialize_integer!(deserialize_u16, visit_u16, u16);
    deserialize_integer!(deserialize_u32, visit_u32, u32);
    deserialize_integer!(deserialize_u64, visit_u64, u64);
    deserialize_float!(deserialize_f32, visit_f32, f32);
    deserialize_float!(deserialize_f64, visit_f64, f64);

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => visitor.visit_char(ch),
                    _ => Err(Error::type_mismatch("single character", &format!("string {:?}", s))),
                }
            }
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Number(n) => visitor.visit_string(n.to_string()),
            Value::Bool(b) => visitor.visit_string(b.to_string()),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            other => visitor.visit_some(ValueDeserializer::new(other)),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Map(map) if map.len() == 1 => {
                let (variant, value) = map
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::custom("Expected enum variant"))?;
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                })
            }
            other => Err(Error::type_mismatch("enum", other.type_name())),
        }
    }

    forward_to_deserialize_any! {
        i128 u128 bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}
