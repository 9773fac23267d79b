//! Path expressions over JSON values.
//!
//! A path is a sequence of segments separated by `.`. A segment is either a bare
//! identifier or a bracketed string, which may be quoted with `'` or `"` (a doubled quote
//! inside a quoted segment is a literal quote):
//!
//! ```rust
//! use serde_pivot::path;
//!
//! assert_eq!(path::split("a.b[0]['c.d']").unwrap(), vec!["a", "b", "0", "c.d"]);
//! assert!(path::split("a.").is_err());
//! ```
//!
//! Navigation interprets each segment against the value it reaches: a list reads it as
//! an index, a map as a key. Scalars have no children.
//!
//! ```rust
//! use serde_pivot::{json, path, Value};
//!
//! let mut root = json::parse(r#"{"a": [{"b": 5}]}"#).unwrap();
//! assert_eq!(path::get(&root, "a[0].b").unwrap(), Some(&Value::from(5)));
//!
//! path::put(&mut root, "a[0].b", Value::from(9)).unwrap();
//! assert_eq!(path::get_i32(&root, "a[0].b").unwrap(), Some(9));
//! assert!(!path::contains_key(&root, "a[1]").unwrap());
//! ```

use crate::{from_value, to_value, Error, List, Map, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Keyed property access, implemented by [`Map`] and by [`BeanAdapter`].
///
/// The `*_in` functions in this module navigate a path whose first segment is resolved
/// through this trait.
pub trait Dictionary {
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, returning the previous value.
    fn put(&mut self, key: &str, value: Value) -> Result<Option<Value>>;

    fn remove(&mut self, key: &str) -> Result<Option<Value>>;

    fn contains_key(&self, key: &str) -> bool;
}

/// Splits a path expression into its segments.
///
/// The empty string splits into zero segments.
///
/// # Errors
///
/// [`Error::InvalidPath`] for a trailing `.`, an empty segment, an unterminated bracket
/// or quote, or a character that cannot appear in a bare identifier.
pub fn split(path: &str) -> Result<Vec<String>> {
    let chars: Vec<char> = path.chars().collect();
    let n = chars.len();
    let invalid = |msg: &str| Error::invalid_path(path, msg);

    let mut segments = Vec::new();
    let mut i = 0;
    while i < n {
        let mut segment = String::new();

        if chars[i] == '[' {
            i += 1;
            let quote = match chars.get(i) {
                Some(&q) if q == '"' || q == '\'' => {
                    i += 1;
                    Some(q)
                }
                _ => None,
            };

            loop {
                let c = match chars.get(i) {
                    Some(&c) => c,
                    None if quote.is_some() => return Err(invalid("Unterminated quoted identifier.")),
                    None => return Err(invalid("Unterminated bracketed identifier.")),
                };
                i += 1;

                match quote {
                    Some(q) if c == q => {
                        if chars.get(i) == Some(&q) {
                            segment.push(q);
                            i += 1;
                        } else {
                            break;
                        }
                    }
                    None if c == ']' => break,
                    _ => {
                        if c.is_control() {
                            return Err(invalid("Illegal identifier character."));
                        }
                        segment.push(c);
                    }
                }
            }

            if quote.is_some() {
                if chars.get(i) != Some(&']') {
                    return Err(invalid("Unterminated bracketed identifier."));
                }
                i += 1;
            }

            match chars.get(i) {
                None | Some('[') => {}
                Some('.') => i += 1,
                Some(_) => return Err(invalid("Expected '.' or '[' after bracketed identifier.")),
            }
        } else {
            while let Some(&c) = chars.get(i) {
                if c == '.' || c == '[' {
                    break;
                }
                if !crate::de::is_identifier_part(c) {
                    return Err(invalid("Illegal identifier character."));
                }
                segment.push(c);
                i += 1;
            }
            if chars.get(i) == Some(&'.') {
                i += 1;
            }
        }

        if segment.is_empty() {
            return Err(invalid("Missing identifier."));
        }
        if i == n && chars[n - 1] == '.' {
            return Err(invalid("Path cannot end in a '.' character."));
        }
        segments.push(segment);
    }

    Ok(segments)
}

fn parse_index(key: &str, path: &str) -> Result<usize> {
    key.parse::<usize>()
        .map_err(|_| Error::invalid_path(path, &format!("\"{}\" is not a valid list index.", key)))
}

fn child<'v>(parent: &'v Value, key: &str, path: &str) -> Result<Option<&'v Value>> {
    match parent {
        Value::List(list) => Ok(list.get(parse_index(key, path)?)),
        Value::Map(map) => Ok(map.get(key)),
        _ => Ok(None),
    }
}

fn child_mut<'v>(parent: &'v mut Value, key: &str, path: &str) -> Result<Option<&'v mut Value>> {
    match parent {
        Value::List(list) => {
            let index = parse_index(key, path)?;
            list.get_mut(index)
        }
        Value::Map(map) => map.get_mut(key),
        _ => Ok(None),
    }
}

fn resolve<'v>(root: &'v Value, segments: &[String], path: &str) -> Result<Option<&'v Value>> {
    let mut current = root;
    for segment in segments {
        current = match child(current, segment, path)? {
            Some(next) => next,
            None => return Ok(None),
        };
    }
    Ok(Some(current))
}

fn resolve_parent_mut<'v>(root: &'v mut Value, segments: &[String], path: &str) -> Result<&'v mut Value> {
    let mut current = root;
    for segment in segments {
        current = match child_mut(current, segment, path)? {
            Some(next) => next,
            None => return Err(Error::invalid_path(path, "Parent does not exist.")),
        };
    }
    Ok(current)
}

fn split_nonempty(path: &str) -> Result<Vec<String>> {
    let segments = split(path)?;
    if segments.is_empty() {
        return Err(Error::invalid_argument("Path must contain at least one segment."));
    }
    Ok(segments)
}

/// Returns the value at `path`, or `None` if any step along it is missing.
///
/// `None` is distinct from `Some(&Value::Null)`, which means the path exists and holds null.
///
/// # Errors
///
/// [`Error::InvalidPath`] if the path cannot be split, or if a non-numeric segment is
/// applied to a list.
pub fn get<'v>(root: &'v Value, path: &str) -> Result<Option<&'v Value>> {
    let segments = split(path)?;
    resolve(root, &segments, path)
}

/// Stores `value` at `path`, returning the value it replaced.
///
/// A map parent gains or replaces the key; a list parent replaces the element at the index.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if the path has no segments
/// - [`Error::InvalidPath`] if the parent does not exist or is a scalar
/// - [`Error::IndexOutOfBounds`] for an index outside a list parent
/// - [`Error::ReadOnly`] if a container on the way is read-only
pub fn put(root: &mut Value, path: &str, value: Value) -> Result<Option<Value>> {
    let segments = split_nonempty(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| Error::invalid_argument("Path must contain at least one segment."))?;

    match resolve_parent_mut(root, parents, path)? {
        Value::List(list) => {
            let index = parse_index(last, path)?;
            list.set(index, value).map(Some)
        }
        Value::Map(map) => map.insert(last.as_str(), value),
        other => Err(Error::invalid_path(
            path,
            &format!("A {} value has no properties.", other.type_name()),
        )),
    }
}

/// Removes the value at `path`, returning it.
///
/// Removing a missing map key returns `Ok(None)`. Errors match [`put`].
pub fn remove(root: &mut Value, path: &str) -> Result<Option<Value>> {
    let segments = split_nonempty(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| Error::invalid_argument("Path must contain at least one segment."))?;

    match resolve_parent_mut(root, parents, path)? {
        Value::List(list) => {
            let index = parse_index(last, path)?;
            list.remove(index).map(Some)
        }
        Value::Map(map) => map.remove(last),
        other => Err(Error::invalid_path(
            path,
            &format!("A {} value has no properties.", other.type_name()),
        )),
    }
}

/// Returns `true` if the parent of `path` exists and has the final segment.
///
/// A missing parent yields `false`, not an error.
pub fn contains_key(root: &Value, path: &str) -> Result<bool> {
    let segments = split_nonempty(path)?;
    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| Error::invalid_argument("Path must contain at least one segment."))?;

    match resolve(root, parents, path)? {
        Some(Value::List(list)) => Ok(parse_index(last, path)? < list.len()),
        Some(Value::Map(map)) => Ok(map.contains_key(last)),
        _ => Ok(false),
    }
}

/// Like [`get`], with the first segment resolved through a [`Dictionary`].
pub fn get_in<D: Dictionary + ?Sized>(root: &D, path: &str) -> Result<Option<Value>> {
    let segments = split(path)?;
    let (first, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Ok(None),
    };
    match root.get(first) {
        Some(value) => Ok(resolve(&value, rest, path)?.cloned()),
        None => Ok(None),
    }
}

/// Like [`put`], with the first segment resolved through a [`Dictionary`].
///
/// Deeper paths modify a copy of the first-level value and store it back.
pub fn put_in<D: Dictionary + ?Sized>(root: &mut D, path: &str, value: Value) -> Result<Option<Value>> {
    let segments = split_nonempty(path)?;
    let first = &segments[0];
    if segments.len() == 1 {
        return root.put(first, value);
    }

    let mut branch = root
        .get(first)
        .ok_or_else(|| Error::invalid_path(path, "Parent does not exist."))?;
    let previous = put(&mut branch, &join(&segments[1..]), value)?;
    root.put(first, branch)?;
    Ok(previous)
}

/// Like [`remove`], with the first segment resolved through a [`Dictionary`].
pub fn remove_in<D: Dictionary + ?Sized>(root: &mut D, path: &str) -> Result<Option<Value>> {
    let segments = split_nonempty(path)?;
    let first = &segments[0];
    if segments.len() == 1 {
        return root.remove(first);
    }

    let mut branch = root
        .get(first)
        .ok_or_else(|| Error::invalid_path(path, "Parent does not exist."))?;
    let removed = remove(&mut branch, &join(&segments[1..]))?;
    root.put(first, branch)?;
    Ok(removed)
}

/// Like [`contains_key`], with the first segment resolved through a [`Dictionary`].
pub fn contains_key_in<D: Dictionary + ?Sized>(root: &D, path: &str) -> Result<bool> {
    let segments = split_nonempty(path)?;
    let first = &segments[0];
    if segments.len() == 1 {
        return Ok(root.contains_key(first));
    }
    match root.get(first) {
        Some(branch) => contains_key(&branch, &join(&segments[1..])),
        None => Ok(false),
    }
}

/// Re-joins segments as bracketed, double-quoted path text.
fn join(segments: &[String]) -> String {
    segments
        .iter()
        .map(|s| format!("[\"{}\"]", s.replace('"', "\"\"")))
        .collect()
}

/// Property access to any serde-compatible struct.
///
/// Reads go through [`to_value`]; writes serialize the bean, update the property and
/// deserialize it back, so field types are enforced on every `put`.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_pivot::path::{self, BeanAdapter, Dictionary};
/// use serde_pivot::Value;
///
/// #[derive(Serialize, Deserialize)]
/// struct Server { host: String, ports: Vec<u16> }
///
/// let mut server = Server { host: "a".into(), ports: vec![80, 443] };
/// let mut adapter = BeanAdapter::new(&mut server);
///
/// assert_eq!(adapter.get("host"), Some(Value::from("a")));
/// path::put_in(&mut adapter, "ports[1]", Value::from(8443)).unwrap();
/// assert!(adapter.put("host", Value::from(1)).is_ok());
/// assert!(adapter.put("ports", Value::from("not a list")).is_err());
///
/// assert_eq!(server.ports, vec![80, 8443]);
/// assert_eq!(server.host, "1");
/// ```
pub struct BeanAdapter<'b, T> {
    bean: &'b mut T,
}

impl<'b, T> BeanAdapter<'b, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(bean: &'b mut T) -> Self {
        BeanAdapter { bean }
    }

    fn properties(&self) -> Result<Map> {
        match to_value(&*self.bean)? {
            Value::Map(map) => Ok(map),
            other => Err(Error::type_mismatch("struct", other.type_name())),
        }
    }
}

impl<T> Dictionary for BeanAdapter<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Option<Value> {
        self.properties().ok()?.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<Option<Value>> {
        let mut properties = self.properties()?;
        if !properties.contains_key(key) {
            return Err(Error::invalid_argument(format!("\"{}\" is not a property.", key)));
        }
        let previous = properties.insert(key, value)?;
        *self.bean = from_value(Value::Map(properties))?;
        Ok(previous)
    }

    fn remove(&mut self, key: &str) -> Result<Option<Value>> {
        Err(Error::invalid_argument(format!(
            "Cannot remove property \"{}\" from a bean.",
            key
        )))
    }

    fn contains_key(&self, key: &str) -> bool {
        self.properties().map(|p| p.contains_key(key)).unwrap_or(false)
    }
}

/// Reads the property at `path` from a serde-compatible struct.
pub fn get_property<T: Serialize>(bean: &T, path: &str) -> Result<Option<Value>> {
    let root = to_value(bean)?;
    Ok(get(&root, path)?.cloned())
}

/// Writes the property at `path` on a serde-compatible struct, returning the previous value.
pub fn put_property<T>(bean: &mut T, path: &str, value: Value) -> Result<Option<Value>>
where
    T: Serialize + DeserializeOwned,
{
    put_in(&mut BeanAdapter::new(bean), path, value)
}

/// Applies `extract` to the value at `path`. Missing paths and nulls yield `None`;
/// a present value of another type is a type mismatch.
fn get_typed<'v, T>(
    root: &'v Value,
    path: &str,
    expected: &str,
    extract: impl FnOnce(&'v Value) -> Option<T>,
) -> Result<Option<T>> {
    match get(root, path)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => extract(value)
            .map(Some)
            .ok_or_else(|| Error::type_mismatch(expected, value.type_name())),
    }
}

pub fn get_str<'v>(root: &'v Value, path: &str) -> Result<Option<&'v str>> {
    get_typed(root, path, "string", Value::as_str)
}

/// Reads an integer that fits in `i32`.
pub fn get_i32(root: &Value, path: &str) -> Result<Option<i32>> {
    get_typed(root, path, "i32", |v| v.as_number().and_then(|n| n.as_i32()))
}

pub fn get_i64(root: &Value, path: &str) -> Result<Option<i64>> {
    get_typed(root, path, "i64", Value::as_i64)
}

pub fn get_f64(root: &Value, path: &str) -> Result<Option<f64>> {
    get_typed(root, path, "number", Value::as_f64)
}

pub fn get_bool(root: &Value, path: &str) -> Result<Option<bool>> {
    get_typed(root, path, "boolean", Value::as_bool)
}

pub fn get_list<'v>(root: &'v Value, path: &str) -> Result<Option<&'v List>> {
    get_typed(root, path, "list", Value::as_list)
}

pub fn get_map<'v>(root: &'v Value, path: &str) -> Result<Option<&'v Map>> {
    get_typed(root, path, "map", Value::as_map)
}
