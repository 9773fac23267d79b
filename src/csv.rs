//! Comma-separated values.
//!
//! Every record shares one list of keys. When no keys are configured the reader takes
//! them from the first line of input. Fields are plain text unless they start with a
//! double quote; inside quotes, commas and line breaks are literal and `""` stands for a
//! single `"`. Values are trimmed after the quotes are removed.
//!
//! Records are read as string-keyed [`Map`]s and then bound to the requested item type
//! through serde, so struct fields receive their string values coerced to the field type.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_pivot::CsvSerializer;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let mut serializer = CsvSerializer::new();
//! let points: Vec<Point> = serializer.read_str("x,y\n1,2\n3,4\n").unwrap();
//!
//! assert_eq!(points, vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
//! assert_eq!(serializer.keys(), ["x", "y"]);
//! ```

use crate::listener::{CsvListener, Listeners};
use crate::options::CsvOptions;
use crate::reader::Cursor;
use crate::{from_value, to_value, Error, Map, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use std::marker::PhantomData;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Reads and writes records in comma-separated form.
#[derive(Debug, Default)]
pub struct CsvSerializer {
    options: CsvOptions,
    listeners: Listeners<dyn CsvListener>,
}

impl CsvSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: CsvOptions) -> Self {
        CsvSerializer {
            options,
            listeners: Listeners::default(),
        }
    }

    pub fn options(&self) -> &CsvOptions {
        &self.options
    }

    /// The keys shared by every record; filled from the header after a read.
    pub fn keys(&self) -> &[String] {
        &self.options.keys
    }

    pub fn set_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.keys = keys.into_iter().map(Into::into).collect();
    }

    pub fn add_listener<L: CsvListener + 'static>(&mut self, listener: L) {
        self.listeners.add(Box::new(listener));
    }

    #[must_use]
    pub fn mime_type(&self) -> String {
        format!("text/csv; charset={}", self.options.charset.name())
    }

    /// Reads every record from `reader`.
    ///
    /// # Errors
    ///
    /// [`Error::Syntax`] for malformed input or a record that does not bind to `T`,
    /// [`Error::Io`] if the stream fails.
    pub fn read<T, R>(&mut self, reader: R) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        R: Read,
    {
        self.stream(reader)?.collect()
    }

    /// Reads every record from a string.
    pub fn read_str<T: DeserializeOwned>(&mut self, text: &str) -> Result<Vec<T>> {
        let cursor = Cursor::for_str(text, false).with_echo(self.options.verbose);
        self.open(cursor)?.collect()
    }

    /// Opens a streaming read over `reader`.
    ///
    /// The header, if any, is read immediately; records are read one per call to
    /// [`Iterator::next`]. The stream is released when the returned iterator is
    /// dropped or closed.
    ///
    /// ```rust
    /// use serde_pivot::{CsvSerializer, Map};
    ///
    /// let mut serializer = CsvSerializer::new();
    /// let mut records = serializer.stream::<Map, _>(&b"a,b\n1,2\n3,4"[..]).unwrap();
    ///
    /// assert!(records.has_next());
    /// let first = records.next().unwrap().unwrap();
    /// assert_eq!(first.get("b").and_then(|v| v.as_str()), Some("2"));
    /// records.close();
    /// assert!(!records.has_next());
    /// ```
    pub fn stream<'s, T, R>(&'s mut self, reader: R) -> Result<CsvRecords<'s, T>>
    where
        T: DeserializeOwned,
        R: Read + 's,
    {
        let cursor = Cursor::for_reader(reader, self.options.charset, false).with_echo(self.options.verbose);
        self.open(cursor)
    }

    fn open<'s, T: DeserializeOwned>(&'s mut self, mut cursor: Cursor<'s>) -> Result<CsvRecords<'s, T>> {
        let started = read_header(&mut cursor, &mut self.options.keys);
        if let Err(err) = &started {
            tracing::error!(line = cursor.line(), error = %err, "failed to read CSV keys");
        }
        started?;
        if let Some(echo) = cursor.drain_echo() {
            tracing::debug!(input = %echo, "csv keys");
        }

        self.listeners.each(|l| l.begin_list());
        Ok(CsvRecords {
            serializer: self,
            cursor: Some(cursor),
            finished: false,
            item: PhantomData,
        })
    }

    /// Writes `items` to `writer`, encoded with the configured charset.
    ///
    /// # Errors
    ///
    /// Fails if an item does not serialize to a map, or if the writer fails.
    pub fn write<T, W>(&self, items: &[T], mut writer: W) -> Result<()>
    where
        T: Serialize,
        W: Write,
    {
        let text = self.write_to_string(items)?;
        writer.write_all(&self.options.charset.encode(&text))?;
        writer.flush()?;
        Ok(())
    }

    /// Renders `items` as CSV text.
    ///
    /// If no keys are configured, the keys of the first record are used.
    ///
    /// ```rust
    /// use serde_pivot::{CsvOptions, CsvSerializer};
    /// use std::collections::BTreeMap;
    ///
    /// let mut row = BTreeMap::new();
    /// row.insert("name", "a,\"b\"\nc");
    /// row.insert("n", "1");
    ///
    /// let serializer = CsvSerializer::with_options(
    ///     CsvOptions::new().with_keys(["name", "n"]).with_write_keys(true),
    /// );
    /// assert_eq!(
    ///     serializer.write_to_string(&[row]).unwrap(),
    ///     "name,n\r\n\"a,\"\"b\"\"\nc\",1\r\n"
    /// );
    /// ```
    pub fn write_to_string<T: Serialize>(&self, items: &[T]) -> Result<String> {
        let records = items
            .iter()
            .map(|item| match to_value(item)? {
                Value::Map(map) => Ok(map),
                other => Err(Error::type_mismatch("map", other.type_name())),
            })
            .collect::<Result<Vec<Map>>>()?;

        let keys: Vec<String> = if self.options.keys.is_empty() {
            records
                .first()
                .map(|first| first.keys().cloned().collect())
                .unwrap_or_default()
        } else {
            self.options.keys.clone()
        };

        let mut output = String::new();
        if self.options.write_keys {
            let header: Vec<String> = keys.iter().map(|k| quote_field(k)).collect();
            output.push_str(&header.join(","));
            output.push_str("\r\n");
        }

        for record in &records {
            let fields = keys
                .iter()
                .map(|key| field_text(record.get(key)).map(|text| quote_field(&text)))
                .collect::<Result<Vec<_>>>()?;
            // A lone empty field would otherwise be written as a blank line.
            if let [only] = fields.as_slice() {
                if only.is_empty() {
                    output.push_str("\"\"");
                }
            }
            output.push_str(&fields.join(","));
            output.push_str("\r\n");
        }

        if self.options.verbose {
            tracing::debug!(output = %output, "csv write");
        }
        Ok(output)
    }
}

/// Pull iterator over the records of one input stream.
///
/// Yields `Err` at most once; after an error the iterator is exhausted.
pub struct CsvRecords<'s, T = Map> {
    serializer: &'s mut CsvSerializer,
    cursor: Option<Cursor<'s>>,
    finished: bool,
    item: PhantomData<T>,
}

impl<T> CsvRecords<'_, T> {
    /// Returns `true` if another record is available.
    pub fn has_next(&self) -> bool {
        self.cursor.as_ref().map_or(false, |c| c.current().is_some())
    }

    /// Releases the underlying stream. Further calls to `next` return `None`.
    pub fn close(&mut self) {
        self.finish();
        self.cursor = None;
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            if let Some(echo) = self.cursor.as_mut().and_then(Cursor::drain_echo) {
                tracing::debug!(input = %echo, "csv read");
            }
            self.serializer.listeners.each(|l| l.end_list());
        }
    }
}

impl<T: DeserializeOwned> Iterator for CsvRecords<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if !self.has_next() {
            self.finish();
            return None;
        }
        let cursor = self.cursor.as_mut()?;

        let result = read_record(cursor, &self.serializer.options.keys).and_then(|record| {
            let item = Value::Map(record);
            self.serializer.listeners.each(|l| l.read_item(&item));
            from_value::<T>(item).map_err(|err| cursor.error(&err.to_string()))
        });
        if let Some(echo) = cursor.drain_echo() {
            tracing::debug!(input = %echo, "csv read");
        }

        if let Err(err) = &result {
            tracing::error!(line = err.line().unwrap_or_else(|| cursor.line()), error = %err, "failed to read CSV");
            self.cursor = None;
            self.finish();
        }
        Some(result)
    }
}

impl<T> Drop for CsvRecords<'_, T> {
    fn drop(&mut self) {
        self.finish();
    }
}

fn is_line_end(ch: Option<char>) -> bool {
    matches!(ch, Some('\r') | Some('\n'))
}

fn skip_line_ends(cursor: &mut Cursor<'_>) -> Result<()> {
    while is_line_end(cursor.current()) {
        cursor.advance()?;
    }
    Ok(())
}

/// Positions the cursor at the first record, reading the header line into `keys`
/// when none are configured.
fn read_header(cursor: &mut Cursor<'_>, keys: &mut Vec<String>) -> Result<()> {
    if cursor.advance()? == Some(BYTE_ORDER_MARK) {
        cursor.advance()?;
    }

    if keys.is_empty() {
        let mut line = String::new();
        while let Some(ch) = cursor.current() {
            if ch == '\r' || ch == '\n' {
                break;
            }
            line.push(ch);
            cursor.advance()?;
        }
        if line.is_empty() && cursor.current().is_none() {
            return Err(cursor.error("Could not read keys from input."));
        }
        *keys = line.split(',').map(|key| key.trim().to_string()).collect();
    }

    skip_line_ends(cursor)
}

/// Reads one line of fields, one per key.
fn read_record(cursor: &mut Cursor<'_>, keys: &[String]) -> Result<Map> {
    let mut record = Map::with_capacity(keys.len());
    let mut after_comma = false;

    for key in keys {
        let (value, comma) = match read_field(cursor, after_comma)? {
            Some(field) => field,
            None => return Err(cursor.error("Line data is incomplete.")),
        };
        record.insert(key.as_str(), Value::String(value))?;
        after_comma = comma;
    }

    if !(cursor.current().is_none() || is_line_end(cursor.current())) {
        return Err(cursor.error("Line contains more values than keys."));
    }
    skip_line_ends(cursor)?;
    Ok(record)
}

/// Reads one field. Returns `None` at the end of a line, unless the line ended with a
/// comma, in which case the field is empty. The flag reports whether a comma followed.
fn read_field(cursor: &mut Cursor<'_>, after_comma: bool) -> Result<Option<(String, bool)>> {
    if cursor.current().is_none() || is_line_end(cursor.current()) {
        return Ok(after_comma.then(|| (String::new(), false)));
    }

    let mut text = String::new();
    let mut quoted = cursor.current() == Some('"');
    if quoted {
        cursor.advance()?;
    }

    loop {
        match cursor.current() {
            None if quoted => return Err(cursor.error("Unterminated string.")),
            None => break,
            Some('"') => {
                if !quoted {
                    return Err(cursor.error("Dangling quote."));
                }
                match cursor.advance()? {
                    Some('"') => {
                        text.push('"');
                        cursor.advance()?;
                    }
                    None | Some(',') | Some('\r') | Some('\n') => {
                        quoted = false;
                    }
                    Some(_) => return Err(cursor.error("Prematurely terminated quote.")),
                }
            }
            Some(ch) if !quoted && (ch == ',' || ch == '\r' || ch == '\n') => break,
            Some(ch) => {
                text.push(ch);
                cursor.advance()?;
            }
        }
    }

    let comma = cursor.current() == Some(',');
    if comma {
        cursor.advance()?;
    }
    Ok(Some((text.trim().to_string(), comma)))
}

/// Text of one field: nulls and missing values are empty, containers are JSON.
fn field_text(value: Option<&Value>) -> Result<String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => crate::json::to_string(other),
    }
}

fn quote_field(text: &str) -> String {
    if text.contains(|c| matches!(c, ',' | '"' | '\r' | '\n')) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
