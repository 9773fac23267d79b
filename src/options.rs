//! Configuration options for the JSON and CSV codecs.
//!
//! - [`Charset`]: the character encoding of byte streams
//! - [`JsonOptions`]: JSON reader/writer configuration (default UTF-8)
//! - [`CsvOptions`]: CSV reader/writer configuration (default ISO-8859-1)
//!
//! ## Examples
//!
//! ```rust
//! use serde_pivot::{Charset, CsvOptions, JsonOptions};
//!
//! let json = JsonOptions::new()
//!     .with_charset(Charset::Iso8859_1)
//!     .with_always_delimit_map_keys(true);
//! assert!(json.always_delimit_map_keys);
//!
//! let csv = CsvOptions::new().with_keys(["name", "age"]).with_write_keys(true);
//! assert_eq!(csv.keys, vec!["name", "age"]);
//! ```

/// Character encoding used to decode input bytes and encode output text.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::Charset;
///
/// assert_eq!(Charset::Utf8.name(), "UTF-8");
/// assert!(Charset::Utf8.is_unicode());
/// assert_eq!(Charset::Iso8859_1.max_char(), '\u{ff}');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Iso8859_1,
    UsAscii,
}

impl Charset {
    /// Returns the canonical charset name, as used in MIME types.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
        }
    }

    /// Returns `true` if every Unicode scalar value can be encoded.
    #[must_use]
    pub const fn is_unicode(&self) -> bool {
        matches!(self, Charset::Utf8)
    }

    /// The highest character this charset can encode.
    #[must_use]
    pub const fn max_char(&self) -> char {
        match self {
            Charset::Utf8 => char::MAX,
            Charset::Iso8859_1 => '\u{ff}',
            Charset::UsAscii => '\u{7f}',
        }
    }

    /// Looks up a charset by name, ignoring case and common aliases.
    ///
    /// ```rust
    /// use serde_pivot::Charset;
    ///
    /// assert_eq!(Charset::from_name("latin1"), Some(Charset::Iso8859_1));
    /// assert_eq!(Charset::from_name("utf8"), Some(Charset::Utf8));
    /// assert_eq!(Charset::from_name("EBCDIC"), None);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Charset> {
        match name.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(Charset::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "ISO_8859_1" | "LATIN1" => Some(Charset::Iso8859_1),
            "US-ASCII" | "ASCII" => Some(Charset::UsAscii),
            _ => None,
        }
    }

    /// Encodes `text` into bytes; unencodable characters become `?`.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            _ => {
                let max = self.max_char();
                text.chars()
                    .map(|ch| if ch <= max { ch as u8 } else { b'?' })
                    .collect()
            }
        }
    }
}

/// Configuration for [`JsonSerializer`](crate::JsonSerializer).
///
/// # Examples
///
/// ```rust
/// use serde_pivot::JsonOptions;
///
/// let options = JsonOptions::new().with_macros(true).with_verbose(true);
/// assert!(options.allow_macros);
/// assert!(options.verbose);
/// ```
#[derive(Clone, Debug, Default)]
pub struct JsonOptions {
    pub charset: Charset,
    /// Quote every map key, not only those that are not identifiers.
    pub always_delimit_map_keys: bool,
    /// Echo consumed input and produced output through `tracing` at debug level.
    pub verbose: bool,
    /// Enable `#define` / `#undef` / `${NAME}` preprocessing of the input.
    pub allow_macros: bool,
}

impl JsonOptions {
    /// Creates default options (UTF-8, keys quoted only when needed, no macros).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    #[must_use]
    pub fn with_always_delimit_map_keys(mut self, always: bool) -> Self {
        self.always_delimit_map_keys = always;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_macros(mut self, allow_macros: bool) -> Self {
        self.allow_macros = allow_macros;
        self
    }
}

/// Configuration for [`CsvSerializer`](crate::CsvSerializer).
///
/// When `keys` is empty the reader takes them from the first line of input.
///
/// # Examples
///
/// ```rust
/// use serde_pivot::{Charset, CsvOptions};
///
/// let options = CsvOptions::new();
/// assert_eq!(options.charset, Charset::Iso8859_1);
/// assert!(options.keys.is_empty());
/// assert!(!options.write_keys);
/// ```
#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub charset: Charset,
    pub keys: Vec<String>,
    /// Emit the keys as a header line before the records.
    pub write_keys: bool,
    pub verbose: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            charset: Charset::Iso8859_1,
            keys: Vec::new(),
            write_keys: false,
            verbose: false,
        }
    }
}

impl CsvOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Sets the field keys shared by every record.
    #[must_use]
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_write_keys(mut self, write_keys: bool) -> Self {
        self.write_keys = write_keys;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_latin1_replaces_wide_chars() {
        assert_eq!(Charset::Iso8859_1.encode("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(Charset::Iso8859_1.encode("\u{20ac}"), b"?".to_vec());
        assert_eq!(Charset::UsAscii.encode("\u{e9}a"), b"?a".to_vec());
        assert_eq!(Charset::Utf8.encode("\u{e9}"), "\u{e9}".as_bytes().to_vec());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(JsonOptions::default().charset, Charset::Utf8);
        assert_eq!(CsvOptions::default().charset, Charset::Iso8859_1);
    }
}
