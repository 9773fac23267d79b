//! Error types for the JSON and CSV codecs, path navigation and the document tree.
//!
//! All fallible operations in this crate return [`Result`], whose error type is the single
//! [`Error`] enum. The variants fall into three groups:
//!
//! - **Malformed input**: [`Error::Syntax`] is raised by both codecs for every structural
//!   violation (unterminated strings, unexpected characters, dangling commas or quotes).
//!   It carries the 1-based line and column at which the reader stopped.
//! - **Precondition violations**: [`Error::InvalidArgument`], [`Error::IndexOutOfBounds`],
//!   [`Error::InvalidPath`] and [`Error::ReadOnly`] signal programmer errors and abort the
//!   calling operation.
//! - **Stream failures**: [`Error::Io`] wraps I/O errors on the same channel as syntax errors,
//!   so a codec caller only ever has one error type to handle.
//!
//! ## Examples
//!
//! ```rust
//! use serde_pivot::{json, Error};
//!
//! let err = json::parse("[1,]").unwrap_err();
//! assert!(err.is_syntax());
//! assert!(matches!(err, Error::Syntax { line: 1, .. }));
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

/// Represents every error that can occur in this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// I/O error while reading or writing a stream
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed input with the position at which it was detected
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// A path expression could not be split or resolved
    #[error("Invalid path \"{path}\": {msg}")]
    InvalidPath { path: String, msg: String },

    /// A precondition on an argument was violated
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An index or range fell outside its bounds
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Attempted to mutate a read-only list or map
    #[error("Cannot modify a read-only {0}")]
    ReadOnly(String),

    /// A value had a different type than the one requested
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A Rust type that has no representation in the value model
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Custom error, usually raised through serde
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a malformed-input error at the given 1-based position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_pivot::Error;
    ///
    /// let err = Error::syntax(3, 7, "Unterminated string in input stream.");
    /// assert!(err.to_string().contains("line 3"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: &str, msg: &str) -> Self {
        Error::InvalidPath {
            path: path.to_string(),
            msg: msg.to_string(),
        }
    }

    /// Creates a precondition violation error.
    pub fn invalid_argument<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidArgument(msg.to_string())
    }

    /// Creates an out-of-bounds error.
    pub fn index_out_of_bounds(index: usize, len: usize) -> Self {
        Error::IndexOutOfBounds { index, len }
    }

    /// Creates an error for a mutation of a read-only container.
    pub fn read_only(what: &str) -> Self {
        Error::ReadOnly(what.to_string())
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_pivot::Error;
    ///
    /// let err = Error::type_mismatch("number", "string");
    /// assert!(err.to_string().contains("expected number"));
    /// ```
    pub fn type_mismatch(expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for malformed-input errors.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    /// Returns `true` for precondition violations.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::IndexOutOfBounds { .. }
                | Error::InvalidPath { .. }
                | Error::ReadOnly(_)
        )
    }

    /// The line at which a syntax error was detected, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
