//! Character streams shared by the JSON and CSV readers.
//!
//! Bytes are decoded into `char`s according to a [`Charset`], optionally run through a
//! [`MacroExpander`], and consumed one character at a time through a [`Cursor`] that
//! tracks the 1-based line and column for error reporting.

use crate::options::Charset;
use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::io::{BufReader, Bytes, Read};
use unicode_reader::CodePoints;

/// A pull source of decoded characters.
pub(crate) trait CharSource {
    fn next_char(&mut self) -> Result<Option<char>>;
}

/// UTF-8 decoding on top of `unicode_reader`.
struct Utf8Source<R: Read> {
    code_points: CodePoints<Bytes<BufReader<R>>>,
}

impl<R: Read> CharSource for Utf8Source<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        match self.code_points.next() {
            None => Ok(None),
            Some(Ok(ch)) => Ok(Some(ch)),
            Some(Err(e)) => Err(Error::from(e)),
        }
    }
}

/// Single-byte charsets map each byte to one character.
struct ByteSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
    charset: Charset,
}

impl<R: Read> CharSource for ByteSource<R> {
    fn next_char(&mut self) -> Result<Option<char>> {
        match self.bytes.next() {
            None => Ok(None),
            Some(Ok(b)) => {
                let ch = char::from(b);
                if ch > self.charset.max_char() {
                    Ok(Some(char::REPLACEMENT_CHARACTER))
                } else {
                    Ok(Some(ch))
                }
            }
            Some(Err(e)) => Err(Error::from(e)),
        }
    }
}

struct StrSource<'a> {
    chars: std::str::Chars<'a>,
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Builds the decoding source for a byte stream.
pub(crate) fn decode<'a, R: Read + 'a>(reader: R, charset: Charset) -> Box<dyn CharSource + 'a> {
    let buffered = BufReader::new(reader);
    match charset {
        Charset::Utf8 => Box::new(Utf8Source {
            code_points: CodePoints::from(buffered),
        }),
        _ => Box::new(ByteSource {
            bytes: buffered.bytes(),
            charset,
        }),
    }
}

pub(crate) fn from_str(text: &str) -> Box<dyn CharSource + '_> {
    Box::new(StrSource { chars: text.chars() })
}

/// Preprocessor that handles `#define NAME value`, `#undef NAME` and `${NAME}`.
///
/// Directives are recognized only at the start of a line. A definition runs to the end of
/// its line; a backslash immediately before the line break continues it on the next line.
/// References to undefined names, and directives other than `define`/`undef`, are passed
/// through unchanged. Expanded text is not scanned again for further references.
pub(crate) struct MacroExpander<'a> {
    source: Box<dyn CharSource + 'a>,
    definitions: HashMap<String, String>,
    /// Characters read ahead that still need macro processing.
    pending: VecDeque<char>,
    /// Replacement text of the last expansion, emitted verbatim.
    expansion: VecDeque<char>,
    last: char,
}

impl<'a> MacroExpander<'a> {
    pub(crate) fn new(source: Box<dyn CharSource + 'a>) -> Self {
        MacroExpander {
            source,
            definitions: HashMap::new(),
            pending: VecDeque::new(),
            expansion: VecDeque::new(),
            last: '\n',
        }
    }

    fn read_raw(&mut self) -> Result<Option<char>> {
        match self.pending.pop_front() {
            Some(ch) => Ok(Some(ch)),
            None => self.source.next_char(),
        }
    }

    fn requeue(&mut self, text: &str) {
        for ch in text.chars().rev() {
            self.pending.push_front(ch);
        }
    }

    fn read_word(&mut self) -> Result<(String, Option<char>)> {
        let mut word = String::new();
        loop {
            match self.read_raw()? {
                Some(ch) if ch.is_alphanumeric() || ch == '_' => word.push(ch),
                other => return Ok((word, other)),
            }
        }
    }

    fn skip_blanks(&mut self, mut ch: Option<char>) -> Result<Option<char>> {
        while matches!(ch, Some(' ') | Some('\t')) {
            ch = self.read_raw()?;
        }
        Ok(ch)
    }

    /// Reads the remainder of a directive line, honoring backslash continuations.
    fn read_line(&mut self, mut ch: Option<char>) -> Result<String> {
        let mut text = String::new();
        loop {
            match ch {
                None | Some('\n') => break,
                Some('\r') => {
                    ch = self.read_raw()?;
                    if ch != Some('\n') {
                        if let Some(next) = ch {
                            self.pending.push_front(next);
                        }
                    }
                    break;
                }
                Some('\\') => {
                    let next = self.read_raw()?;
                    match next {
                        Some('\n') => {}
                        Some('\r') => {
                            let after = self.read_raw()?;
                            if after != Some('\n') {
                                if let Some(after) = after {
                                    self.pending.push_front(after);
                                }
                            }
                        }
                        Some(other) => {
                            text.push('\\');
                            text.push(other);
                        }
                        None => {
                            text.push('\\');
                            break;
                        }
                    }
                }
                Some(other) => text.push(other),
            }
            ch = self.read_raw()?;
        }
        Ok(text)
    }

    /// Handles a `#` at line start. Returns `false` if it was not a known directive, in
    /// which case the consumed text has been requeued.
    fn directive(&mut self) -> Result<bool> {
        let (keyword, after) = self.read_word()?;
        match keyword.as_str() {
            "define" => {
                let ch = self.skip_blanks(after)?;
                let mut name = String::new();
                let mut ch = ch;
                while let Some(c) = ch {
                    if c.is_whitespace() {
                        break;
                    }
                    name.push(c);
                    ch = self.read_raw()?;
                }
                let ch = self.skip_blanks(ch)?;
                let value = self.read_line(ch)?;
                tracing::trace!(name = %name, value = %value, "macro defined");
                self.definitions.insert(name, value);
                Ok(true)
            }
            "undef" => {
                let ch = self.skip_blanks(after)?;
                let mut name = String::new();
                let mut ch = ch;
                while let Some(c) = ch {
                    if c.is_whitespace() {
                        break;
                    }
                    name.push(c);
                    ch = self.read_raw()?;
                }
                self.read_line(ch)?;
                tracing::trace!(name = %name, "macro undefined");
                self.definitions.remove(&name);
                Ok(true)
            }
            _ => {
                if let Some(c) = after {
                    self.pending.push_front(c);
                }
                self.requeue(&keyword);
                Ok(false)
            }
        }
    }

    /// Handles a `$`. Returns the replacement text when a defined reference follows.
    fn reference(&mut self) -> Result<Option<String>> {
        let open = self.read_raw()?;
        if open != Some('{') {
            if let Some(c) = open {
                self.pending.push_front(c);
            }
            return Ok(None);
        }

        let mut name = String::new();
        loop {
            match self.read_raw()? {
                Some('}') => break,
                Some(c) => name.push(c),
                None => {
                    self.requeue(&format!("{{{}", name));
                    return Ok(None);
                }
            }
        }

        match self.definitions.get(&name) {
            Some(value) => Ok(Some(value.clone())),
            None => {
                self.requeue(&format!("{{{}}}", name));
                Ok(None)
            }
        }
    }
}

impl CharSource for MacroExpander<'_> {
    fn next_char(&mut self) -> Result<Option<char>> {
        loop {
            if let Some(ch) = self.expansion.pop_front() {
                self.last = ch;
                return Ok(Some(ch));
            }

            let ch = match self.read_raw()? {
                Some(ch) => ch,
                None => return Ok(None),
            };

            if ch == '#' && self.last == '\n' {
                if self.directive()? {
                    self.last = '\n';
                    continue;
                }
            } else if ch == '$' {
                if let Some(value) = self.reference()? {
                    self.expansion.extend(value.chars());
                    continue;
                }
            }

            self.last = ch;
            return Ok(Some(ch));
        }
    }
}

/// One-character lookahead over a [`CharSource`] with position tracking.
///
/// `current()` is the character most recently read by [`advance`](Cursor::advance), or
/// `None` at end of input. CR, LF and CRLF each count as a single line break.
pub(crate) struct Cursor<'a> {
    source: Box<dyn CharSource + 'a>,
    current: Option<char>,
    previous: Option<char>,
    line: usize,
    column: usize,
    echo: Option<String>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: Box<dyn CharSource + 'a>) -> Self {
        Cursor {
            source,
            current: None,
            previous: None,
            line: 1,
            column: 0,
            echo: None,
        }
    }

    /// Decodes `reader` with `charset`, with or without macro expansion.
    pub(crate) fn for_reader<R: Read + 'a>(reader: R, charset: Charset, macros: bool) -> Self {
        let source = decode(reader, charset);
        if macros {
            Cursor::new(Box::new(MacroExpander::new(source)))
        } else {
            Cursor::new(source)
        }
    }

    pub(crate) fn for_str(text: &'a str, macros: bool) -> Self {
        let source = from_str(text);
        if macros {
            Cursor::new(Box::new(MacroExpander::new(source)))
        } else {
            Cursor::new(source)
        }
    }

    /// Records every consumed character so it can be logged afterwards.
    pub(crate) fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo.then(String::new);
        self
    }

    pub(crate) fn advance(&mut self) -> Result<Option<char>> {
        let next = self.source.next_char()?;
        if let Some(ch) = next {
            let line_break = match self.previous {
                Some('\n') => true,
                Some('\r') => ch != '\n',
                _ => false,
            };
            if line_break {
                self.line += 1;
                self.column = 0;
            }
            self.column += 1;
            self.previous = Some(ch);
            if let Some(echo) = self.echo.as_mut() {
                echo.push(ch);
            }
        }
        self.current = next;
        Ok(next)
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<char> {
        self.current
    }

    #[inline]
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// A syntax error at the current position.
    pub(crate) fn error(&self, msg: &str) -> Error {
        Error::syntax(self.line, self.column, msg)
    }

    pub(crate) fn take_echo(&mut self) -> Option<String> {
        self.echo.take()
    }

    /// Returns the characters consumed since the last drain, keeping the echo on.
    pub(crate) fn drain_echo(&mut self) -> Option<String> {
        self.echo.as_mut().filter(|echo| !echo.is_empty()).map(std::mem::take)
    }
}
