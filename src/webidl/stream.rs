//! Source Stream
//!
//!     An incremental, cursor-based scanner over interface-description text. Input arrives in
//!     chunks through [SourceStream::push_str] and is sealed with [SourceStream::close]. The
//!     grammar engine only ever looks at the text after the cursor.
//!
//! Probes and readiness
//!
//!     Every lookahead answers with a [Read]: `Ready(value)` when the answer is final, or
//!     `NeedMore` when it depends on bytes that have not arrived yet. Once the stream is closed
//!     every probe is `Ready`. This is the suspension point of the parser: a caller that gets
//!     `NeedMore` stops, waits for the next chunk and retries the same step.
//!
//!     Probing methods (`starts_with`, `poll_until_pattern`, ...) never move the cursor, so the
//!     classifier can try one candidate construct after another. Consuming methods advance past
//!     the matched delimiter.
//!
//! Bounded lookahead
//!
//!     `poll_until_pattern(open, stop)` returns the text before the first match of `open`,
//!     unless `stop` matches earlier. A `}` closing the enclosing scope therefore aborts a probe
//!     instead of letting it scan through the rest of the file.
//!
//!     Delimiters inside string literals or comments are not special-cased.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A string literal, or a run of whitespace and comments.
static SQUASH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"[^"]*"|(?:\s|/\*.*?\*/|//[^\n]*)+"#).expect("valid squash regex")
});

/// Answer of a stream probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read<T> {
    /// The answer is final.
    Ready(T),
    /// The answer depends on input that has not been pushed yet.
    NeedMore,
}

impl<T> Read<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Read::Ready(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Read<U> {
        match self {
            Read::Ready(value) => Read::Ready(f(value)),
            Read::NeedMore => Read::NeedMore,
        }
    }
}

/// Unwraps a `Read::Ready`, or returns `Ok(Read::NeedMore)` from the enclosing function.
macro_rules! ready {
    ($e:expr) => {
        match $e {
            $crate::webidl::stream::Read::Ready(value) => value,
            $crate::webidl::stream::Read::NeedMore => {
                return Ok($crate::webidl::stream::Read::NeedMore)
            }
        }
    };
}
pub(crate) use ready;

/// Text found by a lookahead scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polled {
    /// Text between the cursor and the delimiter.
    pub text: String,
    /// The delimiter that ended the scan.
    pub delimiter: String,
    /// Absolute offset of the first byte of `text`.
    pub start: usize,
    /// Absolute offset just past the delimiter.
    pub end: usize,
}

/// Saved cursor position, see [SourceStream::mark].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

#[derive(Debug, Default)]
pub struct SourceStream {
    buffer: String,
    /// Cursor, as an index into `buffer`.
    pos: usize,
    /// Absolute offset of `buffer[0]`.
    base: usize,
    closed: bool,
}

impl SourceStream {
    /// An open stream with no input yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A closed stream over complete input.
    pub fn from_complete(source: &str) -> Self {
        Self {
            buffer: source.to_string(),
            pos: 0,
            base: 0,
            closed: true,
        }
    }

    pub fn push_str(&mut self, chunk: &str) {
        debug_assert!(!self.closed, "push into a closed stream");
        self.buffer.push_str(chunk);
    }

    /// Seal the input. No more chunks will follow.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Absolute byte offset of the cursor.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Unconsumed text currently buffered.
    pub fn rest(&self) -> &str {
        &self.buffer[self.pos..]
    }

    pub fn mark(&self) -> Mark {
        Mark(self.offset())
    }

    /// Move the cursor back to a mark taken after the last [compact](Self::compact).
    pub fn reset(&mut self, mark: Mark) {
        debug_assert!(mark.0 >= self.base, "mark predates compaction");
        self.pos = mark.0 - self.base;
    }

    /// Drop consumed text. Offsets stay absolute.
    pub fn compact(&mut self) {
        if self.pos > 0 {
            self.buffer.drain(..self.pos);
            self.base += self.pos;
            self.pos = 0;
        }
    }

    pub fn advance(&mut self, bytes: usize) {
        self.pos = (self.pos + bytes).min(self.buffer.len());
    }

    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let skipped = rest.len() - rest.trim_start().len();
        self.pos += skipped;
    }

    /// Whether the cursor sits at the end of the whole input.
    pub fn at_end(&self) -> Read<bool> {
        if !self.rest().is_empty() {
            Read::Ready(false)
        } else if self.closed {
            Read::Ready(true)
        } else {
            Read::NeedMore
        }
    }

    pub fn starts_with(&self, literal: &str) -> Read<bool> {
        let rest = self.rest();
        if rest.starts_with(literal) {
            Read::Ready(true)
        } else if !self.closed && rest.len() < literal.len() && literal.starts_with(rest) {
            Read::NeedMore
        } else {
            Read::Ready(false)
        }
    }

    /// Like [starts_with](Self::starts_with), but `word` must not continue as an identifier:
    /// `enum` matches `enum Foo` but not `enumeration`.
    pub fn starts_with_word(&self, word: &str) -> Read<bool> {
        match self.starts_with(word) {
            Read::Ready(true) => match self.rest()[word.len()..].chars().next() {
                Some(c) => Read::Ready(!is_identifier_char(c)),
                None if self.closed => Read::Ready(true),
                None => Read::NeedMore,
            },
            other => other,
        }
    }

    /// Advance past `literal` if the cursor is on it.
    pub fn consume(&mut self, literal: &str) -> Read<bool> {
        let found = self.starts_with(literal);
        if found == Read::Ready(true) {
            self.advance(literal.len());
        }
        found
    }

    /// Text up to, not including, the first match of `open`. `None` if `stop` matches first
    /// or the input ends without a match.
    pub fn poll_until_pattern(&self, open: &Regex, stop: Option<&Regex>) -> Read<Option<Polled>> {
        let rest = self.rest();
        let open_match = open.find(rest);
        let stop_start = stop.and_then(|stop| stop.find(rest)).map(|m| m.start());

        match (open_match, stop_start) {
            (Some(open), Some(stop)) if stop < open.start() => Read::Ready(None),
            (Some(open), _) => Read::Ready(Some(Polled {
                text: rest[..open.start()].to_string(),
                delimiter: open.as_str().to_string(),
                start: self.offset(),
                end: self.offset() + open.end(),
            })),
            (None, Some(_)) => Read::Ready(None),
            (None, None) if self.closed => Read::Ready(None),
            (None, None) => Read::NeedMore,
        }
    }

    /// [poll_until_pattern](Self::poll_until_pattern), then move the cursor past the delimiter.
    pub fn consume_until_pattern(
        &mut self,
        open: &Regex,
        stop: Option<&Regex>,
    ) -> Read<Option<Polled>> {
        let polled = self.poll_until_pattern(open, stop);
        if let Read::Ready(Some(found)) = &polled {
            self.pos = found.end - self.base;
        }
        polled
    }

    /// Scan for the first of `delimiters` outside nested parentheses. Any of `stops` aborts
    /// the scan, at any depth.
    pub fn poll_until_unnested(&self, delimiters: &[char], stops: &[char]) -> Read<Option<Polled>> {
        let rest = self.rest();
        let mut depth = 0usize;
        for (idx, c) in rest.char_indices() {
            if stops.contains(&c) {
                return Read::Ready(None);
            }
            if depth == 0 && delimiters.contains(&c) {
                return Read::Ready(Some(Polled {
                    text: rest[..idx].to_string(),
                    delimiter: c.to_string(),
                    start: self.offset(),
                    end: self.offset() + idx + c.len_utf8(),
                }));
            }
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        if self.closed {
            Read::Ready(None)
        } else {
            Read::NeedMore
        }
    }

    /// Consume everything that is left. Only meaningful on a closed stream.
    pub fn take_rest(&mut self) -> String {
        let rest = self.rest().to_string();
        self.pos = self.buffer.len();
        rest
    }
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Strip comments and collapse whitespace runs to one space. String literals are kept as
/// written.
///
/// Construct parsers see the raw text of their header or statement. Comments and line breaks
/// inside it carry no meaning, so they are removed before the text is matched.
pub fn squash(text: &str) -> String {
    let squashed = SQUASH_REGEX.replace_all(text, |caps: &Captures| {
        let run = &caps[0];
        if run.starts_with('"') {
            run.to_string()
        } else {
            " ".to_string()
        }
    });
    squashed.trim().to_string()
}

/// Split on `separator` where it is not inside a double-quoted literal.
pub fn split_unquoted(text: &str, separator: char) -> Vec<&str> {
    let mut items = Vec::new();
    let mut in_quotes = false;
    let mut item_start = 0;
    for (idx, c) in text.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            items.push(&text[item_start..idx]);
            item_start = idx + c.len_utf8();
        }
    }
    items.push(&text[item_start..]);
    items
}
