//! Decorator lists
//!
//!     `[Key, Key="value", Key=Ident]`. The list is scanned up to its closing bracket with
//!     quoted values taken verbatim, so `]` or `,` inside quotes do not end an item. Nested
//!     brackets, a statement delimiter before the closing bracket, empty items and a missing
//!     value after `=` are all malformed.

use super::{Completed, ElementParser};
use crate::webidl::error::ParseError;
use crate::webidl::model::Decorator;
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{ready, split_unquoted, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<key>[A-Za-z_]\w*)(?:\s*=\s*(?P<value>.*))?$").expect("valid regex")
});
static BARE_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w.:\-]+$").expect("valid regex"));

#[derive(Debug)]
pub struct DecoratorParser {
    start: usize,
    decorators: Vec<Decorator>,
}

impl DecoratorParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            decorators: Vec::new(),
        }
    }
}

impl ElementParser for DecoratorParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Decorators
    }

    fn describe(&self) -> String {
        "decorators".to_string()
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let length = ready!(scan_list(stream)?);
        let inner = stream.rest()[1..length - 1].to_string();
        self.decorators = parse_items(&inner, self.start)?;
        stream.advance(length);
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Decorators(self.decorators))
    }
}

/// Byte length of the bracketed list at the cursor, closing bracket included.
fn scan_list(stream: &SourceStream) -> Result<Read<usize>, ParseError> {
    let start = stream.offset();
    let rest = stream.rest();
    let mut in_quotes = false;
    for (idx, c) in rest.char_indices().skip(1) {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => {}
            ']' => return Ok(Read::Ready(idx + 1)),
            '[' => {
                return Err(ParseError::malformed_decorator(
                    start + idx,
                    "nested `[` in decorator list",
                ))
            }
            ';' | '{' | '}' => {
                return Err(ParseError::malformed_decorator(
                    start,
                    "decorator list is not closed before the end of the statement",
                ))
            }
            _ => {}
        }
    }
    if stream.is_closed() {
        Err(ParseError::malformed_decorator(
            start,
            "decorator list is not closed before the end of input",
        ))
    } else {
        Ok(Read::NeedMore)
    }
}

/// Parse the comma-separated items between the brackets.
pub(crate) fn parse_items(inner: &str, offset: usize) -> Result<Vec<Decorator>, ParseError> {
    split_unquoted(inner, ',')
        .into_iter()
        .map(|item| parse_item(item.trim(), offset))
        .collect()
}

fn parse_item(item: &str, offset: usize) -> Result<Decorator, ParseError> {
    if item.is_empty() {
        return Err(ParseError::malformed_decorator(
            offset,
            "empty item in decorator list",
        ));
    }
    let caps = ITEM.captures(item).ok_or_else(|| {
        ParseError::malformed_decorator(offset, format!("invalid decorator `{}`", item))
    })?;
    let key = &caps["key"];
    let Some(value) = caps.name("value").map(|v| v.as_str().trim()) else {
        return Ok(Decorator::new(key));
    };
    if let Some(quoted) = value.strip_prefix('"') {
        return match quoted.strip_suffix('"') {
            Some(inner) if !inner.contains('"') => Ok(Decorator::with_value(key, inner)),
            _ => Err(ParseError::malformed_decorator(
                offset,
                format!("unterminated quoted value for `{}`", key),
            )),
        };
    }
    if value.is_empty() {
        return Err(ParseError::malformed_decorator(
            offset,
            format!("missing value after `{}=`", key),
        ));
    }
    if !BARE_VALUE.is_match(value) {
        return Err(ParseError::malformed_decorator(
            offset,
            format!("invalid value `{}` for `{}`", value, key),
        ));
    }
    Ok(Decorator::with_value(key, value))
}
