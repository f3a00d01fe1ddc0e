//! Enums
//!
//!     `enum Name { "a", "b", };` is read whole by `begin`: it has no child constructs. The value
//!     list may be empty and may end with a comma. Comments between values are ignored; the
//!     values themselves are kept exactly as quoted.

use super::{describe, expect_literal, take_until, Completed, ElementParser};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::EnumBuilder;
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{ready, split_unquoted, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{").expect("valid regex"));
static HEADER_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;}]").expect("valid regex"));
static CLOSE_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\}").expect("valid regex"));
static BODY_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{;]").expect("valid regex"));
static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^enum (?P<name>[A-Za-z_]\w*)$").expect("valid regex"));
static VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"(?P<value>[^"]*)"$"#).expect("valid regex"));

#[derive(Debug)]
pub struct EnumParser {
    builder: EnumBuilder,
}

impl EnumParser {
    pub fn new(start: usize) -> Self {
        Self {
            builder: EnumBuilder::new("", start),
        }
    }

    fn read_values(&mut self, body: &str) -> Result<(), ParseError> {
        let body = squash(body);
        let mut items: Vec<&str> = split_unquoted(&body, ',').into_iter().map(str::trim).collect();
        if items.last().is_some_and(|last| last.is_empty()) {
            items.pop();
        }
        for item in items {
            let caps = VALUE.captures(item).ok_or_else(|| {
                ParseError::unmatched(
                    self.builder.offset,
                    format!("invalid value `{}` in enum `{}`", item, self.builder.name),
                )
            })?;
            self.builder.values.push(caps["value"].to_string());
        }
        Ok(())
    }
}

impl ElementParser for EnumParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Enum
    }

    fn describe(&self) -> String {
        describe(ParserKind::Enum, &self.builder.name)
    }

    fn start_offset(&self) -> usize {
        self.builder.offset
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let header = ready!(take_until(
            stream,
            &OPEN_BRACE,
            Some(&HEADER_STOP),
            "enum header"
        )?);
        let header = squash(&header.text);
        let caps = HEADER.captures(&header).ok_or_else(|| {
            ParseError::unmatched(
                self.builder.offset,
                format!("malformed enum header `{}`", header),
            )
        })?;
        self.builder.name = caps["name"].to_string();

        let body = ready!(take_until(stream, &CLOSE_BRACE, Some(&BODY_STOP), "enum body")?);
        ready!(expect_literal(stream, ";", "enum")?);
        self.builder.values.clear();
        self.read_values(&body.text)?;
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Enum(self.builder))
    }
}
