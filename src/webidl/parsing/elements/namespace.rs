//! Namespaces holding constants: `namespace Name { const Type k = v; };`

use super::members::typed_name;
use super::{close_block, describe, take_until, unexpected_child, Completed, ElementParser};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::NamespaceBuilder;
use crate::webidl::model::Constant;
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{ready, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{").expect("valid regex"));
static HEADER_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;}]").expect("valid regex"));
static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));
static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^namespace (?P<name>[A-Za-z_]\w*)$").expect("valid regex"));
static CONSTANT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^const (?P<declaration>[^=]+?) ?= ?(?P<value>.+)$").expect("valid regex")
});

#[derive(Debug)]
pub struct NamespaceParser {
    builder: NamespaceBuilder,
}

impl NamespaceParser {
    pub fn new(start: usize) -> Self {
        Self {
            builder: NamespaceBuilder::new("", start),
        }
    }
}

impl ElementParser for NamespaceParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Namespace
    }

    fn describe(&self) -> String {
        describe(ParserKind::Namespace, &self.builder.name)
    }

    fn start_offset(&self) -> usize {
        self.builder.offset
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &OPEN_BRACE,
            Some(&HEADER_STOP),
            "namespace header"
        )?);
        let header = squash(&polled.text);
        let caps = HEADER.captures(&header).ok_or_else(|| {
            ParseError::unmatched(
                self.builder.offset,
                format!("malformed namespace header `{}`", header),
            )
        })?;
        self.builder.name = caps["name"].to_string();
        Ok(Read::Ready(()))
    }

    fn try_end(&mut self, stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        close_block(stream, "}", "namespace")
    }

    fn attach(&mut self, child: Completed, offset: usize) -> Result<(), ParseError> {
        match child {
            Completed::Comment(_) => Ok(()),
            Completed::Constant(constant) => {
                self.builder.constants.push(constant);
                Ok(())
            }
            other => Err(unexpected_child(ParserKind::Namespace, &other, offset)),
        }
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Namespace(self.builder))
    }
}

#[derive(Debug)]
pub struct ConstantParser {
    start: usize,
    constant: Option<Constant>,
}

impl ConstantParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            constant: None,
        }
    }
}

impl ElementParser for ConstantParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Constant
    }

    fn describe(&self) -> String {
        let name = self.constant.as_ref().map_or("", |c| c.name.as_str());
        describe(ParserKind::Constant, name)
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &SEMICOLON,
            Some(&BLOCK_BOUNDARY),
            "constant"
        )?);
        let text = squash(&polled.text);
        let caps = CONSTANT.captures(&text).ok_or_else(|| {
            ParseError::unmatched(self.start, format!("malformed constant `{}`", text))
        })?;
        let (idl_type, name) = typed_name(&caps["declaration"], "constant", self.start)?;
        self.constant = Some(Constant {
            name,
            idl_type,
            value: caps["value"].to_string(),
        });
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let constant = self
            .constant
            .ok_or_else(|| ParseError::unmatched(self.start, "constant was not read"))?;
        Ok(Completed::Constant(constant))
    }
}
