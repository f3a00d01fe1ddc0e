//! Interfaces and their `setlike` marker.

use super::{
    close_block, describe, take_until, unexpected_child, Completed, ElementParser,
    PendingDecorators,
};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::InterfaceBuilder;
use crate::webidl::model::IdlType;
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{ready, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{").expect("valid regex"));
static HEADER_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;}]").expect("valid regex"));
static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<partial>partial )?interface (?P<name>[A-Za-z_]\w*)(?: ?: ?(?P<supers>[A-Za-z_]\w*(?: ?, ?[A-Za-z_]\w*)*))?$",
    )
    .expect("valid regex")
});
static SETLIKE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^readonly setlike ?< ?(?P<type>[^<>]+?) ?>$").expect("valid regex")
});

#[derive(Debug)]
pub struct InterfaceParser {
    builder: InterfaceBuilder,
    pending: PendingDecorators,
}

impl InterfaceParser {
    pub fn new(start: usize) -> Self {
        Self {
            builder: InterfaceBuilder::new("", start),
            pending: PendingDecorators::default(),
        }
    }
}

impl ElementParser for InterfaceParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Interface
    }

    fn describe(&self) -> String {
        describe(ParserKind::Interface, &self.builder.name)
    }

    fn start_offset(&self) -> usize {
        self.builder.offset
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &OPEN_BRACE,
            Some(&HEADER_STOP),
            "interface header"
        )?);
        let header = squash(&polled.text);
        let caps = HEADER.captures(&header).ok_or_else(|| {
            ParseError::unmatched(
                self.builder.offset,
                format!("malformed interface header `{}`", header),
            )
        })?;
        self.builder.name = caps["name"].to_string();
        self.builder.is_partial = caps.name("partial").is_some();
        if let Some(supers) = caps.name("supers") {
            self.builder.super_interfaces = supers
                .as_str()
                .split(',')
                .map(|name| name.trim().to_string())
                .collect();
        }
        Ok(Read::Ready(()))
    }

    fn try_end(&mut self, stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        let closed = ready!(close_block(stream, "}", "interface")?);
        if closed {
            self.pending.ensure_empty("end of interface")?;
        }
        Ok(Read::Ready(closed))
    }

    fn attach(&mut self, child: Completed, offset: usize) -> Result<(), ParseError> {
        match child {
            Completed::Comment(_) => {}
            Completed::Decorators(decorators) => self.pending.set(decorators, offset)?,
            Completed::Attribute(mut attribute) => {
                attribute.decorators = self.pending.take();
                self.builder.attributes.push(attribute);
            }
            Completed::Function(mut function) => {
                function.decorators = self.pending.take();
                self.builder.functions.push(function);
            }
            Completed::Constructor(mut constructor) => {
                constructor.name = self.builder.name.clone();
                constructor.return_type = IdlType::simple(self.builder.name.as_str());
                constructor.decorators = self.pending.take();
                self.builder.functions.push(constructor);
            }
            Completed::SetLike(element) => {
                self.pending.ensure_empty("setlike")?;
                if self.builder.setlike.is_some() {
                    return Err(ParseError::unmatched(
                        offset,
                        format!("interface `{}` declares setlike twice", self.builder.name),
                    ));
                }
                self.builder.setlike = Some(element);
            }
            other => return Err(unexpected_child(ParserKind::Interface, &other, offset)),
        }
        Ok(())
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Interface(self.builder))
    }
}

#[derive(Debug)]
pub struct SetLikeParser {
    start: usize,
    element: Option<IdlType>,
}

impl SetLikeParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            element: None,
        }
    }
}

impl ElementParser for SetLikeParser {
    fn kind(&self) -> ParserKind {
        ParserKind::SetLike
    }

    fn describe(&self) -> String {
        "setlike".to_string()
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &SEMICOLON,
            Some(&BLOCK_BOUNDARY),
            "setlike declaration"
        )?);
        let text = squash(&polled.text);
        let caps = SETLIKE.captures(&text).ok_or_else(|| {
            ParseError::unmatched(self.start, format!("malformed setlike `{}`", text))
        })?;
        self.element = Some(IdlType::parse(&caps["type"], self.start)?);
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let element = self
            .element
            .ok_or_else(|| ParseError::unmatched(self.start, "setlike without element type"))?;
        Ok(Completed::SetLike(element))
    }
}
