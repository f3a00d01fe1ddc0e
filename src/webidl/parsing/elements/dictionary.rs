//! Dictionaries and their members.

use super::members::{split_default, typed_name};
use super::{
    close_block, describe, take_until, unexpected_child, Completed, ElementParser,
    PendingDecorators,
};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::DictionaryBuilder;
use crate::webidl::model::DictionaryMember;
use crate::webidl::parsing::grammar::{strip_word, ParserKind};
use crate::webidl::stream::{ready, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{").expect("valid regex"));
static HEADER_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;}]").expect("valid regex"));
static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));
static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^dictionary (?P<name>[A-Za-z_]\w*)$").expect("valid regex"));

#[derive(Debug)]
pub struct DictionaryParser {
    builder: DictionaryBuilder,
    pending: PendingDecorators,
}

impl DictionaryParser {
    pub fn new(start: usize) -> Self {
        Self {
            builder: DictionaryBuilder::new("", start),
            pending: PendingDecorators::default(),
        }
    }
}

impl ElementParser for DictionaryParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Dictionary
    }

    fn describe(&self) -> String {
        describe(ParserKind::Dictionary, &self.builder.name)
    }

    fn start_offset(&self) -> usize {
        self.builder.offset
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &OPEN_BRACE,
            Some(&HEADER_STOP),
            "dictionary header"
        )?);
        let header = squash(&polled.text);
        let caps = HEADER.captures(&header).ok_or_else(|| {
            ParseError::unmatched(
                self.builder.offset,
                format!("malformed dictionary header `{}`", header),
            )
        })?;
        self.builder.name = caps["name"].to_string();
        Ok(Read::Ready(()))
    }

    fn try_end(&mut self, stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        let closed = ready!(close_block(stream, "}", "dictionary")?);
        if closed {
            self.pending.ensure_empty("end of dictionary")?;
        }
        Ok(Read::Ready(closed))
    }

    fn attach(&mut self, child: Completed, offset: usize) -> Result<(), ParseError> {
        match child {
            Completed::Comment(_) => Ok(()),
            Completed::Decorators(decorators) => self.pending.set(decorators, offset),
            Completed::Member(mut member) => {
                member.decorators = self.pending.take();
                self.builder.members.push(member);
                Ok(())
            }
            other => Err(unexpected_child(ParserKind::Dictionary, &other, offset)),
        }
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Dictionary(self.builder))
    }
}

/// `[required] Type name [= default];`
#[derive(Debug)]
pub struct MemberParser {
    start: usize,
    member: Option<DictionaryMember>,
}

impl MemberParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            member: None,
        }
    }
}

impl ElementParser for MemberParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Member
    }

    fn describe(&self) -> String {
        let name = self.member.as_ref().map_or("", |m| m.name.as_str());
        describe(ParserKind::Member, name)
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &SEMICOLON,
            Some(&BLOCK_BOUNDARY),
            "dictionary member"
        )?);
        let text = squash(&polled.text);
        let (declaration, default_value) = split_default(&text);
        let unmarked = strip_word(declaration, "required");
        let (idl_type, name) = typed_name(unmarked, "dictionary member", self.start)?;
        self.member = Some(DictionaryMember {
            name,
            idl_type,
            required: unmarked.len() != declaration.len(),
            default_value,
            decorators: Vec::new(),
        });
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let member = self
            .member
            .ok_or_else(|| ParseError::unmatched(self.start, "member was not read"))?;
        Ok(Completed::Member(member))
    }
}
