//! `A implements B;` and `A includes B;` statements. They are only recorded here; the model
//! builder resolves them once every interface is known.

use super::{take_until, Completed, ElementParser};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::{Inheritance, Relation};
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{ready, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));
static STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<concrete>[A-Za-z_]\w*) (?P<relation>implements|includes) (?P<super>[A-Za-z_]\w*)$")
        .expect("valid regex")
});

#[derive(Debug)]
pub struct InheritanceParser {
    relation: Relation,
    start: usize,
    statement: Option<Inheritance>,
}

impl InheritanceParser {
    pub fn new(relation: Relation, start: usize) -> Self {
        Self {
            relation,
            start,
            statement: None,
        }
    }
}

impl ElementParser for InheritanceParser {
    fn kind(&self) -> ParserKind {
        match self.relation {
            Relation::Implements => ParserKind::Implements,
            Relation::Includes => ParserKind::Includes,
        }
    }

    fn describe(&self) -> String {
        match &self.statement {
            Some(s) => format!("{} {} {}", s.concrete, self.relation.keyword(), s.super_name),
            None => self.relation.keyword().to_string(),
        }
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &SEMICOLON,
            Some(&BLOCK_BOUNDARY),
            self.relation.keyword()
        )?);
        let text = squash(&polled.text);
        let caps = STATEMENT
            .captures(&text)
            .filter(|caps| &caps["relation"] == self.relation.keyword())
            .ok_or_else(|| {
                ParseError::unmatched(
                    self.start,
                    format!("malformed {} statement `{}`", self.relation.keyword(), text),
                )
            })?;
        self.statement = Some(Inheritance {
            concrete: caps["concrete"].to_string(),
            super_name: caps["super"].to_string(),
            relation: self.relation,
            offset: self.start,
        });
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let statement = self
            .statement
            .ok_or_else(|| ParseError::unmatched(self.start, "statement was not read"))?;
        Ok(Completed::Inheritance(statement))
    }
}
