//! Line and block comments. Both complete with their text so the root can look for package
//! markers; every other container ignores them.

use super::{take_until, Completed, ElementParser};
use crate::webidl::error::ParseError;
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{ready, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n").expect("valid regex"));
static BLOCK_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*/").expect("valid regex"));

#[derive(Debug)]
pub struct LineCommentParser {
    start: usize,
    text: String,
}

impl LineCommentParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            text: String::new(),
        }
    }
}

impl ElementParser for LineCommentParser {
    fn kind(&self) -> ParserKind {
        ParserKind::LineComment
    }

    fn describe(&self) -> String {
        "line comment".to_string()
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        ready!(stream.consume("//"));
        // The last line of the input may end without a newline.
        self.text = match ready!(stream.consume_until_pattern(&NEWLINE, None)) {
            Some(polled) => polled.text,
            None => stream.take_rest(),
        };
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Comment(self.text.trim().to_string()))
    }
}

#[derive(Debug)]
pub struct BlockCommentParser {
    start: usize,
    text: String,
}

impl BlockCommentParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            text: String::new(),
        }
    }
}

impl ElementParser for BlockCommentParser {
    fn kind(&self) -> ParserKind {
        ParserKind::BlockComment
    }

    fn describe(&self) -> String {
        "block comment".to_string()
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        ready!(stream.consume("/*"));
        let polled = ready!(take_until(stream, &BLOCK_END, None, "block comment")?);
        self.text = polled.text;
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(Completed::Comment(self.text.trim().to_string()))
    }
}
