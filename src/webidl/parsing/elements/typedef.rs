//! `typedef [Decorators] Type Alias;`

use super::decorators::parse_items;
use super::members::typed_name;
use super::{describe, take_until, Completed, ElementParser};
use crate::webidl::error::ParseError;
use crate::webidl::model::TypeDef;
use crate::webidl::parsing::grammar::{strip_word, ParserKind};
use crate::webidl::stream::{ready, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));

#[derive(Debug)]
pub struct TypeDefParser {
    start: usize,
    typedef: Option<TypeDef>,
}

impl TypeDefParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            typedef: None,
        }
    }
}

impl ElementParser for TypeDefParser {
    fn kind(&self) -> ParserKind {
        ParserKind::TypeDef
    }

    fn describe(&self) -> String {
        let name = self.typedef.as_ref().map_or("", |t| t.name.as_str());
        describe(ParserKind::TypeDef, name)
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &SEMICOLON,
            Some(&BLOCK_BOUNDARY),
            "typedef"
        )?);
        let text = squash(&polled.text);
        let mut declaration = strip_word(&text, "typedef");

        let mut decorators = Vec::new();
        if let Some(list) = declaration.strip_prefix('[') {
            let (inner, rest) = list.split_once(']').ok_or_else(|| {
                ParseError::malformed_decorator(self.start, "unclosed decorator list in typedef")
            })?;
            decorators = parse_items(inner, self.start)?;
            declaration = rest.trim_start();
        }

        let (idl_type, name) = typed_name(declaration, "typedef", self.start)?;
        self.typedef = Some(TypeDef {
            name,
            idl_type,
            decorators,
        });
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let typedef = self
            .typedef
            .ok_or_else(|| ParseError::unmatched(self.start, "typedef was not read"))?;
        Ok(Completed::TypeDef(typedef))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webidl::model::Decorator;

    #[test]
    fn test_typedef_with_inline_decorators() {
        let mut stream = SourceStream::from_complete("typedef [Const] unsigned long PxU32;");
        let mut parser = Box::new(TypeDefParser::new(0));
        parser.begin(&mut stream).unwrap();
        match parser.complete().unwrap() {
            Completed::TypeDef(typedef) => {
                assert_eq!(typedef.name, "PxU32");
                assert_eq!(typedef.idl_type.type_name(), "unsigned long");
                assert_eq!(typedef.decorators, vec![Decorator::new("Const")]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
