//! Interface members: attributes, functions, constructors and function parameters.
//!
//!     A function is a container: its header `[static] Type name(` is read by `begin`, each
//!     parameter is a child construct, and `);` ends it. Constructors share the parser and only
//!     differ in their header, `constructor(`.
//!
//!     The `,` between parameters is consumed by the function, so a leading, doubled or trailing
//!     comma is rejected instead of being skipped.

use super::{
    describe, expect_literal, take_until, unexpected_child, Completed, ElementParser,
    PendingDecorators,
};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::FunctionBuilder;
use crate::webidl::model::types::split_typed_name;
use crate::webidl::model::{Attribute, FunctionParameter, IdlType};
use crate::webidl::parsing::grammar::{strip_word, ParserKind};
use crate::webidl::stream::{ready, squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));
static OPEN_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(").expect("valid regex"));
static HEADER_STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,;{}]").expect("valid regex"));

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<static>static )?(?P<readonly>readonly )?attribute (?P<declaration>.+)$")
        .expect("valid regex")
});

/// Type and name of a `Type name` declaration.
pub(crate) fn typed_name(
    declaration: &str,
    what: &str,
    offset: usize,
) -> Result<(IdlType, String), ParseError> {
    let (type_text, name) = split_typed_name(declaration).ok_or_else(|| {
        ParseError::unmatched(offset, format!("malformed {} `{}`", what, declaration))
    })?;
    Ok((IdlType::parse(type_text, offset)?, name.to_string()))
}

/// Split `declaration = default` into the declaration and the trimmed default text.
pub(crate) fn split_default(text: &str) -> (&str, Option<String>) {
    match text.split_once('=') {
        Some((declaration, default)) => (declaration.trim(), Some(default.trim().to_string())),
        None => (text, None),
    }
}

// ============================================================================
// ATTRIBUTE
// ============================================================================

#[derive(Debug)]
pub struct AttributeParser {
    start: usize,
    attribute: Option<Attribute>,
}

impl AttributeParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            attribute: None,
        }
    }
}

impl ElementParser for AttributeParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Attribute
    }

    fn describe(&self) -> String {
        let name = self.attribute.as_ref().map_or("", |a| a.name.as_str());
        describe(ParserKind::Attribute, name)
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &SEMICOLON,
            Some(&BLOCK_BOUNDARY),
            "attribute"
        )?);
        let text = squash(&polled.text);
        let caps = ATTRIBUTE.captures(&text).ok_or_else(|| {
            ParseError::unmatched(self.start, format!("malformed attribute `{}`", text))
        })?;
        let (idl_type, name) = typed_name(&caps["declaration"], "attribute", self.start)?;
        self.attribute = Some(Attribute {
            name,
            idl_type,
            is_static: caps.name("static").is_some(),
            is_readonly: caps.name("readonly").is_some(),
            decorators: Vec::new(),
        });
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let attribute = self
            .attribute
            .ok_or_else(|| ParseError::unmatched(self.start, "attribute was not read"))?;
        Ok(Completed::Attribute(attribute))
    }
}

// ============================================================================
// FUNCTION / CONSTRUCTOR
// ============================================================================

#[derive(Debug)]
pub struct FunctionParser {
    kind: ParserKind,
    start: usize,
    function: FunctionBuilder,
    pending: PendingDecorators,
    after_comma: bool,
}

impl FunctionParser {
    pub fn function(start: usize) -> Self {
        Self::with_kind(ParserKind::Function, start)
    }

    pub fn constructor(start: usize) -> Self {
        Self::with_kind(ParserKind::Constructor, start)
    }

    fn with_kind(kind: ParserKind, start: usize) -> Self {
        Self {
            kind,
            start,
            function: FunctionBuilder::new("", IdlType::simple("void")),
            pending: PendingDecorators::default(),
            after_comma: false,
        }
    }
}

impl ElementParser for FunctionParser {
    fn kind(&self) -> ParserKind {
        self.kind
    }

    fn describe(&self) -> String {
        describe(self.kind, &self.function.name)
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(take_until(
            stream,
            &OPEN_PAREN,
            Some(&HEADER_STOP),
            "function header"
        )?);
        let header = squash(&polled.text);
        if self.kind == ParserKind::Constructor {
            if header != "constructor" {
                return Err(ParseError::unmatched(
                    self.start,
                    format!("malformed constructor `{}`", header),
                ));
            }
            return Ok(Read::Ready(()));
        }

        let declaration = strip_word(&header, "static");
        let (return_type, name) = typed_name(declaration, "function header", self.start)?;
        self.function.name = name;
        self.function.return_type = return_type;
        self.function.is_static = declaration.len() != header.len();
        Ok(Read::Ready(()))
    }

    fn try_end(&mut self, stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        let offset = stream.offset();
        if ready!(stream.starts_with(",")) {
            if self.after_comma || self.function.parameters.is_empty() {
                return Err(ParseError::unmatched(offset, "expected parameter before `,`"));
            }
            stream.advance(1);
            stream.skip_whitespace();
            self.after_comma = true;
            return Ok(Read::Ready(false));
        }

        let mark = stream.mark();
        if !ready!(stream.consume(")")) {
            return Ok(Read::Ready(false));
        }
        if self.after_comma {
            return Err(ParseError::unmatched(offset, "expected parameter after `,`"));
        }
        if let Read::NeedMore = expect_literal(stream, ";", self.kind.name())? {
            stream.reset(mark);
            return Ok(Read::NeedMore);
        }
        self.pending.ensure_empty("end of parameter list")?;
        Ok(Read::Ready(true))
    }

    fn attach(&mut self, child: Completed, offset: usize) -> Result<(), ParseError> {
        match child {
            Completed::Decorators(decorators) => self.pending.set(decorators, offset),
            Completed::Parameter(mut parameter) => {
                if !self.function.parameters.is_empty() && !self.after_comma {
                    return Err(ParseError::unmatched(offset, "expected `,` between parameters"));
                }
                parameter.decorators = self.pending.take();
                self.function.parameters.push(parameter);
                self.after_comma = false;
                Ok(())
            }
            other => Err(unexpected_child(self.kind, &other, offset)),
        }
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        Ok(match self.kind {
            ParserKind::Constructor => Completed::Constructor(self.function),
            _ => Completed::Function(self.function),
        })
    }
}

// ============================================================================
// FUNCTION PARAMETER
// ============================================================================

#[derive(Debug)]
pub struct FunctionParameterParser {
    start: usize,
    parameter: Option<FunctionParameter>,
}

impl FunctionParameterParser {
    pub fn new(start: usize) -> Self {
        Self {
            start,
            parameter: None,
        }
    }
}

impl ElementParser for FunctionParameterParser {
    fn kind(&self) -> ParserKind {
        ParserKind::FunctionParameter
    }

    fn describe(&self) -> String {
        let name = self.parameter.as_ref().map_or("", |p| p.name.as_str());
        describe(ParserKind::FunctionParameter, name)
    }

    fn start_offset(&self) -> usize {
        self.start
    }

    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        let polled = ready!(stream.poll_until_unnested(&[',', ')'], &[';', '{', '}']))
            .ok_or_else(|| ParseError::unmatched(self.start, "unterminated parameter"))?;
        let text = squash(&polled.text);
        let (declaration, default_value) = split_default(&text);
        let optional = strip_word(declaration, "optional");
        let (idl_type, name) = typed_name(optional, "parameter", self.start)?;
        self.parameter = Some(FunctionParameter {
            name,
            idl_type,
            is_optional: optional.len() != declaration.len(),
            default_value,
            decorators: Vec::new(),
        });

        // The delimiter, `,` or `)`, is left for the function.
        stream.advance(polled.end - polled.delimiter.len() - stream.offset());
        Ok(Read::Ready(()))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        let parameter = self
            .parameter
            .ok_or_else(|| ParseError::unmatched(self.start, "parameter was not read"))?;
        Ok(Completed::Parameter(parameter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webidl::error::ErrorKind;

    fn run(mut parser: Box<dyn ElementParser>, source: &str) -> Result<Completed, ParseError> {
        let mut stream = SourceStream::from_complete(source);
        parser.begin(&mut stream)?;
        parser.complete()
    }

    #[test]
    fn test_static_readonly_attribute() {
        match run(
            Box::new(AttributeParser::new(0)),
            "static readonly attribute unsigned long count;",
        )
        .unwrap()
        {
            Completed::Attribute(attribute) => {
                assert_eq!(attribute.name, "count");
                assert_eq!(attribute.idl_type.type_name(), "unsigned long");
                assert!(attribute.is_static);
                assert!(attribute.is_readonly);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_attribute_without_name() {
        let err = run(Box::new(AttributeParser::new(7)), "attribute long;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnmatchedConstruct);
        assert_eq!(err.offset, 7);
    }

    #[test]
    fn test_attribute_with_nullable_type() {
        let err = run(Box::new(AttributeParser::new(0)), "attribute DOMString? label;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType);
    }

    #[test]
    fn test_static_function_header() {
        let mut stream = SourceStream::from_complete("static PxFoundation create(long v);");
        let mut parser = FunctionParser::function(0);
        parser.begin(&mut stream).unwrap();
        assert_eq!(parser.function.name, "create");
        assert!(parser.function.is_static);
        assert_eq!(parser.describe(), "function create");
        assert_eq!(stream.rest(), "long v);");
    }

    #[test]
    fn test_function_end_waits_for_semicolon() {
        let mut stream = SourceStream::new();
        stream.push_str(")");
        let mut parser = FunctionParser::function(0);
        assert_eq!(parser.try_end(&mut stream).unwrap(), Read::NeedMore);
        assert_eq!(stream.rest(), ")");
        stream.push_str(" ;");
        assert_eq!(parser.try_end(&mut stream).unwrap(), Read::Ready(true));
    }

    #[test]
    fn test_optional_parameter_with_default() {
        let mut stream = SourceStream::from_complete("optional long flags = 0, long y)");
        let mut parser = Box::new(FunctionParameterParser::new(0));
        parser.begin(&mut stream).unwrap();
        assert_eq!(stream.rest(), ", long y)");
        match parser.complete().unwrap() {
            Completed::Parameter(parameter) => {
                assert!(parameter.is_optional);
                assert_eq!(parameter.name, "flags");
                assert_eq!(parameter.default_value.as_deref(), Some("0"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_last_parameter_leaves_closing_paren() {
        let mut stream = SourceStream::from_complete("PxVec3 v);");
        let mut parser = FunctionParameterParser::new(0);
        parser.begin(&mut stream).unwrap();
        assert_eq!(stream.rest(), ");");
    }
}
