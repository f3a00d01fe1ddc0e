//! Element parsers
//!
//!     One parser per construct kind. The engine pushes a parser when its construct starts and
//!     pops it when the construct's terminator has been read. Each parser owns the mutable
//!     builder for its construct; completed children are handed to their parent through
//!     [ElementParser::attach].
//!
//! Lifecycle
//!
//!     1. `begin`: read the header (`interface Foo : Bar {`, `long bar(`). Leaf constructs read
//!        their whole text here. A `NeedMore` from `begin` discards the parser and rewinds the
//!        cursor, so `begin` may bail out at any point.
//!     2. children: the engine matches and runs admissible child parsers, attaching each one.
//!     3. `try_end`: consume the terminator (`};`, `);`). `Ready(false)` means the construct is
//!        still open and the engine goes on matching children.
//!     4. `complete`: hand the finished value to the engine.
//!
//! Decorators
//!
//!     A decorator list is a construct of its own. Containers keep the most recent list in a
//!     [PendingDecorators] slot and move it onto the next declaration they receive. Comments
//!     may sit between the list and its declaration. A list left over when the container ends
//!     is a [MalformedDecorator](crate::webidl::error::ErrorKind::MalformedDecorator) error.

pub mod comments;
pub mod decorators;
pub mod dictionary;
pub mod enums;
pub mod inheritance;
pub mod interface;
pub mod members;
pub mod namespace;
pub mod root;
pub mod typedef;

use super::grammar::ParserKind;
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::{
    DictionaryBuilder, EnumBuilder, FunctionBuilder, Inheritance, InterfaceBuilder,
    ModelBuilder, NamespaceBuilder,
};
use crate::webidl::model::{
    Attribute, Constant, Decorator, DictionaryMember, FunctionParameter, IdlType, TypeDef,
};
use crate::webidl::stream::{ready, Polled, Read, SourceStream};
use regex::Regex;
use std::fmt;

/// Value produced by a finished element parser.
#[derive(Debug)]
pub enum Completed {
    Root(ModelBuilder),
    Interface(InterfaceBuilder),
    Dictionary(DictionaryBuilder),
    Member(DictionaryMember),
    SetLike(IdlType),
    Attribute(Attribute),
    Function(FunctionBuilder),
    /// Parameters and decorators of a constructor. The enclosing interface names it.
    Constructor(FunctionBuilder),
    Parameter(FunctionParameter),
    Enum(EnumBuilder),
    /// Text of a line or block comment, delimiters removed.
    Comment(String),
    Decorators(Vec<Decorator>),
    Inheritance(Inheritance),
    TypeDef(TypeDef),
    Namespace(NamespaceBuilder),
    Constant(Constant),
}

impl Completed {
    fn label(&self) -> &'static str {
        match self {
            Completed::Root(_) => "document",
            Completed::Interface(_) => "interface",
            Completed::Dictionary(_) => "dictionary",
            Completed::Member(_) => "member",
            Completed::SetLike(_) => "setlike",
            Completed::Attribute(_) => "attribute",
            Completed::Function(_) => "function",
            Completed::Constructor(_) => "constructor",
            Completed::Parameter(_) => "parameter",
            Completed::Enum(_) => "enum",
            Completed::Comment(_) => "comment",
            Completed::Decorators(_) => "decorator list",
            Completed::Inheritance(_) => "inheritance statement",
            Completed::TypeDef(_) => "typedef",
            Completed::Namespace(_) => "namespace",
            Completed::Constant(_) => "constant",
        }
    }
}

pub trait ElementParser: fmt::Debug {
    fn kind(&self) -> ParserKind;

    /// Short description for error stacks, e.g. `interface Foo`.
    fn describe(&self) -> String;

    /// Absolute offset where the construct starts.
    fn start_offset(&self) -> usize;

    /// Read the construct's header, or the whole construct for leaves.
    fn begin(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError>;

    /// Read the terminator if the cursor is on it.
    fn try_end(&mut self, _stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        Ok(Read::Ready(true))
    }

    /// Receive a completed child. `offset` is where the child started.
    fn attach(&mut self, child: Completed, offset: usize) -> Result<(), ParseError> {
        Err(unexpected_child(self.kind(), &child, offset))
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError>;
}

pub(crate) fn unexpected_child(parent: ParserKind, child: &Completed, offset: usize) -> ParseError {
    ParseError::unmatched(
        offset,
        format!("a {} cannot appear inside a {}", child.label(), parent.name()),
    )
}

/// `name` or `kind name` for stack descriptions, depending on whether the name is known yet.
pub(crate) fn describe(kind: ParserKind, name: &str) -> String {
    if name.is_empty() {
        kind.name().to_string()
    } else {
        format!("{} {}", kind.name(), name)
    }
}

// ============================================================================
// PENDING DECORATORS
// ============================================================================

/// The decorator list waiting for the next declaration of a container.
#[derive(Debug, Default)]
pub struct PendingDecorators {
    pending: Option<(Vec<Decorator>, usize)>,
}

impl PendingDecorators {
    pub fn set(&mut self, decorators: Vec<Decorator>, offset: usize) -> Result<(), ParseError> {
        if let Some((_, previous)) = &self.pending {
            return Err(ParseError::malformed_decorator(
                *previous,
                "decorator list is followed by another decorator list",
            ));
        }
        self.pending = Some((decorators, offset));
        Ok(())
    }

    pub fn take(&mut self) -> Vec<Decorator> {
        self.pending
            .take()
            .map(|(decorators, _)| decorators)
            .unwrap_or_default()
    }

    /// Fail if a list is still waiting. `what` names the point that was reached instead.
    pub fn ensure_empty(&self, what: &str) -> Result<(), ParseError> {
        match &self.pending {
            Some((_, offset)) => Err(ParseError::malformed_decorator(
                *offset,
                format!("decorator list is not followed by a declaration ({})", what),
            )),
            None => Ok(()),
        }
    }
}

// ============================================================================
// READING HELPERS
// ============================================================================

/// Consume through the first match of `open`. A `stop` match before it is an unmatched
/// construct; running out of input is stream exhaustion.
pub(crate) fn take_until(
    stream: &mut SourceStream,
    open: &Regex,
    stop: Option<&Regex>,
    what: &str,
) -> Result<Read<Polled>, ParseError> {
    let start = stream.offset();
    match stream.consume_until_pattern(open, stop) {
        Read::NeedMore => Ok(Read::NeedMore),
        Read::Ready(Some(polled)) => Ok(Read::Ready(polled)),
        Read::Ready(None) => {
            if stop.is_some_and(|stop| stop.is_match(stream.rest())) {
                Err(ParseError::unmatched(start, format!("malformed {}", what)))
            } else {
                Err(ParseError::stream_exhausted(
                    start,
                    format!("input ended inside {}", what),
                ))
            }
        }
    }
}

/// Skip whitespace and consume `literal`, failing if something else follows.
pub(crate) fn expect_literal(
    stream: &mut SourceStream,
    literal: &str,
    what: &str,
) -> Result<Read<()>, ParseError> {
    stream.skip_whitespace();
    match stream.consume(literal) {
        Read::Ready(true) => Ok(Read::Ready(())),
        Read::NeedMore => Ok(Read::NeedMore),
        Read::Ready(false) => {
            let offset = stream.offset();
            if ready!(stream.at_end()) {
                Err(ParseError::stream_exhausted(
                    offset,
                    format!("input ended before `{}` closing {}", literal, what),
                ))
            } else {
                Err(ParseError::unmatched(
                    offset,
                    format!("expected `{}` closing {}", literal, what),
                ))
            }
        }
    }
}

/// Read `close` followed by `;` if the cursor is on `close`. Rewinds when the `;` has not
/// arrived yet, so the whole terminator is read in one step.
pub(crate) fn close_block(
    stream: &mut SourceStream,
    close: &str,
    what: &str,
) -> Result<Read<bool>, ParseError> {
    let mark = stream.mark();
    if !ready!(stream.consume(close)) {
        return Ok(Read::Ready(false));
    }
    match expect_literal(stream, ";", what)? {
        Read::Ready(()) => Ok(Read::Ready(true)),
        Read::NeedMore => {
            stream.reset(mark);
            Ok(Read::NeedMore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webidl::error::ErrorKind;
    use once_cell::sync::Lazy;

    static BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{").unwrap());
    static STOP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[;}]").unwrap());

    #[test]
    fn test_take_until_consumes_delimiter() {
        let mut stream = SourceStream::from_complete("interface Foo { };");
        let polled = take_until(&mut stream, &BRACE, Some(&STOP), "header").unwrap();
        assert!(matches!(polled, Read::Ready(ref p) if p.text == "interface Foo "));
        assert_eq!(stream.rest(), " };");
    }

    #[test]
    fn test_take_until_distinguishes_stop_from_end_of_input() {
        let mut stream = SourceStream::from_complete("interface Foo;");
        let err = take_until(&mut stream, &BRACE, Some(&STOP), "header").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnmatchedConstruct);

        let mut stream = SourceStream::from_complete("interface Foo");
        let err = take_until(&mut stream, &BRACE, Some(&STOP), "header").unwrap_err();
        assert_eq!(err.kind, ErrorKind::StreamExhausted);
    }

    #[test]
    fn test_close_block_rewinds_until_semicolon_arrives() {
        let mut stream = SourceStream::new();
        stream.push_str("} ");
        assert_eq!(close_block(&mut stream, "}", "interface"), Ok(Read::NeedMore));
        assert_eq!(stream.rest(), "} ");
        stream.push_str(";");
        assert_eq!(close_block(&mut stream, "}", "interface"), Ok(Read::Ready(true)));
        assert_eq!(stream.rest(), "");
    }

    #[test]
    fn test_close_block_requires_semicolon() {
        let mut stream = SourceStream::from_complete("} interface");
        let err = close_block(&mut stream, "}", "interface").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnmatchedConstruct);
    }

    #[test]
    fn test_pending_decorators_must_be_consumed() {
        let mut pending = PendingDecorators::default();
        pending.set(vec![Decorator::new("Value")], 4).unwrap();
        let err = pending.ensure_empty("end of interface").unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDecorator);
        assert_eq!(err.offset, 4);
        assert_eq!(pending.take().len(), 1);
        assert!(pending.ensure_empty("end of interface").is_ok());
    }
}
