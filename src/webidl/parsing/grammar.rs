//! Grammar classifier
//!
//!     The grammar is a closed set of construct kinds. Each [ParserKind] carries three things:
//!
//!         - a match predicate: pure lookahead on the stream, never consuming;
//!         - the ordered list of kinds admissible as its children;
//!         - a factory for the element parser that reads the construct.
//!
//!     The engine asks the active frame for its children and tries their predicates in the
//!     listed order. The first match wins, so the order is part of the grammar: decorator lists
//!     and comments come before declarations, attributes and constructors before the more
//!     permissive function predicate.
//!
//! Productions
//!
//!     Root        := (Interface | Enum | LineComment | BlockComment | Decorators
//!                     | Implements | Dictionary | Includes | TypeDef | Namespace)*
//!     Interface   := (Decorators | LineComment | BlockComment | Attribute | Constructor
//!                     | Function | SetLike)*
//!     Dictionary  := (Decorators | LineComment | BlockComment | Member)*
//!     Function    := (Decorators | FunctionParameter)*
//!     Constructor := (Decorators | FunctionParameter)*
//!     Namespace   := (LineComment | BlockComment | Constant)*

use super::elements::{
    comments::{BlockCommentParser, LineCommentParser},
    decorators::DecoratorParser,
    dictionary::{DictionaryParser, MemberParser},
    enums::EnumParser,
    inheritance::InheritanceParser,
    interface::{InterfaceParser, SetLikeParser},
    members::{AttributeParser, FunctionParameterParser, FunctionParser},
    namespace::{ConstantParser, NamespaceParser},
    root::RootParser,
    typedef::TypeDefParser,
    ElementParser,
};
use crate::webidl::model::builders::Relation;
use crate::webidl::model::types::starts_with_type;
use crate::webidl::stream::{squash, Read, SourceStream};
use once_cell::sync::Lazy;
use regex::Regex;

static SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(";").expect("valid regex"));
static OPEN_PAREN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(").expect("valid regex"));
static BLOCK_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{}]").expect("valid regex"));
static STATEMENT_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;{}]").expect("valid regex"));
static IMPLEMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\simplements\s").expect("valid regex"));
static INCLUDES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\sincludes\s").expect("valid regex"));
static ATTRIBUTE_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:static )?(?:readonly )?attribute\b").expect("valid regex")
});
static SETLIKE_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^readonly setlike ?<").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    Root,
    Interface,
    Dictionary,
    Member,
    SetLike,
    Attribute,
    Function,
    Constructor,
    FunctionParameter,
    Enum,
    LineComment,
    BlockComment,
    Decorators,
    Implements,
    Includes,
    TypeDef,
    Namespace,
    Constant,
}

use ParserKind::*;

const ROOT_CHILDREN: &[ParserKind] = &[
    Interface,
    Enum,
    LineComment,
    BlockComment,
    Decorators,
    Implements,
    Dictionary,
    Includes,
    TypeDef,
    Namespace,
];
const INTERFACE_CHILDREN: &[ParserKind] = &[
    Decorators,
    LineComment,
    BlockComment,
    Attribute,
    Constructor,
    Function,
    SetLike,
];
const DICTIONARY_CHILDREN: &[ParserKind] = &[Decorators, LineComment, BlockComment, Member];
const FUNCTION_CHILDREN: &[ParserKind] = &[Decorators, FunctionParameter];
const NAMESPACE_CHILDREN: &[ParserKind] = &[LineComment, BlockComment, Constant];

impl ParserKind {
    /// Kinds that may appear directly inside this construct, in match priority order.
    pub fn possible_children(self) -> &'static [ParserKind] {
        match self {
            Root => ROOT_CHILDREN,
            Interface => INTERFACE_CHILDREN,
            Dictionary => DICTIONARY_CHILDREN,
            Function | Constructor => FUNCTION_CHILDREN,
            Namespace => NAMESPACE_CHILDREN,
            Member | SetLike | Attribute | FunctionParameter | Enum | LineComment
            | BlockComment | Decorators | Implements | Includes | TypeDef | Constant => &[],
        }
    }

    /// Whether the construct starts at the cursor. Never moves the cursor.
    pub fn matches(self, stream: &SourceStream) -> Read<bool> {
        match self {
            Root => Read::Ready(false),
            Interface => either(stream.starts_with_word("interface"), || {
                stream.starts_with_word("partial")
            }),
            Dictionary => stream.starts_with_word("dictionary"),
            Member => statement_matches(stream, |text| {
                let declaration = strip_default(strip_word(text, "required"));
                starts_with_type(declaration)
            }),
            SetLike => statement_matches(stream, |text| SETLIKE_HEAD.is_match(text)),
            Attribute => statement_matches(stream, |text| ATTRIBUTE_HEAD.is_match(text)),
            Function => stream
                .poll_until_pattern(&OPEN_PAREN, Some(&STATEMENT_BOUNDARY))
                .map(|polled| {
                    polled.is_some_and(|polled| {
                        let text = squash(&polled.text);
                        starts_with_type(strip_word(&text, "static"))
                    })
                }),
            Constructor => stream.starts_with_word("constructor"),
            FunctionParameter => stream
                .poll_until_unnested(&[',', ')'], &[';', '{', '}'])
                .map(|polled| {
                    polled.is_some_and(|polled| {
                        let text = squash(&polled.text);
                        text.starts_with("optional ") || starts_with_type(strip_default(&text))
                    })
                }),
            Enum => stream.starts_with_word("enum"),
            LineComment => stream.starts_with("//"),
            BlockComment => stream.starts_with("/*"),
            Decorators => stream.starts_with("["),
            Implements => stream
                .poll_until_pattern(&IMPLEMENTS, Some(&STATEMENT_BOUNDARY))
                .map(|polled| polled.is_some()),
            Includes => stream
                .poll_until_pattern(&INCLUDES, Some(&STATEMENT_BOUNDARY))
                .map(|polled| polled.is_some()),
            TypeDef => stream.starts_with_word("typedef"),
            Namespace => stream.starts_with_word("namespace"),
            Constant => stream.starts_with_word("const"),
        }
    }

    /// A fresh parser for a construct starting at `offset`.
    pub fn new_parser(self, offset: usize) -> Box<dyn ElementParser> {
        match self {
            Root => Box::new(RootParser::new("package")),
            Interface => Box::new(InterfaceParser::new(offset)),
            Dictionary => Box::new(DictionaryParser::new(offset)),
            Member => Box::new(MemberParser::new(offset)),
            SetLike => Box::new(SetLikeParser::new(offset)),
            Attribute => Box::new(AttributeParser::new(offset)),
            Function => Box::new(FunctionParser::function(offset)),
            Constructor => Box::new(FunctionParser::constructor(offset)),
            FunctionParameter => Box::new(FunctionParameterParser::new(offset)),
            Enum => Box::new(EnumParser::new(offset)),
            LineComment => Box::new(LineCommentParser::new(offset)),
            BlockComment => Box::new(BlockCommentParser::new(offset)),
            Decorators => Box::new(DecoratorParser::new(offset)),
            Implements => Box::new(InheritanceParser::new(Relation::Implements, offset)),
            Includes => Box::new(InheritanceParser::new(Relation::Includes, offset)),
            TypeDef => Box::new(TypeDefParser::new(offset)),
            Namespace => Box::new(NamespaceParser::new(offset)),
            Constant => Box::new(ConstantParser::new(offset)),
        }
    }

    /// Lowercase name used in construct stack descriptions.
    pub fn name(self) -> &'static str {
        match self {
            Root => "root",
            Interface => "interface",
            Dictionary => "dictionary",
            Member => "member",
            SetLike => "setlike",
            Attribute => "attribute",
            Function => "function",
            Constructor => "constructor",
            FunctionParameter => "parameter",
            Enum => "enum",
            LineComment => "line comment",
            BlockComment => "block comment",
            Decorators => "decorators",
            Implements => "implements",
            Includes => "includes",
            TypeDef => "typedef",
            Namespace => "namespace",
            Constant => "const",
        }
    }
}

fn either(first: Read<bool>, second: impl FnOnce() -> Read<bool>) -> Read<bool> {
    match first {
        Read::Ready(false) => second(),
        other => other,
    }
}

/// Apply `predicate` to the squashed text up to the next `;`, bounded by block braces.
fn statement_matches(stream: &SourceStream, predicate: impl FnOnce(&str) -> bool) -> Read<bool> {
    stream
        .poll_until_pattern(&SEMICOLON, Some(&BLOCK_BOUNDARY))
        .map(|polled| polled.is_some_and(|polled| predicate(&squash(&polled.text))))
}

/// `text` without a leading `word ` prefix.
pub(crate) fn strip_word<'a>(text: &'a str, word: &str) -> &'a str {
    text.strip_prefix(word)
        .and_then(|rest| rest.strip_prefix(' '))
        .unwrap_or(text)
}

/// `text` without a trailing `= default` part.
pub(crate) fn strip_default(text: &str) -> &str {
    match text.split_once('=') {
        Some((declaration, _)) => declaration.trim_end(),
        None => text,
    }
}
