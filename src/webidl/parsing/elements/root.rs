//! Document root
//!
//!     The bottom frame of the parser stack. It collects every top-level declaration into a
//!     [ModelBuilder] and tracks the current package.
//!
//!     A comment whose whole text is `[<marker>=<name>]` switches the current package; every
//!     interface, dictionary and enum completed afterwards is tagged with it. The marker key
//!     comes from the parsing configuration and defaults to `package`.

use super::{unexpected_child, Completed, ElementParser, PendingDecorators};
use crate::webidl::error::ParseError;
use crate::webidl::model::builders::ModelBuilder;
use crate::webidl::model::Decorator;
use crate::webidl::parsing::grammar::ParserKind;
use crate::webidl::stream::{Read, SourceStream};
use tracing::debug;

#[derive(Debug)]
pub struct RootParser {
    builder: ModelBuilder,
    pending: PendingDecorators,
    marker: String,
    package: String,
}

impl RootParser {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            builder: ModelBuilder::new(),
            pending: PendingDecorators::default(),
            marker: marker.into(),
            package: String::new(),
        }
    }

    /// Pending decorators first, then any the declaration carried itself.
    fn decorate(&mut self, own: Vec<Decorator>) -> Vec<Decorator> {
        let mut decorators = self.pending.take();
        decorators.extend(own);
        decorators
    }
}

/// Package named by a `[marker=name]` comment, if the comment is one.
pub fn package_marker<'a>(comment: &'a str, marker: &str) -> Option<&'a str> {
    let inner = comment.trim().strip_prefix('[')?.strip_suffix(']')?;
    let (key, value) = inner.split_once('=')?;
    if key.trim() != marker {
        return None;
    }
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some(value)
}

impl ElementParser for RootParser {
    fn kind(&self) -> ParserKind {
        ParserKind::Root
    }

    fn describe(&self) -> String {
        "root".to_string()
    }

    fn start_offset(&self) -> usize {
        0
    }

    fn begin(&mut self, _stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        Ok(Read::Ready(()))
    }

    fn try_end(&mut self, _stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        Ok(Read::Ready(false))
    }

    fn attach(&mut self, child: Completed, offset: usize) -> Result<(), ParseError> {
        match child {
            Completed::Comment(text) => {
                if let Some(package) = package_marker(&text, &self.marker) {
                    debug!(package, offset, "package marker");
                    self.package = package.to_string();
                }
            }
            Completed::Decorators(decorators) => self.pending.set(decorators, offset)?,
            Completed::Interface(mut interface) => {
                interface.decorators = self.decorate(interface.decorators);
                interface.source_package = self.package.clone();
                self.builder.add_interface(interface);
            }
            Completed::Dictionary(mut dictionary) => {
                dictionary.decorators = self.decorate(dictionary.decorators);
                dictionary.source_package = self.package.clone();
                self.builder.add_dictionary(dictionary);
            }
            Completed::Enum(mut idl_enum) => {
                idl_enum.decorators = self.decorate(idl_enum.decorators);
                idl_enum.source_package = self.package.clone();
                self.builder.add_enum(idl_enum);
            }
            Completed::TypeDef(mut typedef) => {
                typedef.decorators = self.decorate(typedef.decorators);
                self.builder.add_typedef(typedef, offset);
            }
            Completed::Namespace(mut namespace) => {
                namespace.decorators = self.decorate(namespace.decorators);
                self.builder.add_namespace(namespace);
            }
            Completed::Inheritance(statement) => {
                self.pending.ensure_empty(statement.relation.keyword())?;
                self.builder.add_inheritance(statement);
            }
            other => return Err(unexpected_child(ParserKind::Root, &other, offset)),
        }
        Ok(())
    }

    fn complete(self: Box<Self>) -> Result<Completed, ParseError> {
        self.pending.ensure_empty("end of input")?;
        Ok(Completed::Root(self.builder))
    }
}
