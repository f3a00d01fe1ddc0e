//! Error and warning types for parsing and model building
//!
//!     Every failure is fatal for the parse invocation that raised it. A [ParseError] carries
//!     the absolute byte offset where the engine stopped and the stack of constructs that were
//!     open at that point, outermost first, e.g. `["interface Foo", "function bar"]`.
//!
//!     The only non-fatal condition is a [Warning], which is collected by the model builder and
//!     returned next to the finished model.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The category of a fatal parse or build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Input ended before the open construct reached its terminator.
    StreamExhausted,
    /// Content that no admissible construct matches, or a construct that does not parse.
    UnmatchedConstruct,
    /// Unbalanced brackets, a missing value after `=`, or a dangling decorator list.
    MalformedDecorator,
    /// An `implements`/`includes`/inline super reference to an undeclared interface.
    UnresolvedSuperInterface,
    /// Two declarations with the same name in a scope that requires uniqueness.
    DuplicateDefinition,
    /// A type written in a form the model does not support (generics, nullable, unions).
    UnsupportedType,
    /// The byte source failed or produced invalid UTF-8.
    Input,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::StreamExhausted => "stream exhausted",
            ErrorKind::UnmatchedConstruct => "unmatched construct",
            ErrorKind::MalformedDecorator => "malformed decorator",
            ErrorKind::UnresolvedSuperInterface => "unresolved super interface",
            ErrorKind::DuplicateDefinition => "duplicate definition",
            ErrorKind::UnsupportedType => "unsupported type",
            ErrorKind::Input => "input error",
        };
        f.write_str(name)
    }
}

/// A fatal parse or build error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}{}: {message}", format_stack(.stack))]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Absolute byte offset into the input.
    pub offset: usize,
    /// Open constructs, outermost first.
    pub stack: Vec<String>,
    pub message: String,
}

fn format_stack(stack: &[String]) -> String {
    if stack.is_empty() {
        String::new()
    } else {
        format!(" in {}", stack.join(" > "))
    }
}

impl ParseError {
    pub fn new(kind: ErrorKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            offset,
            stack: Vec::new(),
            message: message.into(),
        }
    }

    pub fn stream_exhausted(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StreamExhausted, offset, message)
    }

    pub fn unmatched(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnmatchedConstruct, offset, message)
    }

    pub fn malformed_decorator(offset: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedDecorator, offset, message)
    }

    pub fn unsupported_type(offset: usize, type_text: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedType,
            offset,
            format!("unsupported type form `{}`", type_text),
        )
    }

    /// Attach the construct stack, unless one was already recorded closer to the failure.
    pub fn with_stack(mut self, stack: Vec<String>) -> Self {
        if self.stack.is_empty() {
            self.stack = stack;
        }
        self
    }

    /// True if any open construct description contains `needle`.
    pub fn stack_mentions(&self, needle: &str) -> bool {
        self.stack.iter().any(|frame| frame.contains(needle))
    }
}

/// Advisory conditions found while building a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Warning {
    /// Two functions of one interface share a name and a parameter count. Arity-only
    /// dispatch (e.g. JavaScript bindings) cannot tell them apart.
    DuplicateArity {
        interface: String,
        function: String,
        arity: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateArity {
                interface,
                function,
                arity,
            } => write!(
                f,
                "overloaded function with same parameter count: {}.{} ({} parameters)",
                interface, function, arity
            ),
        }
    }
}
