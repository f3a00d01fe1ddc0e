//! Push-down parser engine
//!
//!     The engine owns the stack of open element parsers. The root parser sits at the bottom
//!     for the whole parse. One step does exactly one of these:
//!
//!         - pop the top parser if its terminator is at the cursor, completing it and attaching
//!           the result to the parser below;
//!         - finish, when the input is exhausted and only the root is left;
//!         - push a new parser for the first admissible child kind that matches.
//!
//!     Any step may report `NeedMore`. Nothing is consumed in that case, so the same step is
//!     retried once more input has been pushed.
//!
//! Errors
//!
//!     Every error leaves the engine with the stack of construct descriptions attached,
//!     outermost first and without the root. A construct whose header failed to parse is
//!     included, so `interface Foo { attribute long; };` reports `interface Foo > attribute`.
//!     Stream exhaustion is reported at the start of the innermost open construct.

use super::elements::root::RootParser;
use super::elements::{Completed, ElementParser};
use crate::webidl::error::{ErrorKind, ParseError};
use crate::webidl::model::builders::ModelBuilder;
use crate::webidl::stream::{ready, Read, SourceStream};
use tracing::{debug, trace};

/// Longest excerpt of unmatched input quoted in an error message.
const EXCERPT_LEN: usize = 32;

#[derive(Debug)]
pub struct Engine {
    stack: Vec<Box<dyn ElementParser>>,
}

impl Engine {
    /// A fresh engine whose root recognises `// [<package_marker>=name]` comments.
    pub fn new(package_marker: &str) -> Self {
        Self {
            stack: vec![Box::new(RootParser::new(package_marker))],
        }
    }

    /// Open constructs, outermost first, without the root.
    pub fn describe_stack(&self) -> Vec<String> {
        self.stack.iter().skip(1).map(|p| p.describe()).collect()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Step until the input is exhausted (`Ready`) or more input is needed.
    pub fn run(&mut self, stream: &mut SourceStream) -> Result<Read<()>, ParseError> {
        loop {
            if ready!(self.step(stream)?) {
                return Ok(Read::Ready(()));
            }
        }
    }

    /// Hand over the root builder. Only valid once [run](Self::run) reported `Ready`.
    pub fn into_model_builder(mut self) -> Result<ModelBuilder, ParseError> {
        if self.stack.len() != 1 {
            let err = ParseError::stream_exhausted(0, "input ended with open constructs");
            return Err(self.fail(err, None));
        }
        let Some(root) = self.stack.pop() else {
            return Err(ParseError::new(ErrorKind::StreamExhausted, 0, "no document"));
        };
        match root.complete()? {
            Completed::Root(builder) => Ok(builder),
            other => Err(ParseError::unmatched(0, format!("unexpected {:?} at root", other))),
        }
    }

    /// One engine step. `Ready(true)` once the whole input has been parsed.
    fn step(&mut self, stream: &mut SourceStream) -> Result<Read<bool>, ParseError> {
        stream.skip_whitespace();

        if self.stack.len() > 1 {
            let closed = match self.top_mut().try_end(stream) {
                Ok(closed) => closed,
                Err(err) => return Err(self.fail(err, None)),
            };
            if ready!(closed) {
                self.pop()?;
                return Ok(Read::Ready(false));
            }
        }

        if ready!(stream.at_end()) {
            if self.stack.len() == 1 {
                return Ok(Read::Ready(true));
            }
            let top = self.top();
            let err = ParseError::stream_exhausted(
                top.start_offset(),
                format!("input ended inside {}", top.describe()),
            );
            return Err(self.fail(err, None));
        }

        let kind = self.top().kind();
        let offset = stream.offset();
        for &candidate in kind.possible_children() {
            if !ready!(candidate.matches(stream)) {
                continue;
            }
            let mut parser = candidate.new_parser(offset);
            let mark = stream.mark();
            return match parser.begin(stream) {
                Ok(Read::Ready(())) => {
                    self.stack.push(parser);
                    debug!(
                        kind = candidate.name(),
                        offset,
                        depth = self.stack.len(),
                        "push"
                    );
                    Ok(Read::Ready(false))
                }
                Ok(Read::NeedMore) => {
                    stream.reset(mark);
                    Ok(Read::NeedMore)
                }
                Err(err) => Err(self.fail(err, Some(parser.as_ref()))),
            };
        }

        let excerpt: String = stream
            .rest()
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(EXCERPT_LEN)
            .collect();
        let err = ParseError::unmatched(
            offset,
            format!("unexpected `{}` in {}", excerpt, kind.name()),
        );
        Err(self.fail(err, None))
    }

    /// Complete the top parser and attach it to its parent.
    fn pop(&mut self) -> Result<(), ParseError> {
        let Some(parser) = self.stack.pop() else {
            return Ok(());
        };
        let offset = parser.start_offset();
        let description = parser.describe();
        debug!(
            kind = parser.kind().name(),
            offset,
            depth = self.stack.len(),
            "pop"
        );

        let completed = match parser.complete() {
            Ok(completed) => completed,
            Err(err) => {
                let mut stack = self.describe_stack();
                stack.push(description);
                return Err(err.with_stack(stack));
            }
        };
        if let Completed::Interface(interface) = &completed {
            trace!(interface = %interface.name, "interface parsed");
        }
        let attached = self.top_mut().attach(completed, offset);
        attached.map_err(|err| self.fail(err, None))
    }

    fn top(&self) -> &dyn ElementParser {
        // The root is never popped while stepping.
        self.stack[self.stack.len() - 1].as_ref()
    }

    fn top_mut(&mut self) -> &mut Box<dyn ElementParser> {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Attach the construct stack, plus `opening` if a construct failed in its header.
    fn fail(&self, err: ParseError, opening: Option<&dyn ElementParser>) -> ParseError {
        let mut stack = self.describe_stack();
        let mut innermost = (self.stack.len() > 1).then(|| self.top().start_offset());
        if let Some(parser) = opening {
            stack.push(parser.describe());
            innermost = Some(parser.start_offset());
        }
        let mut err = err.with_stack(stack);
        if err.kind == ErrorKind::StreamExhausted {
            if let Some(start) = innermost {
                err.offset = start;
            }
        }
        err
    }
}
