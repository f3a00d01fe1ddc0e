//! # webidl
//!
//! A parser for the WebIDL subset used to describe native module bindings.
//!
//! The input is read through an incremental source stream by a push-down parser engine, one
//! element parser per construct. Completed constructs fill builders, and a final `build()`
//! freezes them into an immutable [Model](webidl::model::Model) for code generators.
//!
//! ## Testing
//!
//! Unit tests live next to each module. The `tests/` directory holds end-to-end parses,
//! property tests and snapshot tests over complete documents.

pub mod webidl;

pub use webidl::error::{ErrorKind, ParseError, Warning};
pub use webidl::model::Model;
pub use webidl::parsing::{parse, parse_reader, parse_with_config, WebIdlParser};
