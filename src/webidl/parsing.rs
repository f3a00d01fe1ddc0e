//! Parsing
//!
//!     Entry points that turn interface-description text into a [Model].
//!
//!         - [parse]: a complete `&str`, the common case.
//!         - [WebIdlParser]: a push parser. Feed chunks as they arrive, then `finish()`.
//!         - [parse_reader]: drives a push parser from a `tokio` reader. Chunks may split
//!           UTF-8 sequences; the incomplete tail is carried into the next read.
//!
//!     All three share one pipeline: a [SourceStream] feeds the grammar [Engine], whose root
//!     collects a [ModelBuilder](crate::webidl::model::ModelBuilder), which `build()` freezes
//!     into the model. The first error is final: a failed parser keeps reporting it.
//!
//! Modules
//!
//!     - [grammar]: construct kinds, lookahead predicates, admissible children.
//!     - [engine]: the parser stack.
//!     - [elements]: one parser per construct kind.

pub mod elements;
pub mod engine;
pub mod grammar;

use crate::webidl::config::ParserConfig;
use crate::webidl::error::{ErrorKind, ParseError};
use crate::webidl::model::Model;
use crate::webidl::stream::{Read, SourceStream};
use engine::Engine;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

/// Parse a complete document with the default configuration.
pub fn parse(source: &str) -> Result<Model, ParseError> {
    parse_with_config(source, &ParserConfig::default())
}

pub fn parse_with_config(source: &str, config: &ParserConfig) -> Result<Model, ParseError> {
    let mut parser = WebIdlParser::with_config(config.clone());
    parser.feed(source)?;
    parser.finish()
}

/// Incremental parser over chunked input.
#[derive(Debug)]
pub struct WebIdlParser {
    stream: SourceStream,
    engine: Engine,
    config: ParserConfig,
    failure: Option<ParseError>,
}

impl WebIdlParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            stream: SourceStream::new(),
            engine: Engine::new(&config.parsing.package_marker),
            config,
            failure: None,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Absolute offset up to which the input has been parsed.
    pub fn offset(&self) -> usize {
        self.stream.offset()
    }

    /// Append a chunk and parse as far as it allows.
    pub fn feed(&mut self, chunk: &str) -> Result<(), ParseError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.stream.push_str(chunk);
        self.drive()?;
        self.stream.compact();
        Ok(())
    }

    /// Close the input, parse the rest and build the model.
    pub fn finish(mut self) -> Result<Model, ParseError> {
        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        self.stream.close();
        if let Read::NeedMore = self.drive()? {
            return Err(ParseError::stream_exhausted(
                self.stream.offset(),
                "parser asked for input after the end of input",
            ));
        }
        debug!(bytes = self.stream.offset(), "input parsed");
        let builder = self.engine.into_model_builder()?;
        builder.build_with(&self.config.model)
    }

    fn drive(&mut self) -> Result<Read<()>, ParseError> {
        let progress = self.engine.run(&mut self.stream);
        if let Err(err) = &progress {
            self.failure = Some(err.clone());
        }
        progress
    }
}

impl Default for WebIdlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a whole document from `reader` and parse it.
pub async fn parse_reader<R>(mut reader: R, config: ParserConfig) -> Result<Model, ParseError>
where
    R: AsyncRead + Unpin,
{
    let chunk_size = config.parsing.read_chunk_size.max(1);
    let mut parser = WebIdlParser::with_config(config);
    let mut chunk = vec![0u8; chunk_size];
    let mut pending: Vec<u8> = Vec::new();
    let mut received = 0usize;

    loop {
        let read = reader.read(&mut chunk).await.map_err(|err| {
            ParseError::new(ErrorKind::Input, received, format!("read failed: {}", err))
        })?;
        if read == 0 {
            break;
        }
        received += read;
        pending.extend_from_slice(&chunk[..read]);

        let valid = match std::str::from_utf8(&pending) {
            Ok(text) => text.len(),
            // An incomplete sequence at the end of the chunk; the rest of it is still to come.
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => {
                let offset = received - pending.len() + err.valid_up_to();
                return Err(ParseError::new(ErrorKind::Input, offset, "invalid UTF-8"));
            }
        };
        let text = std::str::from_utf8(&pending[..valid]).map_err(|err| {
            ParseError::new(ErrorKind::Input, received, format!("invalid UTF-8: {}", err))
        })?;
        parser.feed(text)?;
        pending.drain(..valid);
    }

    if !pending.is_empty() {
        return Err(ParseError::new(
            ErrorKind::Input,
            received - pending.len(),
            "input ends inside a UTF-8 sequence",
        ));
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "interface Base {\n};\n\ninterface Foo : Base {\n    void bar(long x);\n};\n";

    #[test]
    fn test_feed_in_small_chunks() {
        let mut parser = WebIdlParser::new();
        for chunk in SOURCE.as_bytes().chunks(3) {
            parser.feed(std::str::from_utf8(chunk).unwrap()).unwrap();
        }
        let model = parser.finish().unwrap();
        assert_eq!(model, parse(SOURCE).unwrap());
    }

    #[test]
    fn test_failure_is_sticky() {
        let mut parser = WebIdlParser::new();
        let first = parser.feed("interface Foo { ??? ;").unwrap_err();
        let second = parser.feed("};").unwrap_err();
        assert_eq!(first, second);
        assert_eq!(parser.finish().unwrap_err(), first);
    }

    #[tokio::test]
    async fn test_reader_splits_multibyte_characters() {
        let source = "// [package=géométrie]\ninterface Foo {\n};\n";
        let config = crate::webidl::config::Loader::new()
            .set_override("parsing.read_chunk_size", 5i64)
            .unwrap()
            .build()
            .unwrap();
        let model = parse_reader(source.as_bytes(), config).await.unwrap();
        assert_eq!(model.interfaces()[0].source_package, "géométrie");
    }

    #[tokio::test]
    async fn test_reader_rejects_invalid_utf8() {
        let bytes: &[u8] = b"interface \xff {};";
        let err = parse_reader(bytes, ParserConfig::default()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Input);
        assert_eq!(err.offset, 10);
    }
}
