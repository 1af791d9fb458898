//! Reading concatenated records from a byte stream.

use std::io::Read;

use tracing::debug;

use crate::{
    classad::ClassAd,
    lexer::{Lexer, ReaderSource},
    limits::EvalLimits,
    parser::{ParseError, Parser},
};

/// Drains successive top-level `[...]` records from one stream.
///
/// The reader owns private lookahead state and must be driven by a single
/// consumer. After an error the position in the stream is unspecified; the
/// iterator stops yielding.
///
/// ```
/// use classad::ClassAdReader;
///
/// let mut reader = ClassAdReader::new("[Foo = 1] [Bar = 2]".as_bytes());
/// assert!(reader.next_classad().unwrap().unwrap().contains("Foo"));
/// assert!(reader.next_classad().unwrap().unwrap().contains("Bar"));
/// assert!(reader.next_classad().unwrap().is_none());
/// ```
pub struct ClassAdReader<R: Read> {
    parser: Parser<ReaderSource<R>>,
    records: usize,
    failed: bool,
}

impl<R: Read> ClassAdReader<R> {
    pub fn new(reader: R) -> Self {
        ClassAdReader {
            parser: Parser::unprimed(Lexer::from_reader(reader)),
            records: 0,
            failed: false,
        }
    }

    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.parser = self.parser.with_limits(limits);
        self
    }

    /// Parses the next record, or returns `None` once the stream is
    /// exhausted.
    pub fn next_classad(&mut self) -> Result<Option<ClassAd>, ParseError> {
        self.parser.lexer_mut().resume();
        let record = self.parser.next_record()?;
        match &record {
            Some(ad) => {
                self.records += 1;
                debug!(record = self.records, attributes = ad.len(), "read ClassAd from stream");
            }
            None => debug!(records = self.records, "end of ClassAd stream"),
        }
        Ok(record)
    }
}

impl<R: Read> Iterator for ClassAdReader<R> {
    type Item = Result<ClassAd, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_classad() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
