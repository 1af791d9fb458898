//! Character sources feeding the lexer.
//!
//! Both sources expose the same small window: the current character plus a
//! couple of characters of lookahead. Failures of the underlying stream are
//! parked in the source and surfaced by the lexer after the token in flight.

use std::{
    collections::VecDeque,
    io::{self, BufReader, Bytes, Read},
};

/// Failure of the byte stream behind a [`ReaderSource`].
#[derive(Debug)]
pub enum SourceError {
    Io(io::Error),
    InvalidEncoding,
}

/// A stream of characters with bounded lookahead.
pub trait CharSource {
    /// Character `offset` positions ahead of the cursor, without consuming.
    fn peek(&mut self, offset: usize) -> Option<char>;

    /// Consumes and returns the character under the cursor.
    fn next_char(&mut self) -> Option<char>;

    /// Text from the cursor to the end of the current line, when it can be
    /// produced without consuming input.
    fn rest_of_line(&mut self) -> String {
        String::new()
    }

    /// Takes the parked stream failure, if any.
    fn take_error(&mut self) -> Option<SourceError> {
        None
    }
}

/// Random-access source over a fully materialized string.
pub struct StrSource {
    input: Vec<char>,
    position: usize,
}

impl StrSource {
    pub fn new(input: &str) -> Self {
        StrSource {
            input: input.chars().collect(),
            position: 0,
        }
    }
}

impl CharSource for StrSource {
    fn peek(&mut self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if ch.is_some() {
            self.position += 1;
        }
        ch
    }

    fn rest_of_line(&mut self) -> String {
        self.input[self.position..]
            .iter()
            .take_while(|&&c| c != '\n')
            .collect()
    }
}

/// Streaming source decoding UTF-8 from any reader.
///
/// After the first I/O or encoding failure the source behaves as exhausted;
/// the failure is handed out once through [`CharSource::take_error`].
pub struct ReaderSource<R: Read> {
    bytes: Bytes<BufReader<R>>,
    lookahead: VecDeque<char>,
    error: Option<SourceError>,
    exhausted: bool,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource {
            bytes: BufReader::new(reader).bytes(),
            lookahead: VecDeque::new(),
            error: None,
            exhausted: false,
        }
    }

    fn next_byte(&mut self) -> Option<u8> {
        match self.bytes.next() {
            Some(Ok(b)) => Some(b),
            Some(Err(e)) => {
                self.fail(SourceError::Io(e));
                None
            }
            None => None,
        }
    }

    fn fail(&mut self, error: SourceError) {
        self.exhausted = true;
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn decode(&mut self) -> Option<char> {
        if self.exhausted {
            return None;
        }
        let Some(first) = self.next_byte() else {
            self.exhausted = true;
            return None;
        };
        let width = match first {
            0x00..=0x7f => return Some(first as char),
            0xc2..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf4 => 4,
            _ => {
                self.fail(SourceError::InvalidEncoding);
                return None;
            }
        };
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            match self.next_byte() {
                Some(b) => *slot = b,
                None => {
                    self.fail(SourceError::InvalidEncoding);
                    return None;
                }
            }
        }
        match std::str::from_utf8(&buf[..width]) {
            Ok(s) => s.chars().next(),
            Err(_) => {
                self.fail(SourceError::InvalidEncoding);
                None
            }
        }
    }

    fn fill(&mut self, len: usize) {
        while self.lookahead.len() < len {
            match self.decode() {
                Some(c) => self.lookahead.push_back(c),
                None => break,
            }
        }
    }
}

impl<R: Read> CharSource for ReaderSource<R> {
    fn peek(&mut self, offset: usize) -> Option<char> {
        self.fill(offset + 1);
        self.lookahead.get(offset).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        self.fill(1);
        self.lookahead.pop_front()
    }

    fn take_error(&mut self) -> Option<SourceError> {
        self.error.take()
    }
}
