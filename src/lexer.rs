pub mod source;

use std::{fmt, io::Read};

use thiserror::Error;

use crate::ast::{Scope, Token};
pub use source::{CharSource, ReaderSource, SourceError, StrSource};

/// 1-based line and column of a character in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// What went wrong while scanning.
#[derive(Debug, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("string contains an embedded NUL")]
    NulInString,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("integer literal '{0}' overflows a 64-bit signed integer")]
    IntegerOverflow(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("input is not valid UTF-8")]
    InvalidEncoding,
    #[error("read failed: {0}")]
    Io(#[source] std::io::Error),
}

/// A positioned lexical error carrying the offending source line.
#[derive(Debug)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
    pub line: String,
}

impl LexError {
    /// The offending line followed by a caret under the error column.
    pub fn excerpt(&self) -> String {
        let pad: String = self
            .line
            .chars()
            .take(self.position.column.saturating_sub(1))
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        format!("  {}\n  {}^", self.line, pad)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}\n{}", self.kind, self.position, self.excerpt())
    }
}

impl std::error::Error for LexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<SourceError> for LexErrorKind {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Io(e) => LexErrorKind::Io(e),
            SourceError::InvalidEncoding => LexErrorKind::InvalidEncoding,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Converts characters into tokens.
///
/// `Lexer::new` scans a string; `Lexer::from_reader` scans a byte stream and
/// reports `Eof` as soon as the first top-level `[...]` closes, so successive
/// records can be drained from one stream (see [`Lexer::resume`]).
pub struct Lexer<S: CharSource = StrSource> {
    source: S,
    line: usize,
    column: usize,
    line_buf: String,
    token_start: Position,
    depth: usize,
    stop_at_record_end: bool,
    record_closed: bool,
}

impl Lexer<StrSource> {
    pub fn new(input: &str) -> Self {
        Lexer::with_source(StrSource::new(input), false)
    }
}

impl<R: Read> Lexer<ReaderSource<R>> {
    pub fn from_reader(reader: R) -> Self {
        Lexer::with_source(ReaderSource::new(reader), true)
    }
}

impl<S: CharSource> Lexer<S> {
    fn with_source(source: S, stop_at_record_end: bool) -> Self {
        Lexer {
            source,
            line: 1,
            column: 1,
            line_buf: String::new(),
            token_start: Position::default(),
            depth: 0,
            stop_at_record_end,
            record_closed: false,
        }
    }

    /// Start position of the token returned last.
    pub fn position(&self) -> Position {
        self.token_start
    }

    /// Current bracket nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Continues past a logical end-of-record.
    pub fn resume(&mut self) {
        self.record_closed = false;
    }

    fn current_char(&mut self) -> Option<char> {
        self.source.peek(0)
    }

    fn peek_char(&mut self, offset: usize) -> Option<char> {
        self.source.peek(offset)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.source.next_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
                self.line_buf.clear();
            } else {
                self.column += 1;
                self.line_buf.push(ch);
            }
        }
    }

    fn here(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn error_at(&mut self, kind: LexErrorKind, position: Position) -> LexError {
        let mut line = self.line_buf.clone();
        line.push_str(&self.source.rest_of_line());
        LexError {
            kind,
            position,
            line,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.current_char() {
                Some(ch) if ch.is_whitespace() => self.advance(),
                Some('/') if self.peek_char(1) == Some('/') => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_char(1) == Some('*') => {
                    let start = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_char() {
                            None => {
                                return Err(
                                    self.error_at(LexErrorKind::UnterminatedComment, start)
                                );
                            }
                            Some('*') if self.peek_char(1) == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if is_ident_char(ch) {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let mut result = String::new();
        self.advance(); // Consume opening quote

        loop {
            match self.current_char() {
                None => {
                    let here = self.here();
                    return Err(self.error_at(LexErrorKind::UnterminatedString, here));
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    let escape_at = self.here();
                    self.advance(); // Consume backslash
                    let decoded = match self.current_char() {
                        Some('b') => '\u{8}',
                        Some('t') => '\t',
                        Some('n') => '\n',
                        Some('f') => '\u{c}',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some(d @ '0'..='7') => {
                            let decoded = self.read_octal_escape(d, escape_at)?;
                            result.push(decoded);
                            continue;
                        }
                        Some(other) => {
                            return Err(self.error_at(LexErrorKind::InvalidEscape(other), escape_at));
                        }
                        None => {
                            let here = self.here();
                            return Err(self.error_at(LexErrorKind::UnterminatedString, here));
                        }
                    };
                    result.push(decoded);
                    self.advance();
                }
                Some('\0') => {
                    let here = self.here();
                    return Err(self.error_at(LexErrorKind::NulInString, here));
                }
                Some(ch) => {
                    result.push(ch);
                    self.advance();
                }
            }
        }
    }

    /// Decodes `\NNN`. A leading 0-3 admits three octal digits, 4-7 admits two.
    fn read_octal_escape_value(&mut self, first: char) -> u32 {
        let max_digits = if first <= '3' { 3 } else { 2 };
        let mut value = 0u32;
        for _ in 0..max_digits {
            match self.current_char() {
                Some(d @ '0'..='7') => {
                    value = value * 8 + (d as u32 - '0' as u32);
                    self.advance();
                }
                _ => break,
            }
        }
        value
    }

    fn read_octal_escape(&mut self, first: char, escape_at: Position) -> Result<char, LexError> {
        let value = self.read_octal_escape_value(first);
        if value == 0 {
            return Err(self.error_at(LexErrorKind::NulInString, escape_at));
        }
        // Values stop at 0o377, which all map onto Latin-1 code points.
        char::from_u32(value).ok_or_else(|| self.error_at(LexErrorKind::InvalidEscape(first), escape_at))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.token_start;
        let mut number = String::new();
        let mut is_real = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_real
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_real = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(e @ ('e' | 'E')) = self.current_char() {
            let signed = matches!(self.peek_char(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_char(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_real = true;
                number.push(e);
                self.advance();
                if signed && let Some(sign) = self.current_char() {
                    number.push(sign);
                    self.advance();
                }
                while let Some(ch) = self.current_char() {
                    if !ch.is_ascii_digit() {
                        break;
                    }
                    number.push(ch);
                    self.advance();
                }
            }
        }

        if is_real {
            number
                .parse::<f64>()
                .map(Token::Real)
                .map_err(|_| self.error_at(LexErrorKind::InvalidNumber(number.clone()), start))
        } else {
            number
                .parse::<i64>()
                .map(Token::Integer)
                .map_err(|_| self.error_at(LexErrorKind::IntegerOverflow(number.clone()), start))
        }
    }

    fn read_word(&mut self) -> Result<Token, LexError> {
        let ident = self.read_identifier();

        if let Some(scope) = Scope::from_keyword(&ident)
            && self.current_char() == Some('.')
        {
            match self.peek_char(1) {
                Some(c) if is_ident_start(c) => {
                    self.advance(); // Consume '.'
                    let name = self.read_identifier();
                    return Ok(Token::Scoped(scope, name));
                }
                Some('\'') => {
                    self.advance();
                    let name = self.read_string('\'')?;
                    return Ok(Token::Scoped(scope, name));
                }
                _ => {}
            }
        }

        Ok(match ident.to_ascii_lowercase().as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "undefined" => Token::Undefined,
            "error" => Token::Error,
            "is" => Token::Is,
            "isnt" => Token::Isnt,
            _ => Token::Identifier(ident),
        })
    }

    /// Consumes `len` characters and yields `token`.
    fn emit(&mut self, len: usize, token: Token) -> Token {
        for _ in 0..len {
            self.advance();
        }
        token
    }

    fn scan_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;
        self.token_start = self.here();

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };
        let next = self.peek_char(1);

        let token = match ch {
            '[' => {
                self.depth += 1;
                self.emit(1, Token::LBracket)
            }
            ']' => {
                self.depth = self.depth.saturating_sub(1);
                if self.depth == 0 && self.stop_at_record_end {
                    self.record_closed = true;
                }
                self.emit(1, Token::RBracket)
            }
            '{' => self.emit(1, Token::LBrace),
            '}' => self.emit(1, Token::RBrace),
            '(' => self.emit(1, Token::LParen),
            ')' => self.emit(1, Token::RParen),
            ',' => self.emit(1, Token::Comma),
            ';' => self.emit(1, Token::Semicolon),
            ':' => self.emit(1, Token::Colon),
            '+' => self.emit(1, Token::Plus),
            '-' => self.emit(1, Token::Minus),
            '*' => self.emit(1, Token::Star),
            '/' => self.emit(1, Token::Slash),
            '%' => self.emit(1, Token::Percent),
            '^' => self.emit(1, Token::Caret),
            '~' => self.emit(1, Token::Tilde),
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => self.read_number()?,
            '.' => self.emit(1, Token::Dot),
            '?' if next == Some(':') => self.emit(2, Token::Elvis),
            '?' => self.emit(1, Token::Question),
            '=' => match (next, self.peek_char(2)) {
                (Some('='), _) => self.emit(2, Token::EqEq),
                (Some('?'), Some('=')) => self.emit(3, Token::Is),
                (Some('!'), Some('=')) => self.emit(3, Token::Isnt),
                _ => self.emit(1, Token::Assign),
            },
            '!' if next == Some('=') => self.emit(2, Token::NotEq),
            '!' => self.emit(1, Token::Exclamation),
            '<' if next == Some('=') => self.emit(2, Token::LtEq),
            '<' if next == Some('<') => self.emit(2, Token::Shl),
            '<' => self.emit(1, Token::Lt),
            '>' if next == Some('=') => self.emit(2, Token::GtEq),
            '>' if next == Some('>') => {
                if self.peek_char(2) == Some('>') {
                    self.emit(3, Token::UShr)
                } else {
                    self.emit(2, Token::Shr)
                }
            }
            '>' => self.emit(1, Token::Gt),
            '&' if next == Some('&') => self.emit(2, Token::AndAnd),
            '&' => self.emit(1, Token::Ampersand),
            '|' if next == Some('|') => self.emit(2, Token::OrOr),
            '|' => self.emit(1, Token::Pipe),
            '"' => Token::String(self.read_string('"')?),
            '\'' => Token::Identifier(self.read_string('\'')?),
            c if c.is_ascii_digit() => self.read_number()?,
            c if is_ident_start(c) => self.read_word()?,
            c => {
                let here = self.here();
                return Err(self.error_at(LexErrorKind::UnexpectedChar(c), here));
            }
        };
        Ok(token)
    }

    /// Returns the next token, or `Eof` at the end of input (or, on a
    /// streaming lexer, at the end of the current top-level record).
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.record_closed {
            return Ok(Token::Eof);
        }
        let result = self.scan_token();
        // A closed record is complete. A stream failure found while peeking
        // past its bracket stays parked for the next call.
        if self.record_closed {
            return result;
        }
        if let Some(failure) = self.source.take_error() {
            let here = self.here();
            return Err(self.error_at(failure.into(), here));
        }
        result
    }
}
