use std::{mem, sync::Arc};

use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, Token, UnaryOp},
    classad::ClassAd,
    lexer::{CharSource, LexError, Lexer, Position, StrSource},
    limits::EvalLimits,
};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("{message} at {position}")]
    Syntax { message: String, position: Position },

    #[error("expression nests deeper than {limit} levels at {position}")]
    TooDeep { limit: usize, position: Position },

    #[error("expression chains more than {limit} operators at {position}")]
    TooLong { limit: usize, position: Position },

    #[error("expected a bracketed ClassAd")]
    NotAClassAd,

    #[error("expected an expression, found a bracketed ClassAd")]
    NotAnExpression,
}

/// Binary operator denoted by `token`, with its binding level. Higher levels
/// bind tighter; every level is left-associative.
fn binary_op(token: &Token) -> Option<(BinOp, u8)> {
    Some(match token {
        Token::OrOr => (BinOp::Or, 1),
        Token::AndAnd => (BinOp::And, 2),
        Token::Pipe => (BinOp::BitOr, 3),
        Token::Caret => (BinOp::BitXor, 4),
        Token::Ampersand => (BinOp::BitAnd, 5),
        Token::EqEq => (BinOp::Equal, 6),
        Token::NotEq => (BinOp::NotEqual, 6),
        Token::Is => (BinOp::Is, 6),
        Token::Isnt => (BinOp::Isnt, 6),
        Token::Lt => (BinOp::LessThan, 7),
        Token::Gt => (BinOp::GreaterThan, 7),
        Token::LtEq => (BinOp::LessEqual, 7),
        Token::GtEq => (BinOp::GreaterEqual, 7),
        Token::Shl => (BinOp::ShiftLeft, 8),
        Token::Shr => (BinOp::ShiftRight, 8),
        Token::UShr => (BinOp::UnsignedShiftRight, 8),
        Token::Plus => (BinOp::Add, 9),
        Token::Minus => (BinOp::Subtract, 9),
        Token::Star => (BinOp::Multiply, 10),
        Token::Slash => (BinOp::Divide, 10),
        Token::Percent => (BinOp::Modulo, 10),
        _ => return None,
    })
}

/// Recursive-descent parser with precedence climbing for binary operators.
///
/// From loosest to tightest binding:
///
/// | Level | Operators |
/// |---|---|
/// | conditional | `? :`, `?:` (right-associative) |
/// | or | `\|\|` |
/// | and | `&&` |
/// | bitwise | `\|`, then `^`, then `&` |
/// | equality | `==` `!=` `is` `isnt` |
/// | relational | `<` `<=` `>` `>=` |
/// | shift | `<<` `>>` `>>>` |
/// | additive | `+` `-` |
/// | multiplicative | `*` `/` `%` |
/// | unary | `-` `+` `!` `~` |
/// | postfix | `.name`, `[index]` |
///
/// Two budgets bound the work. [`EvalLimits::max_parse_depth`] counts real
/// nesting: every nested expression, unary operator and right operand of a
/// binary operator. A flat chain such as `a || b || c` only grows the tree
/// along its left spine, so its links count against
/// [`EvalLimits::max_chain_links`] instead.
pub struct Parser<S: CharSource = StrSource> {
    lexer: Lexer<S>,
    current_token: Token,
    max_depth: usize,
    max_links: usize,
    depth: usize,
    links: usize,
}

impl<S: CharSource> Parser<S> {
    pub fn new(lexer: Lexer<S>) -> Result<Self, ParseError> {
        let mut parser = Parser::unprimed(lexer);
        parser.advance()?;
        Ok(parser)
    }

    /// A parser that has not read its first token yet.
    pub(crate) fn unprimed(lexer: Lexer<S>) -> Self {
        let limits = EvalLimits::default();
        Parser {
            lexer,
            current_token: Token::Eof,
            max_depth: limits.max_parse_depth,
            max_links: limits.max_chain_links,
            depth: 0,
            links: 0,
        }
    }

    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.max_depth = limits.max_parse_depth;
        self.max_links = limits.max_chain_links;
        self
    }

    pub(crate) fn lexer_mut(&mut self) -> &mut Lexer<S> {
        &mut self.lexer
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(what));
        }
        self.advance()
    }

    fn unexpected(&self, what: &str) -> ParseError {
        let found = match &self.current_token {
            Token::Eof => "end of input".to_string(),
            token => format!("{token:?}"),
        };
        ParseError::Syntax {
            message: format!("expected {what}, found {found}"),
            position: self.lexer.position(),
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                position: self.lexer.position(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn link(&mut self) -> Result<(), ParseError> {
        if self.links >= self.max_links {
            return Err(ParseError::TooLong {
                limit: self.max_links,
                position: self.lexer.position(),
            });
        }
        self.links += 1;
        Ok(())
    }

    fn unlink(&mut self, links: usize) {
        self.links = self.links.saturating_sub(links);
    }

    fn reset(&mut self) {
        self.depth = 0;
        self.links = 0;
    }

    /// Parses one complete expression followed by end of input.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        self.reset();
        let expr = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected("end of input"));
        }
        Ok(expr)
    }

    /// Reads the next top-level record of a stream, or `None` at end of
    /// input.
    pub(crate) fn next_record(&mut self) -> Result<Option<ClassAd>, ParseError> {
        self.reset();
        self.advance()?;
        match self.current_token {
            Token::Eof => Ok(None),
            Token::LBracket => {
                self.advance()?;
                self.parse_record_body().map(Some)
            }
            _ => Err(self.unexpected("'['")),
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let expr = self
            .parse_binary(0)
            .and_then(|condition| self.parse_conditional(condition));
        self.leave();
        expr
    }

    /// `? :` or `?:` after `condition`. Both branches are full expressions,
    /// which makes the operators right-associative.
    fn parse_conditional(&mut self, condition: Expr) -> Result<Expr, ParseError> {
        if self.check(&Token::Question) {
            self.advance()?;
            let then_branch = self.parse_expression()?;
            self.expect(Token::Colon, "':'")?;
            let else_branch = self.parse_expression()?;
            Ok(Expr::Conditional {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            })
        } else if self.check(&Token::Elvis) {
            self.advance()?;
            let right = self.parse_expression()?;
            Ok(Expr::Elvis {
                left: Box::new(condition),
                right: Box::new(right),
            })
        } else {
            Ok(condition)
        }
    }

    /// Left-associative operators binding at `min_level` or tighter.
    ///
    /// Each right operand recurses one level up the table, so recursion is
    /// bounded by the number of levels while a chain at one level loops.
    fn parse_binary(&mut self, min_level: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        let mut links = 0;

        let result = loop {
            let Some((op, level)) = binary_op(&self.current_token).filter(|&(_, level)| level >= min_level)
            else {
                break Ok(left);
            };
            if let Err(e) = self.advance().and_then(|_| self.link()) {
                break Err(e);
            }
            links += 1;
            if let Err(e) = self.enter() {
                break Err(e);
            }
            let right = self.parse_binary(level + 1);
            self.leave();
            match right {
                Ok(right) => left = Expr::binary(op, left, right),
                Err(e) => break Err(e),
            }
        };
        self.unlink(links);
        result
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current_token {
            Token::Minus => UnaryOp::Minus,
            Token::Plus => UnaryOp::Plus,
            Token::Exclamation => UnaryOp::Not,
            Token::Tilde => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };
        self.advance()?;
        self.enter()?;
        let operand = self.parse_unary();
        self.leave();
        Ok(Expr::unary(op, operand?))
    }

    /// Parse selection and subscript chains
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        let mut links = 0;

        let result = loop {
            let select = self.check(&Token::Dot);
            if !select && !self.check(&Token::LBracket) {
                break Ok(expr);
            }
            if let Err(e) = self.link() {
                break Err(e);
            }
            links += 1;
            let step = if select {
                self.parse_select(expr)
            } else {
                self.parse_subscript(expr)
            };
            match step {
                Ok(e) => expr = e,
                Err(e) => break Err(e),
            }
        };
        self.unlink(links);
        result
    }

    fn parse_select(&mut self, record: Expr) -> Result<Expr, ParseError> {
        self.advance()?; // consume '.'
        let Token::Identifier(attr) = mem::replace(&mut self.current_token, Token::Eof) else {
            return Err(ParseError::Syntax {
                message: "expected attribute name after '.'".to_string(),
                position: self.lexer.position(),
            });
        };
        self.advance()?;
        Ok(Expr::Select {
            record: Box::new(record),
            attr,
        })
    }

    fn parse_subscript(&mut self, container: Expr) -> Result<Expr, ParseError> {
        self.advance()?; // consume '['
        let index = self.parse_expression()?;
        self.expect(Token::RBracket, "']'")?;
        Ok(Expr::Subscript {
            container: Box::new(container),
            index: Box::new(index),
        })
    }

    /// Parse primary expressions (atoms): literals, references, calls,
    /// parenthesized expressions, lists and records
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let expr = match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Integer(n) => Expr::Integer(n),
            Token::Real(n) => Expr::Real(n),
            Token::String(s) => Expr::String(s),
            Token::Boolean(b) => Expr::Boolean(b),
            Token::Undefined => Expr::Undefined,
            Token::Error => Expr::Error,

            // References
            Token::Scoped(scope, name) => Expr::Attribute { scope, name },
            Token::Identifier(name) => {
                self.advance()?;
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_sequence(Token::RParen, "')'")?;
                    return Ok(Expr::FunctionCall { name, args });
                }
                return Ok(Expr::attribute(name));
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen, "')'")?;
                return Ok(expr);
            }
            Token::LBrace => {
                self.advance()?;
                let items = self.parse_sequence(Token::RBrace, "'}'")?;
                return Ok(Expr::List(items));
            }
            Token::LBracket => {
                self.advance()?;
                let ad = self.parse_record_body()?;
                return Ok(Expr::Record(Arc::new(ad)));
            }

            token => {
                self.current_token = token;
                return Err(self.unexpected("an expression"));
            }
        };
        self.advance()?;
        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_sequence(&mut self, close: Token, what: &str) -> Result<Vec<Expr>, ParseError> {
        let mut items = vec![];

        if self.check(&close) {
            self.advance()?;
            return Ok(items);
        }
        loop {
            items.push(self.parse_expression()?);
            if self.check(&Token::Comma) {
                self.advance()?;
            } else {
                self.expect(close, what)?;
                return Ok(items);
            }
        }
    }

    /// `name = expr (; name = expr)* ;? ]`, the opening bracket already
    /// consumed.
    fn parse_record_body(&mut self) -> Result<ClassAd, ParseError> {
        let mut ad = ClassAd::new();

        while !self.check(&Token::RBracket) {
            let Token::Identifier(name) = mem::replace(&mut self.current_token, Token::Eof) else {
                return Err(ParseError::Syntax {
                    message: "expected attribute name".to_string(),
                    position: self.lexer.position(),
                });
            };
            self.advance()?;
            self.expect(Token::Assign, "'='")?;
            let value = self.parse_expression()?;
            ad.insert(name, value);

            if self.check(&Token::Semicolon) {
                self.advance()?;
            } else if !self.check(&Token::RBracket) {
                return Err(self.unexpected("';' or ']'"));
            }
        }

        self.advance()?; // consume ']'
        Ok(ad)
    }
}

/// Parses any expression, bracketed records included.
///
/// ```
/// use classad::{parse, Expr};
///
/// assert_eq!(parse("42").unwrap(), Expr::Integer(42));
/// assert!(parse("1 +").is_err());
/// ```
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(input))?.parse()
}

/// Parses `input` with custom depth limits.
pub fn parse_with_limits(input: &str, limits: EvalLimits) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(input))?.with_limits(limits).parse()
}

/// Parses a bracketed record.
pub fn parse_classad(input: &str) -> Result<ClassAd, ParseError> {
    match parse(input)? {
        Expr::Record(ad) => Ok(Arc::unwrap_or_clone(ad)),
        _ => Err(ParseError::NotAClassAd),
    }
}

/// Parses an expression that is not itself a bracketed record.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    let expr = parse(input)?;
    if expr.is_record() {
        return Err(ParseError::NotAnExpression);
    }
    Ok(expr)
}
