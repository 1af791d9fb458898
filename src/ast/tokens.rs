use crate::ast::Scope;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// Real literal, recognised by a `.` or an exponent marker
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// .5
    /// 1e10
    /// ```
    Real(f64),

    /// String literal enclosed in double quotes, escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// "tab\there"
    /// "\101"
    /// ```
    String(String),

    /// Boolean keywords (case-insensitive)
    ///
    /// # Examples
    /// ```text
    /// true
    /// FALSE
    /// ```
    Boolean(bool),

    /// The `undefined` keyword
    Undefined,

    /// The `error` keyword
    Error,

    // Identifiers and References
    /// Attribute or function name
    ///
    /// Either a plain identifier or a single-quoted name.
    ///
    /// # Examples
    /// ```text
    /// Requirements
    /// _internal
    /// 'odd name'
    /// ```
    Identifier(String),

    /// Scoped attribute reference
    ///
    /// The scope keyword is folded case-insensitively, the name keeps its case.
    ///
    /// # Examples
    /// ```text
    /// MY.Cpus
    /// target.Memory
    /// PARENT.Owner
    /// ```
    Scoped(Scope, String),

    // Assignment
    /// Attribute binding inside a record (`=`)
    Assign,

    // Comparison and identity
    /// Equality (`==`)
    EqEq,

    /// Inequality (`!=`)
    NotEq,

    /// Less than (`<`)
    Lt,

    /// Greater than (`>`)
    Gt,

    /// Less than or equal (`<=`)
    LtEq,

    /// Greater than or equal (`>=`)
    GtEq,

    /// Identity (`is` or `=?=`)
    Is,

    /// Non-identity (`isnt` or `=!=`)
    Isnt,

    // Arithmetic
    /// Addition or unary plus
    Plus,

    /// Subtraction or unary minus
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Modulo
    Percent,

    // Bitwise and shifts
    /// Bitwise and (`&`)
    Ampersand,

    /// Bitwise or (`|`)
    Pipe,

    /// Bitwise xor (`^`)
    Caret,

    /// Bitwise complement (`~`)
    Tilde,

    /// Left shift (`<<`)
    Shl,

    /// Arithmetic right shift (`>>`)
    Shr,

    /// Logical right shift (`>>>`)
    UShr,

    // Logical
    /// Logical and (`&&`)
    AndAnd,

    /// Logical or (`||`)
    OrOr,

    /// Logical not (`!`)
    Exclamation,

    // Conditional
    /// Ternary condition marker
    ///
    /// # Examples
    /// ```text
    /// Cpus > 1 ? "multi" : "single"
    /// ```
    Question,

    /// Elvis operator (`?:`)
    ///
    /// # Examples
    /// ```text
    /// Memory ?: 1024
    /// ```
    Elvis,

    /// Colon separating ternary branches
    Colon,

    // Delimiters
    /// Opens a record
    LBracket,

    /// Closes a record or subscript
    RBracket,

    /// Opens a list literal
    LBrace,

    /// Closes a list literal
    RBrace,

    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Attribute selection
    Dot,

    /// Separates list elements and function arguments
    Comma,

    /// Separates record attributes
    Semicolon,

    /// End of input, or end of the current record on a streaming lexer
    Eof,
}
