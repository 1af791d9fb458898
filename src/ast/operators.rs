/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    // Logical
    /// Logical OR (`||`)
    Or,
    /// Logical AND (`&&`)
    And,

    // Bitwise
    /// Bitwise OR (`|`)
    BitOr,
    /// Bitwise XOR (`^`)
    BitXor,
    /// Bitwise AND (`&`)
    BitAnd,

    // Equality and identity
    /// Equal (`==`), coerces Integer/Real
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Identical type and value (`is`, `=?=`)
    Is,
    /// Not identical (`isnt`, `=!=`)
    Isnt,

    // Relational
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,

    // Shifts
    /// Left shift (`<<`)
    ShiftLeft,
    /// Arithmetic right shift (`>>`)
    ShiftRight,
    /// Logical right shift (`>>>`)
    UnsignedShiftRight,

    // Arithmetic
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
}

impl BinOp {
    /// Canonical source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::BitAnd => "&",
            BinOp::Equal => "==",
            BinOp::NotEqual => "!=",
            BinOp::Is => "is",
            BinOp::Isnt => "isnt",
            BinOp::LessThan => "<",
            BinOp::GreaterThan => ">",
            BinOp::LessEqual => "<=",
            BinOp::GreaterEqual => ">=",
            BinOp::ShiftLeft => "<<",
            BinOp::ShiftRight => ">>",
            BinOp::UnsignedShiftRight => ">>>",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
        }
    }

    /// Looks up a comparison operator by its spelling, as used by
    /// `anyCompare`/`allCompare`.
    pub fn comparison_from_str(s: &str) -> Option<BinOp> {
        match s.to_ascii_lowercase().as_str() {
            "<" => Some(BinOp::LessThan),
            "<=" => Some(BinOp::LessEqual),
            ">" => Some(BinOp::GreaterThan),
            ">=" => Some(BinOp::GreaterEqual),
            "==" => Some(BinOp::Equal),
            "!=" => Some(BinOp::NotEqual),
            "is" | "=?=" => Some(BinOp::Is),
            "isnt" | "=!=" => Some(BinOp::Isnt),
            _ => None,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (`-`)
    Minus,
    /// Identity on numbers (`+`)
    Plus,
    /// Logical not (`!`)
    Not,
    /// Bitwise complement (`~`)
    BitNot,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

/// Which record an attribute reference resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Plain name: the owning record, falling back to TARGET inside a match
    Unscoped,
    /// `MY.name`
    My,
    /// `TARGET.name`
    Target,
    /// `PARENT.name`
    Parent,
}

impl Scope {
    /// Folds a scope keyword case-insensitively.
    pub fn from_keyword(word: &str) -> Option<Scope> {
        if word.eq_ignore_ascii_case("my") {
            Some(Scope::My)
        } else if word.eq_ignore_ascii_case("target") {
            Some(Scope::Target)
        } else if word.eq_ignore_ascii_case("parent") {
            Some(Scope::Parent)
        } else {
            None
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Scope::Unscoped => "",
            Scope::My => "MY.",
            Scope::Target => "TARGET.",
            Scope::Parent => "PARENT.",
        }
    }
}
