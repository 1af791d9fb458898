use std::sync::Arc;

use crate::{
    ast::{BinOp, Scope, UnaryOp},
    classad::ClassAd,
};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Nodes are immutable once built. Nested record literals are shared behind
/// an `Arc` so evaluating one into a `Value` does not copy the subtree.
/// `Display` renders canonical, reparsable text.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal integer
    ///
    /// # Example
    /// ```text
    /// 42
    /// ```
    Integer(i64),

    /// Literal real
    ///
    /// # Example
    /// ```text
    /// 42.0
    /// ```
    Real(f64),

    /// String literal
    ///
    /// # Example
    /// ```text
    /// "hello"
    /// ```
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// The `undefined` literal
    Undefined,

    /// The `error` literal
    Error,

    // References
    /// Attribute reference, optionally scoped
    ///
    /// # Examples
    /// ```text
    /// Memory          // Attribute { scope: Unscoped, name: "Memory" }
    /// TARGET.Memory   // Attribute { scope: Target, name: "Memory" }
    /// ```
    Attribute { scope: Scope, name: String },

    // Operations
    /// Binary operation (arithmetic, comparison, logical, bitwise)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation
    ///
    /// # Examples
    /// ```text
    /// -Cpus
    /// !IsBusy
    /// ```
    UnaryOp { op: UnaryOp, operand: Box<Expr> },

    /// Ternary conditional
    ///
    /// # Example
    /// ```text
    /// Cpus > 1 ? "multi" : "single"
    /// ```
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Elvis: the left value unless it is Undefined
    ///
    /// # Example
    /// ```text
    /// Memory ?: 1024
    /// ```
    Elvis { left: Box<Expr>, right: Box<Expr> },

    // Access
    /// Attribute selection on a record value
    ///
    /// # Examples
    /// ```text
    /// Machine.Arch
    /// [a = 1].a
    /// ```
    Select { record: Box<Expr>, attr: String },

    /// Subscript into a list (Integer) or record (String)
    ///
    /// # Examples
    /// ```text
    /// Slots[0]
    /// Machine["Arch"]
    /// ```
    Subscript {
        container: Box<Expr>,
        index: Box<Expr>,
    },

    /// Built-in function call
    ///
    /// # Examples
    /// ```text
    /// strcat("a", "b")
    /// member(Owner, Allowed)
    /// ```
    FunctionCall { name: String, args: Vec<Expr> },

    // Composite literals
    /// List literal
    ///
    /// # Example
    /// ```text
    /// {1, "two", [a = 3]}
    /// ```
    List(Vec<Expr>),

    /// Nested record literal
    ///
    /// # Example
    /// ```text
    /// [Arch = "X86_64"; Cpus = 8]
    /// ```
    Record(Arc<ClassAd>),
}

impl Expr {
    pub fn attribute(name: impl Into<String>) -> Self {
        Expr::Attribute {
            scope: Scope::Unscoped,
            name: name.into(),
        }
    }

    pub fn scoped(scope: Scope, name: impl Into<String>) -> Self {
        Expr::Attribute {
            scope,
            name: name.into(),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// True for a bracketed record at the top of the tree.
    pub fn is_record(&self) -> bool {
        matches!(self, Expr::Record(_))
    }
}
