use std::sync::Arc;

use crate::{ast::Expr, classad::ClassAd};

/// The runtime result of evaluating a ClassAd expression.
///
/// Values are produced fresh by every evaluation and never alias the
/// mutable state of a record. Record values share the immutable nested
/// record they were produced from.
///
/// # Undefined and Error
///
/// `Undefined` means "no value available" (typically a missing attribute);
/// `Error` means "evaluation failed". Both absorb through most operators,
/// Error taking precedence when both meet.
///
/// # Examples
///
/// ```
/// use classad::Value;
///
/// let integer = Value::Integer(42);
/// let real = Value::Real(3.14);
/// let string = Value::String("hello".to_string());
/// let list = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
///
/// assert_eq!(integer.type_name(), "integer");
/// assert!(Value::Undefined.is_absorbing());
/// assert_eq!(list.to_string(), "{1, 2}");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value available
    Undefined,

    /// Evaluation failed
    Error,

    /// Boolean (true/false)
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// Double-precision real
    Real(f64),

    /// UTF-8 string
    String(String),

    /// Ordered list of values (heterogeneous)
    List(Vec<Value>),

    /// A record
    ClassAd(Arc<ClassAd>),
}

impl Value {
    /// Human-readable type name, as used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Error => "error",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::ClassAd(_) => "classad",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }

    /// Undefined or Error.
    pub fn is_absorbing(&self) -> bool {
        matches!(self, Value::Undefined | Value::Error)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer or Real, widened to `f64`.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_classad(&self) -> Option<&ClassAd> {
        match self {
            Value::ClassAd(ad) => Some(ad),
            _ => None,
        }
    }

    /// Identity as tested by `is`: same runtime type and same value, with no
    /// numeric coercion and case-sensitive strings.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Error, Value::Error) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_identical(y))
            }
            (Value::ClassAd(a), Value::ClassAd(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }

    /// Literal expression denoting this value.
    pub fn to_expr(&self) -> Expr {
        match self {
            Value::Undefined => Expr::Undefined,
            Value::Error => Expr::Error,
            Value::Boolean(b) => Expr::Boolean(*b),
            Value::Integer(n) => Expr::Integer(*n),
            Value::Real(n) => Expr::Real(*n),
            Value::String(s) => Expr::String(s.clone()),
            Value::List(items) => Expr::List(items.iter().map(Value::to_expr).collect()),
            Value::ClassAd(ad) => Expr::Record(Arc::clone(ad)),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Real(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
