mod builtins;
pub mod operations;

use std::{collections::HashSet, sync::Arc};

use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{BinOp, Expr, Scope},
    classad::ClassAd,
    limits::EvalLimits,
    parser::{self, ParseError},
    value::Value,
};

/// Parser used by the `eval()` built-in to turn text back into an expression.
pub type ExprParser = fn(&str) -> Result<Expr, ParseError>;

/// Why an expression evaluated to `error`.
///
/// These never escape evaluation: every node converts them into
/// [`Value::Error`], logging the reason at `debug` level.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Type mismatch or invalid operation for the given type
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: &'static str,
        got: usize,
    },

    #[error("{name}(): {message}")]
    BadArgument { name: String, message: String },

    /// An attribute's value depends on itself
    #[error("cyclic reference to attribute '{0}'")]
    CyclicReference(String),

    #[error("evaluation nests deeper than {0} levels")]
    DepthExceeded(usize),

    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),

    /// `eval()` was handed text that does not parse
    #[error("eval() could not parse its argument: {0}")]
    Reparse(String),
}

/// The records an expression is evaluated against.
///
/// `my` owns the expression being evaluated. `target` is the record on the
/// other side of a match, if any; `parent` is the context of the record a
/// nested record was selected from. All three are borrowed: binding a record
/// never extends its lifetime.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub my: &'a ClassAd,
    pub target: Option<&'a ClassAd>,
    pub parent: Option<&'a EvalContext<'a>>,
}

impl<'a> EvalContext<'a> {
    pub fn new(my: &'a ClassAd) -> Self {
        EvalContext {
            my,
            target: None,
            parent: None,
        }
    }

    /// Context for `my` while it is matched against `target`.
    pub fn with_target(my: &'a ClassAd, target: &'a ClassAd) -> Self {
        EvalContext {
            my,
            target: Some(target),
            parent: None,
        }
    }

    /// The same match seen from the other side.
    fn flipped(&self) -> Option<EvalContext<'a>> {
        self.target.map(|target| EvalContext::with_target(target, self.my))
    }
}

/// Walks expressions against an [`EvalContext`], producing [`Value`]s.
///
/// An evaluator carries the bookkeeping of one evaluation: the nesting
/// depth and the set of attributes currently being resolved. Both unwind as
/// evaluation returns, so one evaluator may be reused for many calls.
///
/// # Examples
///
/// ```
/// use classad::{ClassAd, EvalContext, Evaluator, Value, parse};
///
/// let ad: ClassAd = "[Cpus = 4]".parse().unwrap();
/// let expr = parse("Cpus * 2 >= 8").unwrap();
///
/// let mut evaluator = Evaluator::new();
/// let result = evaluator.evaluate(&expr, &EvalContext::new(&ad));
/// assert_eq!(result, Value::Boolean(true));
/// ```
#[derive(Debug)]
pub struct Evaluator {
    limits: EvalLimits,
    depth: usize,
    /// (record address, attribute name) pairs under resolution
    visited: HashSet<(usize, String)>,
    parser: ExprParser,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator {
            limits: EvalLimits::default(),
            depth: 0,
            visited: HashSet::new(),
            parser: parser::parse,
        }
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Replaces the parser behind `eval()`.
    pub fn with_parser(mut self, parser: ExprParser) -> Self {
        self.parser = parser;
        self
    }

    /// Evaluates a free-standing expression.
    pub fn evaluate(&mut self, expr: &Expr, ctx: &EvalContext<'_>) -> Value {
        self.eval_expr(expr, ctx)
    }

    /// Evaluates the attribute `name` of `ctx.my`, without falling back to
    /// the target record when it is missing.
    pub fn evaluate_attribute(&mut self, name: &str, ctx: &EvalContext<'_>) -> Value {
        self.eval_attribute_in(ctx, name).unwrap_or_else(|e| {
            debug!(attribute = name, error = %e, "attribute evaluated to error");
            Value::Error
        })
    }

    /// Evaluates one node, converting failures into `Value::Error`.
    fn eval_expr(&mut self, expr: &Expr, ctx: &EvalContext<'_>) -> Value {
        self.depth += 1;
        let result = if self.depth > self.limits.max_depth {
            Err(EvalError::DepthExceeded(self.limits.max_depth))
        } else {
            self.eval_node(expr, ctx)
        };
        self.depth -= 1;

        result.unwrap_or_else(|e| {
            debug!(error = %e, "expression evaluated to error");
            Value::Error
        })
    }

    fn eval_node(&mut self, expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        match expr {
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::Real(n) => Ok(Value::Real(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Error => Ok(Value::Error),
            Expr::Attribute { scope, name } => self.resolve(*scope, name, ctx),
            Expr::BinaryOp { .. } => Ok(self.eval_chain(expr, ctx)),
            Expr::UnaryOp { op, operand } => {
                let value = self.eval_expr(operand, ctx);
                operations::apply_unary(*op, &value)
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => match self.eval_expr(condition, ctx) {
                Value::Boolean(true) => Ok(self.eval_expr(then_branch, ctx)),
                Value::Boolean(false) => Ok(self.eval_expr(else_branch, ctx)),
                v @ (Value::Undefined | Value::Error) => Ok(v),
                other => Err(EvalError::TypeMismatch(format!(
                    "condition must be boolean, got {}",
                    other.type_name()
                ))),
            },
            Expr::Elvis { left, right } => match self.eval_expr(left, ctx) {
                Value::Undefined => Ok(self.eval_expr(right, ctx)),
                value => Ok(value),
            },
            Expr::Select { record, attr } => match self.eval_expr(record, ctx) {
                Value::ClassAd(ad) => self.eval_in_record(&ad, attr, ctx),
                v @ (Value::Undefined | Value::Error) => Ok(v),
                other => Err(EvalError::TypeMismatch(format!(
                    "cannot select '{attr}' from {}",
                    other.type_name()
                ))),
            },
            Expr::Subscript { container, index } => {
                let container_val = self.eval_expr(container, ctx);
                let index_val = self.eval_expr(index, ctx);
                self.apply_subscript(&container_val, &index_val, ctx)
            }
            Expr::FunctionCall { name, args } => self.call_builtin(name, args, ctx),
            Expr::List(items) => Ok(Value::List(
                items.iter().map(|item| self.eval_expr(item, ctx)).collect(),
            )),
            Expr::Record(ad) => Ok(Value::ClassAd(Arc::clone(ad))),
        }
    }

    /// Evaluates a binary node and the binary nodes down its left spine in
    /// one loop, innermost first. A left-associative chain therefore costs
    /// one level of depth however long it is.
    fn eval_chain(&mut self, expr: &Expr, ctx: &EvalContext<'_>) -> Value {
        let mut links = vec![];
        let mut leftmost = expr;
        while let Expr::BinaryOp { op, left, right } = leftmost {
            links.push((*op, right.as_ref()));
            leftmost = left;
        }

        let mut value = self.eval_expr(leftmost, ctx);
        for (op, right) in links.into_iter().rev() {
            let result = if matches!(op, BinOp::And | BinOp::Or) {
                operations::apply_logical(op, value, || self.eval_expr(right, ctx))
            } else {
                let right_val = self.eval_expr(right, ctx);
                operations::apply_binop(op, &value, &right_val)
            };
            value = result.unwrap_or_else(|e| {
                debug!(error = %e, "expression evaluated to error");
                Value::Error
            });
        }
        value
    }

    fn resolve(&mut self, scope: Scope, name: &str, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        trace!(scope = scope.prefix(), attribute = name, "resolving attribute");
        match scope {
            Scope::My => self.eval_attribute_in(ctx, name),
            Scope::Unscoped => {
                if ctx.my.contains(name) {
                    self.eval_attribute_in(ctx, name)
                } else if let Some(flipped) = ctx.flipped() {
                    self.eval_attribute_in(&flipped, name)
                } else {
                    Ok(Value::Undefined)
                }
            }
            Scope::Target => match ctx.flipped() {
                Some(flipped) => self.eval_attribute_in(&flipped, name),
                None => Ok(Value::Undefined),
            },
            Scope::Parent => match ctx.parent {
                Some(parent) => self.eval_attribute_in(parent, name),
                None => Ok(Value::Undefined),
            },
        }
    }

    /// Evaluates the expression bound to `name` in `ctx.my`, guarding
    /// against attributes that depend on themselves.
    fn eval_attribute_in(&mut self, ctx: &EvalContext<'_>, name: &str) -> Result<Value, EvalError> {
        let Some(expr) = ctx.my.get(name) else {
            return Ok(Value::Undefined);
        };

        let key = (ctx.my as *const ClassAd as usize, name.to_string());
        if self.visited.contains(&key) {
            return Err(EvalError::CyclicReference(name.to_string()));
        }
        self.visited.insert(key.clone());
        let value = self.eval_expr(expr, ctx);
        self.visited.remove(&key);
        Ok(value)
    }

    /// Evaluates attribute `name` of a record value, with the selecting
    /// context as PARENT.
    fn eval_in_record(&mut self, ad: &ClassAd, name: &str, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let child = EvalContext {
            my: ad,
            target: None,
            parent: Some(ctx),
        };
        self.eval_attribute_in(&child, name)
    }

    fn apply_subscript(&mut self, container: &Value, index: &Value, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        if container.is_error() || index.is_error() {
            return Ok(Value::Error);
        }
        if container.is_undefined() || index.is_undefined() {
            return Ok(Value::Undefined);
        }
        match (container, index) {
            (Value::List(items), Value::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|slot| items.get(slot))
                .cloned()
                .ok_or(EvalError::IndexOutOfRange {
                    index: *i,
                    len: items.len(),
                }),
            (Value::ClassAd(ad), Value::String(key)) => self.eval_in_record(ad, key, ctx),
            (c, i) => Err(EvalError::TypeMismatch(format!(
                "cannot index {} with {}",
                c.type_name(),
                i.type_name()
            ))),
        }
    }
}
