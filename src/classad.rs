//! The ClassAd record: an ordered set of `name = expression` bindings.

use std::{collections::HashMap, str::FromStr};

use crate::{
    ast::Expr,
    evaluator::{EvalContext, Evaluator},
    output,
    parser::{self, ParseError},
    value::Value,
};

/// An ordered mapping from attribute name to expression.
///
/// Iteration and rendering follow insertion order. Re-inserting a name
/// replaces its expression in place. Names compare as exact strings.
///
/// A record holds no links to other records: TARGET and PARENT bindings are
/// supplied per evaluation through an [`EvalContext`], borrowing rather than
/// owning the records involved.
///
/// # Examples
///
/// ```
/// use classad::{ClassAd, Value};
///
/// let ad: ClassAd = "[Cpus = 4; Memory = Cpus * 1024]".parse().unwrap();
/// assert_eq!(ad.evaluate_attr("Memory"), Value::Integer(4096));
/// assert_eq!(ad.evaluate_attr("Disk"), Value::Undefined);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClassAd {
    attributes: Vec<(String, Expr)>,
    index: HashMap<String, usize>,
}

impl PartialEq for ClassAd {
    fn eq(&self, other: &Self) -> bool {
        self.attributes == other.attributes
    }
}

impl ClassAd {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `expr`, returning the expression it replaces.
    pub fn insert(&mut self, name: impl Into<String>, expr: Expr) -> Option<Expr> {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => Some(std::mem::replace(&mut self.attributes[slot].1, expr)),
            None => {
                self.index.insert(name.clone(), self.attributes.len());
                self.attributes.push((name, expr));
                None
            }
        }
    }

    /// Binds `name` to the literal denoting `value`.
    pub fn insert_value(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Expr> {
        self.insert(name, value.into().to_expr())
    }

    /// Parses `text` as an expression and binds it to `name`.
    pub fn insert_text(&mut self, name: impl Into<String>, text: &str) -> Result<Option<Expr>, ParseError> {
        let expr = parser::parse(text)?;
        Ok(self.insert(name, expr))
    }

    /// Removes `name`, returning its expression.
    pub fn remove(&mut self, name: &str) -> Option<Expr> {
        let slot = self.index.remove(name)?;
        let (_, expr) = self.attributes.remove(slot);
        for position in self.index.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(expr)
    }

    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.index.get(name).map(|&slot| &self.attributes[slot].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expr)> {
        self.attributes.iter().map(|(name, expr)| (name.as_str(), expr))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    /// Evaluates attribute `name` with this record as MY and nothing bound
    /// as TARGET or PARENT.
    pub fn evaluate_attr(&self, name: &str) -> Value {
        Evaluator::new().evaluate_attribute(name, &EvalContext::new(self))
    }

    /// Evaluates attribute `name` with `target` bound as TARGET.
    pub fn evaluate_attr_with_target(&self, name: &str, target: &ClassAd) -> Value {
        Evaluator::new().evaluate_attribute(name, &EvalContext::with_target(self, target))
    }

    /// Evaluates a free-standing expression with this record as MY.
    pub fn evaluate_expr(&self, expr: &Expr) -> Value {
        Evaluator::new().evaluate(expr, &EvalContext::new(self))
    }

    pub fn eval_integer(&self, name: &str) -> Option<i64> {
        self.evaluate_attr(name).as_integer()
    }

    /// Integer results are widened.
    pub fn eval_real(&self, name: &str) -> Option<f64> {
        self.evaluate_attr(name).as_real()
    }

    pub fn eval_string(&self, name: &str) -> Option<String> {
        match self.evaluate_attr(name) {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn eval_bool(&self, name: &str) -> Option<bool> {
        self.evaluate_attr(name).as_bool()
    }

    /// One `name = expression` line per attribute.
    pub fn to_old_format(&self) -> String {
        output::to_old_format(self)
    }
}

impl FromStr for ClassAd {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse_classad(s)
    }
}

impl<N: Into<String>> FromIterator<(N, Expr)> for ClassAd {
    fn from_iter<I: IntoIterator<Item = (N, Expr)>>(iter: I) -> Self {
        let mut ad = ClassAd::new();
        for (name, expr) in iter {
            ad.insert(name, expr);
        }
        ad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinsert_keeps_position() {
        let mut ad = ClassAd::new();
        ad.insert("a", Expr::Integer(1));
        ad.insert("b", Expr::Integer(2));
        let old = ad.insert("a", Expr::Integer(3));
        assert_eq!(old, Some(Expr::Integer(1)));
        let names: Vec<_> = ad.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(ad.get("a"), Some(&Expr::Integer(3)));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut ad = ClassAd::new();
        ad.insert("a", Expr::Integer(1));
        ad.insert("b", Expr::Integer(2));
        ad.insert("c", Expr::Integer(3));
        assert_eq!(ad.remove("a"), Some(Expr::Integer(1)));
        assert_eq!(ad.get("c"), Some(&Expr::Integer(3)));
        assert_eq!(ad.len(), 2);
        assert!(ad.remove("a").is_none());
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut ad = ClassAd::new();
        ad.insert("Cpus", Expr::Integer(1));
        assert!(ad.contains("Cpus"));
        assert!(!ad.contains("cpus"));
    }
}
