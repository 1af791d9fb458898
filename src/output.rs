//! Canonical text rendering for ClassAd expressions, records and values.
//!
//! Rendering is the inverse of parsing: for any parsed expression `e`,
//! `parse(&e.to_string())` yields a tree structurally equal to `e`. To make
//! that hold without tracking precedence, every binary, unary, conditional
//! and elvis node is fully parenthesized.
//!
//! # Features
//!
//! - **Compact output** via `Display` - `[a = 1; b = 2]`, `{1, 2}`
//! - **Pretty output** via [`to_classad_pretty()`] - one attribute per line, 2-space indentation
//! - **String escaping** - the lexer's escape table, octal `\NNN` for other control characters
//! - **Name quoting** - attribute names that would not lex back as plain identifiers are single-quoted
//! - **Old format** via [`to_old_format()`] - one `name = expression` line per attribute
//!
//! # Examples
//!
//! ```
//! use classad::{ClassAd, parse};
//!
//! let expr = parse("a + b * 2").unwrap();
//! assert_eq!(expr.to_string(), "(a + (b * 2))");
//!
//! let ad: ClassAd = "[ Name = \"x\" ; Cpus = 4 ]".parse().unwrap();
//! assert_eq!(ad.to_string(), "[Name = \"x\"; Cpus = 4]");
//! ```

use std::{borrow::Cow, fmt};

use crate::{
    ast::{Expr, Scope},
    classad::ClassAd,
    value::Value,
};

pub struct ExprPrinter {
    pretty: bool,
}

impl ExprPrinter {
    pub fn new(pretty: bool) -> Self {
        ExprPrinter { pretty }
    }

    pub fn print(&self, expr: &Expr) -> String {
        let mut out = String::new();
        self.print_expr(&mut out, expr, 0);
        out
    }

    pub fn print_classad(&self, ad: &ClassAd) -> String {
        let mut out = String::new();
        self.print_record(&mut out, ad, 0);
        out
    }

    pub fn print_value(&self, value: &Value) -> String {
        let mut out = String::new();
        self.print_value_into(&mut out, value, 0);
        out
    }

    fn print_expr(&self, out: &mut String, expr: &Expr, indent: usize) {
        match expr {
            Expr::Integer(n) => out.push_str(&format_integer(*n)),
            Expr::Real(n) => out.push_str(&format_real(*n)),
            Expr::String(s) => push_quoted(out, s),
            Expr::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Expr::Undefined => out.push_str("undefined"),
            Expr::Error => out.push_str("error"),
            Expr::Attribute { scope, name } => {
                out.push_str(scope.prefix());
                out.push_str(&quote_name(name));
            }
            Expr::BinaryOp { op, left, right } => {
                out.push('(');
                self.print_expr(out, left, indent);
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                self.print_expr(out, right, indent);
                out.push(')');
            }
            Expr::UnaryOp { op, operand } => {
                out.push('(');
                out.push_str(op.symbol());
                self.print_expr(out, operand, indent);
                out.push(')');
            }
            Expr::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push('(');
                self.print_expr(out, condition, indent);
                out.push_str(" ? ");
                self.print_expr(out, then_branch, indent);
                out.push_str(" : ");
                self.print_expr(out, else_branch, indent);
                out.push(')');
            }
            Expr::Elvis { left, right } => {
                out.push('(');
                self.print_expr(out, left, indent);
                out.push_str(" ?: ");
                self.print_expr(out, right, indent);
                out.push(')');
            }
            Expr::Select { record, attr } => {
                self.print_expr(out, record, indent);
                out.push('.');
                out.push_str(&quote_name(attr));
            }
            Expr::Subscript { container, index } => {
                self.print_expr(out, container, indent);
                out.push('[');
                self.print_expr(out, index, indent);
                out.push(']');
            }
            Expr::FunctionCall { name, args } => {
                out.push_str(&quote_name(name));
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.print_expr(out, arg, indent);
                }
                out.push(')');
            }
            Expr::List(items) => {
                out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.print_expr(out, item, indent);
                }
                out.push('}');
            }
            Expr::Record(ad) => self.print_record(out, ad, indent),
        }
    }

    fn print_record(&self, out: &mut String, ad: &ClassAd, indent: usize) {
        if ad.is_empty() {
            out.push_str("[]");
            return;
        }

        if self.pretty {
            out.push_str("[\n");
            for (i, (name, expr)) in ad.iter().enumerate() {
                if i > 0 {
                    out.push_str(";\n");
                }
                out.push_str(&self.indent(indent + 1));
                out.push_str(&quote_name(name));
                out.push_str(" = ");
                self.print_expr(out, expr, indent + 1);
            }
            out.push('\n');
            out.push_str(&self.indent(indent));
            out.push(']');
        } else {
            out.push('[');
            for (i, (name, expr)) in ad.iter().enumerate() {
                if i > 0 {
                    out.push_str("; ");
                }
                out.push_str(&quote_name(name));
                out.push_str(" = ");
                self.print_expr(out, expr, indent);
            }
            out.push(']');
        }
    }

    fn print_value_into(&self, out: &mut String, value: &Value, indent: usize) {
        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Error => out.push_str("error"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&format_integer(*n)),
            Value::Real(n) => out.push_str(&format_real(*n)),
            Value::String(s) => push_quoted(out, s),
            Value::List(items) => {
                out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.print_value_into(out, item, indent);
                }
                out.push('}');
            }
            Value::ClassAd(ad) => self.print_record(out, ad, indent),
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape_string(s, '"'));
    out.push('"');
}

/// `i64::MIN` has no positive counterpart to negate, so it is spelled as a
/// subtraction.
fn format_integer(n: i64) -> String {
    if n == i64::MIN {
        format!("({} - 1)", i64::MIN + 1)
    } else {
        n.to_string()
    }
}

/// Renders a real so that it lexes back as a real with the same bits.
///
/// Finite values use Rust's shortest round-trip form, which always carries a
/// `.` or an exponent. NaN and the infinities have no literal syntax and are
/// rendered as conversions from strings.
pub fn format_real(n: f64) -> String {
    if n.is_nan() {
        "real(\"NaN\")".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "real(\"INF\")".to_string()
        } else {
            "(-real(\"INF\"))".to_string()
        }
    } else {
        format!("{n:?}")
    }
}

/// Escapes `s` for inclusion between `quote` characters.
pub fn escape_string(s: &str, quote: char) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            '\u{8}' => result.push_str("\\b"),
            '\u{c}' => result.push_str("\\f"),
            c if c == quote => {
                result.push('\\');
                result.push(c);
            }
            c if c.is_control() => result.push_str(&format!("\\{:03o}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

/// True when `name` would lex back as a plain identifier naming itself.
fn is_plain_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    let reserved = ["true", "false", "undefined", "error", "is", "isnt"];
    !reserved.iter().any(|kw| name.eq_ignore_ascii_case(kw)) && Scope::from_keyword(name).is_none()
}

/// Attribute name as it must appear in source text.
pub fn quote_name(name: &str) -> Cow<'_, str> {
    if is_plain_name(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("'{}'", escape_string(name, '\'')))
    }
}

/// Renders a record one `name = expression` line per attribute, the way
/// unbracketed ("old") ClassAds are written.
pub fn to_old_format(ad: &ClassAd) -> String {
    let printer = ExprPrinter::new(false);
    let mut out = String::new();
    for (name, expr) in ad.iter() {
        out.push_str(&quote_name(name));
        out.push_str(" = ");
        out.push_str(&printer.print(expr));
        out.push('\n');
    }
    out
}

/// Renders a record with one attribute per line and 2-space indentation.
///
/// ```
/// use classad::ClassAd;
/// use classad::output::to_classad_pretty;
///
/// let ad: ClassAd = "[a = 1; b = [c = 2]]".parse().unwrap();
/// assert_eq!(to_classad_pretty(&ad), "[\n  a = 1;\n  b = [\n    c = 2\n  ]\n]");
/// ```
pub fn to_classad_pretty(ad: &ClassAd) -> String {
    ExprPrinter::new(true).print_classad(ad)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ExprPrinter::new(false).print(self))
    }
}

impl fmt::Display for ClassAd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ExprPrinter::new(false).print_classad(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ExprPrinter::new(false).print_value(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape_string("a\"b\\c", '"'), "a\\\"b\\\\c");
        assert_eq!(escape_string("x\u{1}y", '"'), "x\\001y");
        assert_eq!(escape_string("tab\there", '"'), "tab\\there");
        assert_eq!(escape_string("it's", '\''), "it\\'s");
        assert_eq!(escape_string("it's", '"'), "it's");
    }

    #[test]
    fn test_quote_name() {
        assert_eq!(quote_name("Cpus"), "Cpus");
        assert_eq!(quote_name("_x1"), "_x1");
        assert_eq!(quote_name("odd name"), "'odd name'");
        assert_eq!(quote_name("1abc"), "'1abc'");
        assert_eq!(quote_name("TRUE"), "'TRUE'");
        assert_eq!(quote_name("target"), "'target'");
        assert_eq!(quote_name(""), "''");
    }

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.0), "1.0");
        assert_eq!(format_real(0.5), "0.5");
        assert_eq!(format_real(1e300), "1e300");
        assert_eq!(format_real(f64::NAN), "real(\"NaN\")");
        assert_eq!(format_real(f64::INFINITY), "real(\"INF\")");
    }

    #[test]
    fn test_integer_min() {
        assert_eq!(format_integer(i64::MIN), "(-9223372036854775807 - 1)");
        assert_eq!(format_integer(-3), "-3");
    }
}
