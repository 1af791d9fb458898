//! The built-in function library.
//!
//! Function names are matched case-insensitively. Most functions are
//! strict: their arguments are evaluated first, and an Error or Undefined
//! argument is returned as the result without calling the function. The
//! type predicates, `identicalMember`, `ifThenElse`, `unparse` and `eval`
//! look at their arguments themselves.

use std::{cmp::Ordering, fmt::Write};

use chrono::{
    DateTime, Utc,
    format::{Item, StrftimeItems},
};
use rand::Rng;
use regex::{Regex, RegexBuilder};

use crate::{
    ast::{BinOp, Expr, Scope},
    evaluator::{EvalContext, EvalError, Evaluator, operations::apply_binop},
    value::Value,
};

const DEFAULT_DELIMITERS: &str = " ,";

fn arity(name: &str, expected: &'static str, got: usize) -> EvalError {
    EvalError::Arity {
        name: name.to_string(),
        expected,
        got,
    }
}

fn bad_argument(name: &str, message: impl Into<String>) -> EvalError {
    EvalError::BadArgument {
        name: name.to_string(),
        message: message.into(),
    }
}

fn expect_args(name: &str, args: &[Value], min: usize, max: usize, expected: &'static str) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        return Err(arity(name, expected, args.len()));
    }
    Ok(())
}

/// Error first, then Undefined.
fn absorb(values: &[Value]) -> Option<Value> {
    if values.iter().any(Value::is_error) {
        Some(Value::Error)
    } else if values.iter().any(Value::is_undefined) {
        Some(Value::Undefined)
    } else {
        None
    }
}

fn string_arg<'v>(name: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    value
        .as_str()
        .ok_or_else(|| bad_argument(name, format!("expected string, got {}", value.type_name())))
}

fn integer_arg(name: &str, value: &Value) -> Result<i64, EvalError> {
    value
        .as_integer()
        .ok_or_else(|| bad_argument(name, format!("expected integer, got {}", value.type_name())))
}

fn number_arg(name: &str, value: &Value) -> Result<f64, EvalError> {
    value
        .as_real()
        .ok_or_else(|| bad_argument(name, format!("expected number, got {}", value.type_name())))
}

fn list_arg<'v>(name: &str, value: &'v Value) -> Result<&'v [Value], EvalError> {
    value
        .as_list()
        .ok_or_else(|| bad_argument(name, format!("expected list, got {}", value.type_name())))
}

/// Text of a scalar as `strcat` and friends see it: strings unquoted, other
/// scalars in their literal form.
fn scalar_text(name: &str, value: &Value) -> Result<String, EvalError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(_) | Value::Real(_) | Value::Boolean(_) => Ok(value.to_string()),
        other => Err(bad_argument(
            name,
            format!("cannot convert {} to string", other.type_name()),
        )),
    }
}

impl Evaluator {
    /// Dispatches a function call by name.
    pub(super) fn call_builtin(&mut self, name: &str, args: &[Expr], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let lower = name.to_ascii_lowercase();

        // Functions that control evaluation of their own arguments
        match lower.as_str() {
            "ifthenelse" => return self.builtin_if_then_else(args, ctx),
            "unparse" => return builtin_unparse(args, ctx),
            "eval" => return self.builtin_eval(args, ctx),
            _ => {}
        }

        let Some(function) = lookup(&lower) else {
            return Err(EvalError::UnknownFunction(name.to_string()));
        };
        let values: Vec<Value> = args.iter().map(|arg| self.eval_expr(arg, ctx)).collect();

        if !inspects_absorbing(&lower)
            && let Some(absorbed) = absorb(&values)
        {
            return Ok(absorbed);
        }
        function(name, &values)
    }

    /// ifThenElse(cond, then, else): only the chosen branch is evaluated
    fn builtin_if_then_else(&mut self, args: &[Expr], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let [condition, then_branch, else_branch] = args else {
            return Err(arity("ifThenElse", "3", args.len()));
        };
        let chosen = match self.eval_expr(condition, ctx) {
            Value::Boolean(b) => b,
            Value::Integer(n) => n != 0,
            Value::Real(n) => n != 0.0,
            v @ (Value::Undefined | Value::Error) => return Ok(v),
            other => {
                return Err(bad_argument(
                    "ifThenElse",
                    format!("condition must be boolean, got {}", other.type_name()),
                ));
            }
        };
        Ok(self.eval_expr(if chosen { then_branch } else { else_branch }, ctx))
    }

    /// eval(text): parses `text` and evaluates it in the current context
    fn builtin_eval(&mut self, args: &[Expr], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        let [arg] = args else {
            return Err(arity("eval", "1", args.len()));
        };
        let text = match self.eval_expr(arg, ctx) {
            Value::String(s) => s,
            v @ (Value::Undefined | Value::Error) => return Ok(v),
            other => {
                return Err(bad_argument(
                    "eval",
                    format!("expected string, got {}", other.type_name()),
                ));
            }
        };
        let expr = (self.parser)(&text).map_err(|e| EvalError::Reparse(e.to_string()))?;
        Ok(self.eval_expr(&expr, ctx))
    }
}

type Builtin = fn(&str, &[Value]) -> Result<Value, EvalError>;

/// Functions that see Undefined and Error arguments instead of absorbing them.
fn inspects_absorbing(lower: &str) -> bool {
    matches!(
        lower,
        "isundefined"
            | "iserror"
            | "isstring"
            | "isinteger"
            | "isreal"
            | "isboolean"
            | "islist"
            | "isclassad"
            | "identicalmember"
    )
}

fn lookup(lower: &str) -> Option<Builtin> {
    let function: Builtin = match lower {
        // Type predicates
        "isundefined" => |n, v| type_predicate(n, v, Value::is_undefined),
        "iserror" => |n, v| type_predicate(n, v, Value::is_error),
        "isstring" => |n, v| type_predicate(n, v, |x| matches!(x, Value::String(_))),
        "isinteger" => |n, v| type_predicate(n, v, |x| matches!(x, Value::Integer(_))),
        "isreal" => |n, v| type_predicate(n, v, |x| matches!(x, Value::Real(_))),
        "isboolean" => |n, v| type_predicate(n, v, |x| matches!(x, Value::Boolean(_))),
        "islist" => |n, v| type_predicate(n, v, |x| matches!(x, Value::List(_))),
        "isclassad" => |n, v| type_predicate(n, v, |x| matches!(x, Value::ClassAd(_))),

        // Conversion and math
        "int" => builtin_int,
        "real" => builtin_real,
        "string" => builtin_string,
        "bool" => builtin_bool,
        "floor" => |n, v| round_with(n, v, f64::floor),
        "ceiling" => |n, v| round_with(n, v, f64::ceil),
        "round" => |n, v| round_with(n, v, f64::round),
        "pow" => builtin_pow,
        "random" => builtin_random,
        "time" => |n, v| {
            expect_args(n, v, 0, 0, "0")?;
            Ok(Value::Integer(Utc::now().timestamp()))
        },
        "interval" => builtin_interval,
        "formattime" => builtin_format_time,

        // Strings
        "strcat" => builtin_strcat,
        "substr" => builtin_substr,
        "toupper" => |n, v| {
            expect_args(n, v, 1, 1, "1")?;
            Ok(Value::String(string_arg(n, &v[0])?.to_uppercase()))
        },
        "tolower" => |n, v| {
            expect_args(n, v, 1, 1, "1")?;
            Ok(Value::String(string_arg(n, &v[0])?.to_lowercase()))
        },
        "size" | "length" => builtin_size,
        "strcmp" => |n, v| builtin_strcmp(n, v, false),
        "stricmp" => |n, v| builtin_strcmp(n, v, true),
        "join" => builtin_join,
        "split" => builtin_split,
        "regexp" => builtin_regexp,
        "regexps" => builtin_regexps,
        "regexpmember" => builtin_regexp_member,

        // Lists
        "member" => builtin_member,
        "identicalmember" => builtin_identical_member,
        "sum" => |n, v| aggregate_list(n, v, Aggregate::Sum),
        "avg" => |n, v| aggregate_list(n, v, Aggregate::Avg),
        "min" => |n, v| aggregate_list(n, v, Aggregate::Min),
        "max" => |n, v| aggregate_list(n, v, Aggregate::Max),
        "anycompare" => |n, v| builtin_compare_list(n, v, false),
        "allcompare" => |n, v| builtin_compare_list(n, v, true),

        // String lists
        "stringlistsize" => |n, v| {
            let (_, tokens) = string_list_args(n, v, 0)?;
            Ok(Value::Integer(tokens.len() as i64))
        },
        "stringlistsum" => |n, v| aggregate_string_list(n, v, Aggregate::Sum),
        "stringlistavg" => |n, v| aggregate_string_list(n, v, Aggregate::Avg),
        "stringlistmin" => |n, v| aggregate_string_list(n, v, Aggregate::Min),
        "stringlistmax" => |n, v| aggregate_string_list(n, v, Aggregate::Max),
        "stringlistmember" => |n, v| builtin_string_list_member(n, v, false),
        "stringlistimember" => |n, v| builtin_string_list_member(n, v, true),
        "stringlistsintersect" => builtin_string_lists_intersect,
        "stringlistsubsetmatch" => |n, v| builtin_string_list_subset(n, v, false),
        "stringlistisubsetmatch" => |n, v| builtin_string_list_subset(n, v, true),
        "stringlistregexpmember" => builtin_string_list_regexp_member,

        _ => return None,
    };
    Some(function)
}

/// unparse(attr): the text of the expression bound to `attr`, unevaluated
fn builtin_unparse(args: &[Expr], ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
    let [arg] = args else {
        return Err(arity("unparse", "1", args.len()));
    };
    let Expr::Attribute { scope, name } = arg else {
        return Err(bad_argument("unparse", "expected an attribute reference"));
    };
    let bound = match scope {
        Scope::My => ctx.my.get(name),
        Scope::Unscoped => ctx
            .my
            .get(name)
            .or_else(|| ctx.target.and_then(|target| target.get(name))),
        Scope::Target => ctx.target.and_then(|target| target.get(name)),
        Scope::Parent => ctx.parent.and_then(|parent| parent.my.get(name)),
    };
    Ok(bound.map_or(Value::Undefined, |expr| Value::String(expr.to_string())))
}

fn type_predicate(name: &str, values: &[Value], test: impl Fn(&Value) -> bool) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    Ok(Value::Boolean(test(&values[0])))
}

// ========================================
// Conversion and math
// ========================================

fn parse_number(text: &str) -> Option<Value> {
    let text = text.trim();
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Integer(n));
    }
    text.parse::<f64>().ok().map(Value::Real)
}

fn builtin_int(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    match &values[0] {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Real(n) if n.is_finite() => Ok(Value::Integer(n.trunc() as i64)),
        Value::Boolean(b) => Ok(Value::Integer(i64::from(*b))),
        Value::String(s) => match parse_number(s) {
            Some(Value::Integer(n)) => Ok(Value::Integer(n)),
            Some(Value::Real(n)) if n.is_finite() => Ok(Value::Integer(n.trunc() as i64)),
            _ => Err(bad_argument(name, format!("'{s}' is not a number"))),
        },
        other => Err(bad_argument(
            name,
            format!("cannot convert {} to integer", other.type_name()),
        )),
    }
}

fn builtin_real(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    match &values[0] {
        Value::Integer(n) => Ok(Value::Real(*n as f64)),
        Value::Real(n) => Ok(Value::Real(*n)),
        Value::Boolean(b) => Ok(Value::Real(if *b { 1.0 } else { 0.0 })),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| bad_argument(name, format!("'{s}' is not a number"))),
        other => Err(bad_argument(
            name,
            format!("cannot convert {} to real", other.type_name()),
        )),
    }
}

fn builtin_string(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    match &values[0] {
        Value::String(s) => Ok(Value::String(s.clone())),
        other => Ok(Value::String(other.to_string())),
    }
}

fn builtin_bool(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    match &values[0] {
        Value::Boolean(b) => Ok(Value::Boolean(*b)),
        Value::Integer(n) => Ok(Value::Boolean(*n != 0)),
        Value::Real(n) => Ok(Value::Boolean(*n != 0.0)),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
        other => Err(bad_argument(
            name,
            format!("cannot convert {other} to boolean"),
        )),
    }
}

/// floor/ceiling/round: always an Integer result
fn round_with(name: &str, values: &[Value], round: fn(f64) -> f64) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    match &values[0] {
        Value::Integer(n) => Ok(Value::Integer(*n)),
        Value::Real(n) if n.is_finite() => Ok(Value::Integer(round(*n) as i64)),
        Value::Real(_) => Err(bad_argument(name, "cannot round a non-finite real")),
        other => Err(bad_argument(
            name,
            format!("expected number, got {}", other.type_name()),
        )),
    }
}

fn builtin_pow(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 2, "2")?;
    match (&values[0], &values[1]) {
        (Value::Integer(base), Value::Integer(exp)) if *exp >= 0 => {
            let exp = u32::try_from(*exp).unwrap_or(u32::MAX);
            Ok(Value::Integer(base.wrapping_pow(exp)))
        }
        (base, exp) => Ok(Value::Real(number_arg(name, base)?.powf(number_arg(name, exp)?))),
    }
}

fn builtin_random(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 0, 1, "0 or 1")?;
    let mut rng = rand::rng();
    match values.first() {
        None => Ok(Value::Real(rng.random::<f64>())),
        Some(Value::Integer(max)) if *max > 0 => Ok(Value::Integer(rng.random_range(0..*max))),
        Some(Value::Real(max)) if *max > 0.0 && max.is_finite() => {
            Ok(Value::Real(rng.random::<f64>() * max))
        }
        Some(other) => Err(bad_argument(
            name,
            format!("expected a positive number, got {other}"),
        )),
    }
}

/// interval(seconds): `[D+]HH:MM:SS`
fn builtin_interval(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    let seconds = integer_arg(name, &values[0])?;
    let sign = if seconds < 0 { "-" } else { "" };
    let total = seconds.unsigned_abs();
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, minutes, secs) = (rest / 3600, rest % 3600 / 60, rest % 60);
    let text = if days > 0 {
        format!("{sign}{days}+{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{secs:02}")
    };
    Ok(Value::String(text))
}

/// formatTime([seconds[, format]]): strftime-style formatting in UTC
fn builtin_format_time(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 0, 2, "0 to 2")?;
    let seconds = match values.first() {
        Some(v) => integer_arg(name, v)?,
        None => Utc::now().timestamp(),
    };
    let format = match values.get(1) {
        Some(v) => string_arg(name, v)?,
        None => "%c",
    };

    let time: DateTime<Utc> = DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| bad_argument(name, format!("{seconds} is out of range")))?;
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(bad_argument(name, format!("invalid format '{format}'")));
    }

    let mut text = String::new();
    write!(text, "{}", time.format_with_items(items.iter()))
        .map_err(|_| bad_argument(name, format!("cannot format with '{format}'")))?;
    Ok(Value::String(text))
}

// ========================================
// Strings
// ========================================

fn builtin_strcat(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    let mut result = String::new();
    for value in values {
        result.push_str(&scalar_text(name, value)?);
    }
    Ok(Value::String(result))
}

/// Resolves a possibly negative offset against `len`.
fn clamp_offset(offset: i64, len: usize) -> usize {
    if offset < 0 {
        len.saturating_sub(offset.unsigned_abs() as usize)
    } else {
        (offset as usize).min(len)
    }
}

/// substr(s, offset[, length]); negative offset and length count from the end
fn builtin_substr(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 3, "2 or 3")?;
    let chars: Vec<char> = string_arg(name, &values[0])?.chars().collect();
    let start = clamp_offset(integer_arg(name, &values[1])?, chars.len());
    let end = match values.get(2) {
        None => chars.len(),
        Some(v) => {
            let length = integer_arg(name, v)?;
            if length < 0 {
                clamp_offset(length, chars.len())
            } else {
                start.saturating_add(length as usize).min(chars.len())
            }
        }
    };
    let text = if end > start {
        chars[start..end].iter().collect()
    } else {
        String::new()
    };
    Ok(Value::String(text))
}

fn builtin_size(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    let len = match &values[0] {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::ClassAd(ad) => ad.len(),
        other => {
            return Err(bad_argument(
                name,
                format!("expected string, list or classad, got {}", other.type_name()),
            ));
        }
    };
    Ok(Value::Integer(len as i64))
}

fn builtin_strcmp(name: &str, values: &[Value], ignore_case: bool) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 2, "2")?;
    let mut a = scalar_text(name, &values[0])?;
    let mut b = scalar_text(name, &values[1])?;
    if ignore_case {
        a = a.to_lowercase();
        b = b.to_lowercase();
    }
    let result = match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    };
    Ok(Value::Integer(result))
}

/// join(sep, list) or join(sep, item, item, ...)
fn builtin_join(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    let Some((separator, rest)) = values.split_first() else {
        return Err(arity(name, "at least 1", 0));
    };
    let separator = string_arg(name, separator)?;
    let items: &[Value] = match rest {
        [Value::List(items)] => items,
        _ => rest,
    };
    let parts = items
        .iter()
        .map(|item| scalar_text(name, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::String(parts.join(separator)))
}

/// split(s[, delimiters]): a list of the non-empty tokens
fn builtin_split(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    let (_, tokens) = string_list_args(name, values, 0)?;
    Ok(Value::List(tokens.into_iter().map(Value::String).collect()))
}

/// Compiles `pattern` with the ClassAd option letters: `i` case-insensitive,
/// `m` multi-line anchors, `s` dot matches newline, `x` extended syntax.
fn build_regex(name: &str, pattern: &str, options: Option<&Value>) -> Result<Regex, EvalError> {
    let mut builder = RegexBuilder::new(pattern);
    if let Some(options) = options {
        for option in string_arg(name, options)?.chars() {
            match option.to_ascii_lowercase() {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => return Err(bad_argument(name, format!("unknown regex option '{other}'"))),
            };
        }
    }
    builder
        .build()
        .map_err(|e| EvalError::InvalidRegex(e.to_string()))
}

fn builtin_regexp(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 3, "2 or 3")?;
    let re = build_regex(name, string_arg(name, &values[0])?, values.get(2))?;
    Ok(Value::Boolean(re.is_match(string_arg(name, &values[1])?)))
}

/// regexps(pattern, target, substitution[, options]): the substitution with
/// `\0`..`\9` replaced by the groups of the first match, or "" without one
fn builtin_regexps(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 3, 4, "3 or 4")?;
    let re = build_regex(name, string_arg(name, &values[0])?, values.get(3))?;
    let target = string_arg(name, &values[1])?;
    let substitution = string_arg(name, &values[2])?;

    let Some(captures) = re.captures(target) else {
        return Ok(Value::String(String::new()));
    };
    let mut result = String::new();
    let mut chars = substitution.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some(d @ '0'..='9') => {
                chars.next();
                let group = d as usize - '0' as usize;
                if let Some(m) = captures.get(group) {
                    result.push_str(m.as_str());
                }
            }
            Some('\\') => {
                chars.next();
                result.push('\\');
            }
            _ => result.push('\\'),
        }
    }
    Ok(Value::String(result))
}

/// regexpMember(pattern, list[, options]): true if any string element matches
fn builtin_regexp_member(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 3, "2 or 3")?;
    let re = build_regex(name, string_arg(name, &values[0])?, values.get(2))?;
    let items = list_arg(name, &values[1])?;
    if let Some(absorbed) = absorb(items) {
        return Ok(absorbed);
    }
    for item in items {
        if re.is_match(string_arg(name, item)?) {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

// ========================================
// Lists
// ========================================

fn builtin_member(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 2, "2")?;
    let needle = &values[0];
    if matches!(needle, Value::List(_) | Value::ClassAd(_)) {
        return Err(bad_argument(name, "the value to look for must be a scalar"));
    }
    let items = list_arg(name, &values[1])?;
    let found = items
        .iter()
        .any(|item| matches!(apply_binop(BinOp::Equal, needle, item), Ok(Value::Boolean(true))));
    Ok(Value::Boolean(found))
}

fn builtin_identical_member(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 2, "2")?;
    match &values[1] {
        Value::List(items) => Ok(Value::Boolean(
            items.iter().any(|item| item.is_identical(&values[0])),
        )),
        v @ (Value::Undefined | Value::Error) => Ok(v.clone()),
        other => Err(bad_argument(
            name,
            format!("expected list, got {}", other.type_name()),
        )),
    }
}

#[derive(Debug, Clone, Copy)]
enum Aggregate {
    Sum,
    Avg,
    Min,
    Max,
}

/// Folds numbers. Integers stay Integer for sum/min/max until a Real shows
/// up; avg is always Real. An empty input sums to 0, averages to 0.0 and has
/// no minimum or maximum.
fn aggregate(name: &str, items: &[Value], kind: Aggregate) -> Result<Value, EvalError> {
    if let Some(absorbed) = absorb(items) {
        return Ok(absorbed);
    }
    for item in items {
        if !item.is_number() {
            return Err(bad_argument(
                name,
                format!("expected numbers, found {}", item.type_name()),
            ));
        }
    }
    let all_integers = items.iter().all(|item| matches!(item, Value::Integer(_)));

    match kind {
        Aggregate::Sum | Aggregate::Avg if items.is_empty() => Ok(match kind {
            Aggregate::Sum => Value::Integer(0),
            _ => Value::Real(0.0),
        }),
        Aggregate::Sum if all_integers => Ok(Value::Integer(
            items
                .iter()
                .filter_map(Value::as_integer)
                .fold(0i64, i64::wrapping_add),
        )),
        Aggregate::Sum => Ok(Value::Real(items.iter().filter_map(Value::as_real).sum())),
        Aggregate::Avg => {
            let total: f64 = items.iter().filter_map(Value::as_real).sum();
            Ok(Value::Real(total / items.len() as f64))
        }
        Aggregate::Min | Aggregate::Max => {
            let wanted = if matches!(kind, Aggregate::Min) {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            let mut best: Option<&Value> = None;
            for item in items {
                best = match best {
                    None => Some(item),
                    Some(current) => {
                        let (a, b) = (item.as_real(), current.as_real());
                        let better = match (item, current) {
                            (Value::Integer(x), Value::Integer(y)) => x.cmp(y) == wanted,
                            _ => a.partial_cmp(&b) == Some(wanted),
                        };
                        Some(if better { item } else { current })
                    }
                };
            }
            Ok(match best {
                None => Value::Undefined,
                Some(v) if all_integers => v.clone(),
                Some(v) => Value::Real(v.as_real().unwrap_or(f64::NAN)),
            })
        }
    }
}

fn aggregate_list(name: &str, values: &[Value], kind: Aggregate) -> Result<Value, EvalError> {
    expect_args(name, values, 1, 1, "1")?;
    aggregate(name, list_arg(name, &values[0])?, kind)
}

/// anyCompare(op, list, value) / allCompare(op, list, value)
fn builtin_compare_list(name: &str, values: &[Value], all: bool) -> Result<Value, EvalError> {
    expect_args(name, values, 3, 3, "3")?;
    let op_text = string_arg(name, &values[0])?;
    let op = BinOp::comparison_from_str(op_text)
        .ok_or_else(|| bad_argument(name, format!("unknown comparison '{op_text}'")))?;
    let items = list_arg(name, &values[1])?;
    let holds = |item: &Value| {
        matches!(apply_binop(op, item, &values[2]), Ok(Value::Boolean(true)))
    };
    let result = if all {
        items.iter().all(holds)
    } else {
        items.iter().any(holds)
    };
    Ok(Value::Boolean(result))
}

// ========================================
// String lists
// ========================================

/// Splits a delimited string list, trimming whitespace around tokens and
/// dropping empty ones.
pub(crate) fn split_string_list(text: &str, delimiters: &str) -> Vec<String> {
    text.split(|c: char| delimiters.contains(c))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads `(leading..., list[, delimiters])` where `leading` arguments come
/// first; returns the leading values and the split list.
fn string_list_args<'v>(
    name: &str,
    values: &'v [Value],
    leading: usize,
) -> Result<(&'v [Value], Vec<String>), EvalError> {
    let expected = match leading {
        0 => "1 or 2",
        1 => "2 or 3",
        _ => "3 or 4",
    };
    expect_args(name, values, leading + 1, leading + 2, expected)?;
    let list = string_arg(name, &values[leading])?;
    let delimiters = match values.get(leading + 1) {
        Some(v) => string_arg(name, v)?,
        None => DEFAULT_DELIMITERS,
    };
    Ok((&values[..leading], split_string_list(list, delimiters)))
}

fn aggregate_string_list(name: &str, values: &[Value], kind: Aggregate) -> Result<Value, EvalError> {
    let (_, tokens) = string_list_args(name, values, 0)?;
    let numbers = tokens
        .iter()
        .map(|token| {
            parse_number(token).ok_or_else(|| bad_argument(name, format!("'{token}' is not a number")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    aggregate(name, &numbers, kind)
}

fn builtin_string_list_member(name: &str, values: &[Value], ignore_case: bool) -> Result<Value, EvalError> {
    let (leading, tokens) = string_list_args(name, values, 1)?;
    let needle = scalar_text(name, &leading[0])?;
    let found = tokens.iter().any(|token| {
        if ignore_case {
            token.eq_ignore_ascii_case(&needle)
        } else {
            *token == needle
        }
    });
    Ok(Value::Boolean(found))
}

fn builtin_string_lists_intersect(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    let (leading, right) = string_list_args(name, values, 1)?;
    let delimiters = match values.get(2) {
        Some(v) => string_arg(name, v)?,
        None => DEFAULT_DELIMITERS,
    };
    let left = split_string_list(string_arg(name, &leading[0])?, delimiters);
    Ok(Value::Boolean(left.iter().any(|token| right.contains(token))))
}

/// True when every token of the first list appears in the second.
fn builtin_string_list_subset(name: &str, values: &[Value], ignore_case: bool) -> Result<Value, EvalError> {
    let (leading, superset) = string_list_args(name, values, 1)?;
    let delimiters = match values.get(2) {
        Some(v) => string_arg(name, v)?,
        None => DEFAULT_DELIMITERS,
    };
    let subset = split_string_list(string_arg(name, &leading[0])?, delimiters);
    let contained = subset.iter().all(|token| {
        superset.iter().any(|candidate| {
            if ignore_case {
                candidate.eq_ignore_ascii_case(token)
            } else {
                candidate == token
            }
        })
    });
    Ok(Value::Boolean(contained))
}

/// stringListRegexpMember(pattern, list[, delimiters[, options]])
fn builtin_string_list_regexp_member(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    expect_args(name, values, 2, 4, "2 to 4")?;
    let (_, tokens) = string_list_args(name, &values[..values.len().min(3)], 1)?;
    let re = build_regex(name, string_arg(name, &values[0])?, values.get(3))?;
    Ok(Value::Boolean(tokens.iter().any(|token| re.is_match(token))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_string_list() {
        assert_eq!(split_string_list(" a, b ,,c ", " ,"), vec!["a", "b", "c"]);
        assert_eq!(split_string_list("a;b c", ";"), vec!["a", "b c"]);
        assert!(split_string_list("  ", " ,").is_empty());
    }

    #[test]
    fn test_clamp_offset() {
        assert_eq!(clamp_offset(-2, 5), 3);
        assert_eq!(clamp_offset(-9, 5), 0);
        assert_eq!(clamp_offset(7, 5), 5);
    }

    #[test]
    fn test_aggregate_mixed_types() {
        let items = [Value::Integer(3), Value::Real(1.5), Value::Integer(2)];
        assert_eq!(aggregate("min", &items, Aggregate::Min).unwrap(), Value::Real(1.5));
        assert_eq!(aggregate("max", &items, Aggregate::Max).unwrap(), Value::Real(3.0));
        assert_eq!(aggregate("sum", &items, Aggregate::Sum).unwrap(), Value::Real(6.5));
        assert_eq!(aggregate("min", &[], Aggregate::Min).unwrap(), Value::Undefined);
    }
}
