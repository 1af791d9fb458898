// tests/roundtrip_props.rs

use std::sync::Arc;

use classad::ast::{BinOp, Expr, Scope, UnaryOp};
use classad::output::to_classad_pretty;
use classad::{ClassAd, Value, parse, parse_classad};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[A-Za-z_][A-Za-z0-9_]{0,6}",
        1 => "[A-Za-z0-9_ '.]{1,6}",
        1 => prop::sample::select(vec!["true", "error", "is", "my", "TARGET", "Parent"])
            .prop_map(str::to_string),
    ]
}

fn arb_scope() -> impl Strategy<Value = Scope> {
    prop_oneof![
        Just(Scope::Unscoped),
        Just(Scope::My),
        Just(Scope::Target),
        Just(Scope::Parent),
    ]
}

fn arb_binop() -> impl Strategy<Value = BinOp> {
    prop::sample::select(vec![
        BinOp::Or,
        BinOp::And,
        BinOp::BitOr,
        BinOp::BitXor,
        BinOp::BitAnd,
        BinOp::Equal,
        BinOp::NotEqual,
        BinOp::Is,
        BinOp::Isnt,
        BinOp::LessThan,
        BinOp::GreaterThan,
        BinOp::LessEqual,
        BinOp::GreaterEqual,
        BinOp::ShiftLeft,
        BinOp::ShiftRight,
        BinOp::UnsignedShiftRight,
        BinOp::Add,
        BinOp::Subtract,
        BinOp::Multiply,
        BinOp::Divide,
        BinOp::Modulo,
    ])
}

fn arb_unop() -> impl Strategy<Value = UnaryOp> {
    prop::sample::select(vec![UnaryOp::Minus, UnaryOp::Plus, UnaryOp::Not, UnaryOp::BitNot])
}

/// Literals are non-negative: a leading minus parses as a unary operator.
fn arb_leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        (0..=i64::MAX).prop_map(Expr::Integer),
        (0.0f64..1e18).prop_map(Expr::Real),
        "[^\\x00]{0,8}".prop_map(Expr::String),
        any::<bool>().prop_map(Expr::Boolean),
        Just(Expr::Undefined),
        Just(Expr::Error),
        (arb_scope(), arb_name()).prop_map(|(scope, name)| Expr::scoped(scope, name)),
    ]
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    arb_leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            (arb_binop(), inner.clone(), inner.clone())
                .prop_map(|(op, left, right)| Expr::binary(op, left, right)),
            (arb_unop(), inner.clone()).prop_map(|(op, operand)| Expr::unary(op, operand)),
            (inner.clone(), inner.clone(), inner.clone()).prop_map(|(c, t, e)| {
                Expr::Conditional {
                    condition: Box::new(c),
                    then_branch: Box::new(t),
                    else_branch: Box::new(e),
                }
            }),
            (inner.clone(), inner.clone()).prop_map(|(left, right)| Expr::Elvis {
                left: Box::new(left),
                right: Box::new(right),
            }),
            (inner.clone(), arb_name()).prop_map(|(record, attr)| Expr::Select {
                record: Box::new(record),
                attr,
            }),
            (inner.clone(), inner.clone()).prop_map(|(container, index)| Expr::Subscript {
                container: Box::new(container),
                index: Box::new(index),
            }),
            (
                prop::sample::select(vec!["strcat", "member", "size", "ifThenElse", "odd name", "target"]),
                prop::collection::vec(inner.clone(), 0..3)
            )
                .prop_map(|(name, args)| Expr::FunctionCall {
                    name: name.to_string(),
                    args,
                }),
            prop::collection::vec(inner.clone(), 0..3).prop_map(Expr::List),
            prop::collection::vec((arb_name(), inner), 0..3)
                .prop_map(|attrs| Expr::Record(Arc::new(attrs.into_iter().collect()))),
        ]
    })
}

fn arb_classad() -> impl Strategy<Value = ClassAd> {
    prop::collection::vec((arb_name(), arb_expr()), 0..5)
        .prop_map(|attrs| attrs.into_iter().collect())
}

proptest! {
    #[test]
    fn prop_render_then_parse_is_identity(expr in arb_expr()) {
        let text = expr.to_string();
        let reparsed = parse(&text);
        prop_assert!(reparsed.is_ok(), "failed to reparse {:?}: {:?}", text, reparsed);
        prop_assert_eq!(reparsed.unwrap(), expr);
    }

    #[test]
    fn prop_rendering_is_idempotent(expr in arb_expr()) {
        let once = expr.to_string();
        let twice = parse(&once).unwrap().to_string();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_pretty_classad_round_trips(ad in arb_classad()) {
        prop_assert_eq!(&parse_classad(&to_classad_pretty(&ad)).unwrap(), &ad);
        prop_assert_eq!(&parse_classad(&ad.to_string()).unwrap(), &ad);
    }

    #[test]
    fn prop_string_escapes_round_trip(s in "[^\\x00]{0,32}") {
        let rendered = Value::String(s.clone()).to_string();
        prop_assert_eq!(ClassAd::new().evaluate_expr(&parse(&rendered).unwrap()), Value::String(s));
    }

    #[test]
    fn prop_integer_value_round_trips(n in any::<i64>()) {
        let rendered = Value::Integer(n).to_string();
        prop_assert_eq!(ClassAd::new().evaluate_expr(&parse(&rendered).unwrap()), Value::Integer(n));
    }
}

#[test]
fn test_special_reals_render_as_conversions() {
    for (value, text) in [
        (f64::NAN, "real(\"NaN\")"),
        (f64::INFINITY, "real(\"INF\")"),
        (f64::NEG_INFINITY, "(-real(\"INF\"))"),
    ] {
        assert_eq!(Value::Real(value).to_string(), text);
        let back = ClassAd::new().evaluate_expr(&parse(text).unwrap());
        assert!(back.is_identical(&Value::Real(value)));
    }
}

#[test]
fn test_min_integer_renders_reparsable() {
    assert_eq!(Value::Integer(i64::MIN).to_string(), "(-9223372036854775807 - 1)");
}

#[test]
fn test_quoted_function_name_round_trips() {
    let expr = parse("'odd name'(1, 'Target')").unwrap();
    assert_eq!(
        expr,
        Expr::FunctionCall {
            name: "odd name".to_string(),
            args: vec![Expr::Integer(1), Expr::attribute("Target")],
        }
    );
    let rendered = expr.to_string();
    assert_eq!(rendered, "'odd name'(1, 'Target')");
    assert_eq!(parse(&rendered).unwrap(), expr);
}
