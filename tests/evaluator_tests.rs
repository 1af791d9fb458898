// tests/evaluator_tests.rs

use classad::{ClassAd, EvalContext, EvalLimits, Evaluator, Value, parse, parse_classad};

fn eval(text: &str) -> Value {
    ClassAd::new().evaluate_expr(&parse(text).unwrap())
}

fn eval_in(ad: &str, text: &str) -> Value {
    parse_classad(ad).unwrap().evaluate_expr(&parse(text).unwrap())
}

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Value::Integer(7));
    assert_eq!(eval("7 / 2"), Value::Integer(3));
    assert_eq!(eval("-7 / 2"), Value::Integer(-3));
    assert_eq!(eval("7 % 3"), Value::Integer(1));
    assert_eq!(eval("9223372036854775807 + 1"), Value::Integer(i64::MIN));
}

#[test]
fn test_mixed_arithmetic_promotes() {
    assert_eq!(eval("7.0 / 2"), Value::Real(3.5));
    assert_eq!(eval("1 + 0.5"), Value::Real(1.5));
    assert_eq!(eval("-(2.5)"), Value::Real(-2.5));
}

#[test]
fn test_division_by_zero_is_error() {
    assert_eq!(eval("1 / 0"), Value::Error);
    assert_eq!(eval("1 % 0"), Value::Error);
    assert_eq!(eval("1.0 / 0"), Value::Error);
}

#[test]
fn test_type_mismatch_is_error() {
    assert_eq!(eval("1 + \"a\""), Value::Error);
    assert_eq!(eval("1 == \"1\""), Value::Error);
    assert_eq!(eval("!5"), Value::Error);
    assert_eq!(eval("{1} + 1"), Value::Error);
}

#[test]
fn test_bitwise() {
    assert_eq!(eval("6 & 3"), Value::Integer(2));
    assert_eq!(eval("6 | 3"), Value::Integer(7));
    assert_eq!(eval("6 ^ 3"), Value::Integer(5));
    assert_eq!(eval("~0"), Value::Integer(-1));
    assert_eq!(eval("1 << 4"), Value::Integer(16));
    assert_eq!(eval("-16 >> 2"), Value::Integer(-4));
    assert_eq!(eval("-1 >>> 63"), Value::Integer(1));
}

// ============================================================================
// Comparison and identity
// ============================================================================

#[test]
fn test_equality_coerces_numbers() {
    assert_eq!(eval("5 == 5.0"), Value::Boolean(true));
    assert_eq!(eval("5 != 5.0"), Value::Boolean(false));
    assert_eq!(eval("5 is 5.0"), Value::Boolean(false));
    assert_eq!(eval("5 isnt 5.0"), Value::Boolean(true));
    assert_eq!(eval("5 =?= 5"), Value::Boolean(true));
}

#[test]
fn test_string_comparison_ignores_case() {
    assert_eq!(eval("\"abc\" == \"ABC\""), Value::Boolean(true));
    assert_eq!(eval("\"abc\" is \"ABC\""), Value::Boolean(false));
    assert_eq!(eval("\"a\" < \"B\""), Value::Boolean(true));
}

#[test]
fn test_relational() {
    assert_eq!(eval("1 < 2.5"), Value::Boolean(true));
    assert_eq!(eval("3 >= 3"), Value::Boolean(true));
    assert_eq!(eval("true < false"), Value::Error);
}

#[test]
fn test_nan_compares_false() {
    assert_eq!(eval("real(\"NaN\") < 1"), Value::Boolean(false));
    assert_eq!(eval("real(\"NaN\") >= 1"), Value::Boolean(false));
    assert_eq!(eval("real(\"NaN\") == real(\"NaN\")"), Value::Boolean(false));
}

#[test]
fn test_identity_on_special_values() {
    assert_eq!(eval("undefined is undefined"), Value::Boolean(true));
    assert_eq!(eval("error is error"), Value::Boolean(true));
    assert_eq!(eval("undefined is error"), Value::Boolean(false));
    assert_eq!(eval("Missing isnt undefined"), Value::Boolean(false));
    assert_eq!(eval("{1, \"a\"} is {1, \"a\"}"), Value::Boolean(true));
    assert_eq!(eval("{1, \"a\"} is {1, \"A\"}"), Value::Boolean(false));
    assert_eq!(eval("[a = 1] is [a = 1]"), Value::Boolean(true));
}

// ============================================================================
// Undefined and Error
// ============================================================================

#[test]
fn test_absorption() {
    assert_eq!(eval("undefined + 1"), Value::Undefined);
    assert_eq!(eval("undefined == undefined"), Value::Undefined);
    assert_eq!(eval("error + undefined"), Value::Error);
    assert_eq!(eval("undefined * error"), Value::Error);
    assert_eq!(eval("-undefined"), Value::Undefined);
    assert_eq!(eval("undefined && true"), Value::Undefined);
    assert_eq!(eval("error || false"), Value::Error);
}

#[test]
fn test_logical_short_circuit() {
    assert_eq!(eval("false && nosuchfunction()"), Value::Boolean(false));
    assert_eq!(eval("true || 1 / 0"), Value::Boolean(true));
    assert_eq!(eval("true && false"), Value::Boolean(false));
    assert_eq!(eval("false || undefined"), Value::Undefined);
    assert_eq!(eval("undefined || error"), Value::Error);
    assert_eq!(eval("undefined && 1"), Value::Error);
    assert_eq!(eval("1 && true"), Value::Error);
}

#[test]
fn test_missing_attribute_is_undefined() {
    assert_eq!(eval("Missing"), Value::Undefined);
    assert_eq!(eval("MY.Missing"), Value::Undefined);
    assert_eq!(eval("TARGET.Missing"), Value::Undefined);
    assert_eq!(eval("PARENT.Missing"), Value::Undefined);
}

#[test]
fn test_conditional() {
    assert_eq!(eval("true ? 1 : 1 / 0"), Value::Integer(1));
    assert_eq!(eval("false ? 1 / 0 : 2"), Value::Integer(2));
    assert_eq!(eval("undefined ? 1 : 2"), Value::Undefined);
    assert_eq!(eval("error ? 1 : 2"), Value::Error);
    assert_eq!(eval("\"yes\" ? 1 : 2"), Value::Error);
}

#[test]
fn test_elvis() {
    assert_eq!(eval("Missing ?: 1024"), Value::Integer(1024));
    assert_eq!(eval("512 ?: 1024"), Value::Integer(512));
    assert_eq!(eval("error ?: 1024"), Value::Error);
    assert_eq!(eval("undefined ?: undefined ?: 3"), Value::Integer(3));
}

// ============================================================================
// Attribute resolution
// ============================================================================

#[test]
fn test_attributes_reference_each_other() {
    let ad = parse_classad("[Cpus = 4; Memory = Cpus * 1024; Big = Memory > 2048]").unwrap();
    assert_eq!(ad.evaluate_attr("Memory"), Value::Integer(4096));
    assert_eq!(ad.eval_bool("Big"), Some(true));
    assert_eq!(ad.eval_real("Cpus"), Some(4.0));
    assert_eq!(ad.eval_string("Cpus"), None);
}

#[test]
fn test_unscoped_falls_back_to_target() {
    let job = parse_classad("[Cpus = 1; Want = Cpus + Memory]").unwrap();
    let machine = parse_classad("[Cpus = 8; Memory = 100]").unwrap();

    // Cpus resolves in MY first, Memory only exists in TARGET
    assert_eq!(job.evaluate_attr_with_target("Want", &machine), Value::Integer(101));
    assert_eq!(job.evaluate_attr("Want"), Value::Undefined);
}

#[test]
fn test_scoped_references() {
    let job = parse_classad(
        "[Cpus = 1; Mine = MY.Cpus; Theirs = TARGET.Cpus; Both = MY.Cpus + TARGET.Cpus]",
    )
    .unwrap();
    let machine = parse_classad("[Cpus = 8]").unwrap();
    assert_eq!(job.evaluate_attr_with_target("Mine", &machine), Value::Integer(1));
    assert_eq!(job.evaluate_attr_with_target("Theirs", &machine), Value::Integer(8));
    assert_eq!(job.evaluate_attr_with_target("Both", &machine), Value::Integer(9));
}

#[test]
fn test_target_attribute_evaluates_in_target_context() {
    let job = parse_classad("[Cpus = 1; Slots = TARGET.Free]").unwrap();
    let machine = parse_classad("[Cpus = 8; Free = Cpus - TARGET.Cpus]").unwrap();
    assert_eq!(job.evaluate_attr_with_target("Slots", &machine), Value::Integer(7));
}

#[test]
fn test_evaluate_attribute_does_not_fall_back() {
    let job = parse_classad("[Cpus = 1]").unwrap();
    let machine = parse_classad("[Memory = 100]").unwrap();
    let ctx = EvalContext::with_target(&job, &machine);
    assert_eq!(Evaluator::new().evaluate_attribute("Memory", &ctx), Value::Undefined);
}

#[test]
fn test_attribute_names_are_case_sensitive() {
    assert_eq!(eval_in("[Cpus = 4]", "cpus"), Value::Undefined);
    assert_eq!(eval_in("[Cpus = 4]", "Cpus"), Value::Integer(4));
}

#[test]
fn test_nested_record_select() {
    let ad = "[Machine = [Arch = \"X86_64\"; Cpus = 8]; Arch = Machine.Arch]";
    assert_eq!(eval_in(ad, "Arch"), string("X86_64"));
    assert_eq!(eval_in(ad, "Machine[\"Cpus\"]"), Value::Integer(8));
    assert_eq!(eval_in(ad, "Machine.Missing"), Value::Undefined);
    assert_eq!(eval_in(ad, "Missing.Arch"), Value::Undefined);
    assert_eq!(eval_in(ad, "Arch.x"), Value::Error);
}

#[test]
fn test_parent_scope() {
    let ad = "[x = 5; inner = [y = PARENT.x + 1; z = x]; a = inner.y; b = inner.z]";
    assert_eq!(eval_in(ad, "a"), Value::Integer(6));
    // Unscoped names inside a nested record do not walk up to the parent
    assert_eq!(eval_in(ad, "b"), Value::Undefined);
}

#[test]
fn test_list_subscript() {
    let ad = "[Slots = {10, 20, [Id = 3]}]";
    assert_eq!(eval_in(ad, "Slots[1]"), Value::Integer(20));
    assert_eq!(eval_in(ad, "Slots[2].Id"), Value::Integer(3));
    assert_eq!(eval_in(ad, "Slots[3]"), Value::Error);
    assert_eq!(eval_in(ad, "Slots[-1]"), Value::Error);
    assert_eq!(eval_in(ad, "Slots[\"a\"]"), Value::Error);
    assert_eq!(eval_in(ad, "Slots[undefined]"), Value::Undefined);
}

#[test]
fn test_list_values() {
    assert_eq!(
        eval("{1 + 1, Missing, 1 / 0}"),
        Value::List(vec![Value::Integer(2), Value::Undefined, Value::Error])
    );
}

// ============================================================================
// Failure containment
// ============================================================================

#[test]
fn test_cycle_is_error() {
    let ad = parse_classad("[A = B; B = A; C = 1]").unwrap();
    assert_eq!(ad.evaluate_attr("A"), Value::Error);
    assert_eq!(ad.evaluate_attr("B"), Value::Error);
    assert_eq!(ad.evaluate_attr("C"), Value::Integer(1));
}

#[test]
fn test_self_reference_is_error() {
    let ad = parse_classad("[A = A + 1]").unwrap();
    assert_eq!(ad.evaluate_attr("A"), Value::Error);
}

#[test]
fn test_repeated_reference_is_not_a_cycle() {
    let ad = parse_classad("[A = 2; B = A * A + A]").unwrap();
    assert_eq!(ad.evaluate_attr("B"), Value::Integer(6));
}

#[test]
fn test_failure_does_not_leak_to_siblings() {
    let ad = parse_classad("[Bad = 1 / 0; Good = 2; UsesBad = isError(Bad)]").unwrap();
    assert_eq!(ad.evaluate_attr("Bad"), Value::Error);
    assert_eq!(ad.evaluate_attr("Good"), Value::Integer(2));
    assert_eq!(ad.evaluate_attr("UsesBad"), Value::Boolean(true));
}

#[test]
fn test_evaluation_depth_limit() {
    let mut ad = ClassAd::new();
    for i in 0..40 {
        ad.insert_text(format!("a{i}"), &format!("a{} + 1", i + 1)).unwrap();
    }
    ad.insert_value("a40", 0i64);

    assert_eq!(ad.evaluate_attr("a0"), Value::Integer(40));

    let limits = EvalLimits::new().with_max_depth(20);
    let mut evaluator = Evaluator::new().with_limits(limits);
    assert_eq!(
        evaluator.evaluate_attribute("a0", &EvalContext::new(&ad)),
        Value::Error
    );
}

#[test]
fn test_long_chains_evaluate_within_depth() {
    assert_eq!(eval(&vec!["1"; 300].join(" + ")), Value::Integer(300));
    assert_eq!(eval(&vec!["true"; 300].join(" && ")), Value::Boolean(true));
    assert_eq!(eval(&format!("{} || error", vec!["false"; 300].join(" || "))), Value::Error);

    let hosts: Vec<_> = (0..200).map(|i| format!("Name == \"h{i}\"")).collect();
    let ad = parse_classad(&format!(
        "[Name = \"h199\"; Requirements = {}]",
        hosts.join(" || ")
    ))
    .unwrap();
    assert_eq!(ad.evaluate_attr("Requirements"), Value::Boolean(true));

    let limits = EvalLimits::new().with_max_depth(8);
    let mut evaluator = Evaluator::new().with_limits(limits);
    let product = parse(&vec!["2"; 100].join(" * ")).unwrap();
    assert_eq!(
        evaluator.evaluate(&product, &EvalContext::new(&ClassAd::new())),
        Value::Integer(0)
    );
}

#[test]
fn test_evaluator_is_reusable() {
    let ad = parse_classad("[A = B; B = A; C = 3]").unwrap();
    let ctx = EvalContext::new(&ad);
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.evaluate_attribute("A", &ctx), Value::Error);
    assert_eq!(evaluator.evaluate_attribute("C", &ctx), Value::Integer(3));
    assert_eq!(evaluator.evaluate(&parse("C * 2").unwrap(), &ctx), Value::Integer(6));
}

#[test]
fn test_evaluation_does_not_mutate_record() {
    let ad = parse_classad("[a = 1; b = a + 1]").unwrap();
    let before = ad.clone();
    let _ = ad.evaluate_attr("b");
    assert_eq!(ad, before);
}

// ============================================================================
// Record mutation
// ============================================================================

#[test]
fn test_insert_value_and_text() {
    let mut ad = ClassAd::new();
    ad.insert_value("Name", "slot1");
    ad.insert_value("Cpus", 4i64);
    ad.insert_value("Load", 0.5);
    ad.insert_value("Idle", true);
    ad.insert_text("Memory", "Cpus * 512").unwrap();

    assert_eq!(ad.eval_string("Name"), Some("slot1".to_string()));
    assert_eq!(ad.eval_integer("Memory"), Some(2048));
    assert_eq!(ad.eval_real("Load"), Some(0.5));
    assert_eq!(ad.eval_bool("Idle"), Some(true));
    assert!(ad.insert_text("Broken", "1 +").is_err());
    assert!(!ad.contains("Broken"));
}

#[test]
fn test_remove_then_lookup() {
    let mut ad = parse_classad("[a = 1; b = a + 1]").unwrap();
    ad.remove("a");
    assert_eq!(ad.evaluate_attr("b"), Value::Undefined);
}
