// tests/evaluator_tests.rs

use std::sync::{Arc, Mutex};

use formula_lang::{
    ConversionError, EvalError, EvaluateOptions, Expression, Parameters, Value, evaluate,
};
use rstest::rstest;

fn eval_with(source: &str, bindings: &[(&str, Value)]) -> Result<Value, EvalError> {
    let params: Parameters = bindings
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    Expression::new(source, EvaluateOptions::NONE).evaluate_with(&params)
}

// ============================================================================
// Arithmetic and precedence
// ============================================================================

#[rstest]
#[case("2 + 3 * 4", Value::Integer(14))]
#[case("(2 + 3) * 4", Value::Integer(20))]
#[case("10 - 4 - 3", Value::Integer(3))]
#[case("7 % 3", Value::Integer(1))]
#[case("6 / 3", Value::Integer(2))]
#[case("7 / 2", Value::Float(3.5))]
#[case("1 + 0.1", Value::Float(1.1))]
#[case("2.5 * 2", Value::Float(5.0))]
#[case("-3 + 1", Value::Integer(-2))]
#[case("1 << 4", Value::Integer(16))]
#[case("6 & 3 | 8", Value::Integer(10))]
#[case("6 ^ 3", Value::Integer(5))]
#[case("~0", Value::Integer(-1))]
#[case("'a' + 'b'", Value::from("ab"))]
#[case("'n' + 1", Value::from("n1"))]
fn test_arithmetic(#[case] source: &str, #[case] expected: Value) {
    assert_eq!(evaluate(source).unwrap(), expected);
}

#[rstest]
#[case("1 < 2", true)]
#[case("2 <= 2", true)]
#[case("3 > 4", false)]
#[case("1 = 1.0", true)]
#[case("1 == 2", false)]
#[case("1 != 2", true)]
#[case("1 <> 1", false)]
#[case("'abc' < 'abd'", true)]
#[case("#2024-01-01# < #2024-01-02#", true)]
#[case("'1' = 1", false)]
#[case("not true", false)]
#[case("!(1 > 2)", true)]
#[case("true and false", false)]
#[case("false or true", true)]
fn test_comparisons_and_logic(#[case] source: &str, #[case] expected: bool) {
    assert_eq!(evaluate(source).unwrap(), Value::Boolean(expected));
}

#[test]
fn test_division_by_zero() {
    assert_eq!(
        evaluate("1 / 0").unwrap_err(),
        EvalError::Conversion(ConversionError::DivisionByZero)
    );
}

#[test]
fn test_float_division_by_zero_is_infinite() {
    assert_eq!(evaluate("1.0 / 0.0").unwrap(), Value::Float(f64::INFINITY));
}

#[test]
fn test_ordering_unrelated_kinds_fails() {
    assert!(matches!(
        evaluate("1 < 'a'").unwrap_err(),
        EvalError::Conversion(ConversionError::InvalidOperands { .. })
    ));
}

// ============================================================================
// Laziness
// ============================================================================

#[test]
fn test_ternary_does_not_evaluate_untaken_branch() {
    assert_eq!(evaluate("true ? 1 : (1/0)").unwrap(), Value::Integer(1));
    assert_eq!(evaluate("false ? (1/0) : 2").unwrap(), Value::Integer(2));
}

#[test]
fn test_logical_short_circuit() {
    assert_eq!(evaluate("false && (1/0 > 0)").unwrap(), Value::Boolean(false));
    assert_eq!(evaluate("true || (1/0 > 0)").unwrap(), Value::Boolean(true));
    assert!(evaluate("true && (1/0 > 0)").is_err());
}

#[test]
fn test_or_evaluates_right_to_left_groups_in_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&order);
    let expr = Expression::new("a || b || c", EvaluateOptions::NONE).on_parameter(move |name| {
        seen.lock().unwrap().push(name.to_string());
        Ok(Some(Value::Boolean(name == "b")))
    });

    assert_eq!(expr.evaluate().unwrap(), Value::Boolean(true));
    assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_undefined_parameter() {
    assert_eq!(
        evaluate("[undefinedName]").unwrap_err(),
        EvalError::ParameterNotDefined("undefinedName".into())
    );
}

#[test]
fn test_null_is_prebound() {
    assert_eq!(evaluate("null").unwrap(), Value::Null);
    assert_eq!(evaluate("NULL = null").unwrap(), Value::Boolean(true));
}

#[test]
fn test_bindings_and_bracketed_names() {
    let result = eval_with(
        "[unit price] * qty",
        &[("unit price", Value::Float(2.5)), ("qty", Value::Integer(4))],
    );
    assert_eq!(result.unwrap(), Value::Float(10.0));
}

#[test]
fn test_parameter_hook_fills_gaps() {
    let expr = Expression::new("x + y", EvaluateOptions::NONE)
        .with_parameter("x", 1)
        .on_parameter(|name| Ok((name == "y").then_some(Value::Integer(41))));
    assert_eq!(expr.evaluate().unwrap(), Value::Integer(42));
}

#[test]
fn test_parameter_hook_not_consulted_for_bound_names() {
    let expr = Expression::new("x", EvaluateOptions::NONE)
        .with_parameter("x", 1)
        .on_parameter(|_| Err(EvalError::host("should not be called")));
    assert_eq!(expr.evaluate().unwrap(), Value::Integer(1));
}

#[test]
fn test_hook_failure_propagates() {
    let expr = Expression::new("x", EvaluateOptions::NONE)
        .on_parameter(|_| Err(EvalError::host("lookup failed")));
    assert_eq!(expr.evaluate().unwrap_err(), EvalError::Host("lookup failed".into()));
}

#[test]
fn test_nested_expression_sees_caller_bindings() {
    let inner = Expression::new("a * 2", EvaluateOptions::NONE).with_parameter("a", 100);
    let outer = Expression::new("inner + 1", EvaluateOptions::NONE)
        .with_parameter("inner", inner)
        .with_parameter("a", 5);

    // The caller's `a` wins over the nested expression's own
    assert_eq!(outer.evaluate().unwrap(), Value::Integer(11));
}

#[test]
fn test_nested_expression_uses_own_bindings_when_caller_lacks_them() {
    let inner = Expression::new("b * 2", EvaluateOptions::NONE).with_parameter("b", 3);
    let outer = Expression::new("inner", EvaluateOptions::NONE).with_parameter("inner", inner);
    assert_eq!(outer.evaluate().unwrap(), Value::Integer(6));
}

#[test]
fn test_nested_expression_gets_caller_hooks() {
    let inner = Expression::new("twice(z)", EvaluateOptions::NONE);
    let outer = Expression::new("inner", EvaluateOptions::NONE)
        .with_parameter("inner", inner)
        .on_parameter(|name| Ok((name == "z").then_some(Value::Integer(4))))
        .on_function(|name, args| {
            if name != "twice" {
                return Ok(None);
            }
            let x = args.evaluate(0)?;
            Ok(Some(formula_lang::conversion::add(&x, &x)?))
        });
    assert_eq!(outer.evaluate().unwrap(), Value::Integer(8));
}

// ============================================================================
// Calls
// ============================================================================

#[rstest]
#[case("Abs(-1)", 1.0)]
#[case("Ceil(1.2)", 2.0)]
#[case("Floor(1.8)", 1.0)]
#[case("Sqrt(16)", 4.0)]
#[case("Pow(2, 10)", 1024.0)]
#[case("Log(8, 2)", 3.0)]
#[case("Log10(1000)", 3.0)]
#[case("Max(3, 7)", 7.0)]
#[case("Min(3, 7)", 3.0)]
#[case("Exp(0)", 1.0)]
#[case("Cos(0)", 1.0)]
#[case("Sin(0)", 0.0)]
#[case("Tan(0)", 0.0)]
#[case("Asin(0)", 0.0)]
#[case("Acos(1)", 0.0)]
#[case("Atan(0)", 0.0)]
#[case("Sign(-5)", -1.0)]
#[case("Sign(0)", 1.0)]
#[case("Sign(2)", 1.0)]
#[case("Round(2.5)", 2.0)]
#[case("Round(3.5)", 4.0)]
#[case("Round(-2.5)", -2.0)]
#[case("Round(2.4)", 2.0)]
fn test_builtins(#[case] source: &str, #[case] expected: f64) {
    assert_eq!(evaluate(source).unwrap(), Value::Float(expected));
}

#[test]
fn test_round_away_from_zero_is_inert() {
    // The flag is accepted but `round` keeps rounding ties to even
    let expr = Expression::new("Round(2.5)", EvaluateOptions::ROUND_AWAY_FROM_ZERO);
    assert_eq!(expr.evaluate().unwrap(), Value::Float(2.0));
}

#[test]
fn test_builtin_names_are_case_sensitive() {
    assert!(matches!(
        evaluate("abs(-1)").unwrap_err(),
        EvalError::FunctionNotFound { suggestion: Some("Abs"), .. }
    ));
    assert_eq!(evaluate("Abs(-1)").unwrap(), Value::Float(1.0));
    for source in ["abs(-1)", "ABS(-1)"] {
        let expr = Expression::new(source, EvaluateOptions::IGNORE_CASE);
        assert_eq!(expr.evaluate().unwrap(), Value::Float(1.0));
    }
}

#[test]
fn test_unknown_function() {
    assert_eq!(
        evaluate("frobnicate(1)").unwrap_err(),
        EvalError::function_not_found("frobnicate")
    );
}

#[rstest]
#[case("Abs()", 1, 0, false)]
#[case("Pow(1)", 2, 1, false)]
#[case("Max(1, 2, 3)", 2, 3, false)]
#[case("in(1)", 2, 1, true)]
#[case("In(1)", 2, 1, true)]
fn test_argument_count(
    #[case] source: &str,
    #[case] expected: usize,
    #[case] provided: usize,
    #[case] at_least: bool,
) {
    match evaluate(source).unwrap_err() {
        EvalError::ArgumentCountMismatch {
            expected: e,
            provided: p,
            at_least: a,
            ..
        } => assert_eq!((e, p, a), (expected, provided, at_least)),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_in_membership() {
    assert_eq!(evaluate("2 in (1,2,3)").unwrap(), Value::Boolean(true));
    assert_eq!(evaluate("5 in (1,2,3)").unwrap(), Value::Boolean(false));
    assert_eq!(evaluate("in('b', 'a', 'b')").unwrap(), Value::Boolean(true));
    assert_eq!(evaluate("In(3, 1, 2)").unwrap(), Value::Boolean(false));
}

#[test]
fn test_in_matches_structurally() {
    assert_eq!(evaluate("2 in (2.0)").unwrap(), Value::Boolean(false));
}

#[test]
fn test_in_stops_at_first_match() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let expr = Expression::new("2 in (a, b, c)", EvaluateOptions::NONE).on_parameter(move |name| {
        log.lock().unwrap().push(name.to_string());
        Ok(Some(Value::Integer(if name == "b" { 2 } else { 0 })))
    });

    assert_eq!(expr.evaluate().unwrap(), Value::Boolean(true));
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_in_haystack_after_match_is_never_evaluated() {
    assert_eq!(evaluate("1 in (1, 1/0)").unwrap(), Value::Boolean(true));
}

#[test]
fn test_function_hook_runs_before_builtins() {
    let expr = Expression::new("Abs(-1)", EvaluateOptions::NONE)
        .on_function(|name, _| Ok((name == "Abs").then_some(Value::from("hooked"))));
    assert_eq!(expr.evaluate().unwrap(), Value::from("hooked"));
}

#[test]
fn test_function_hook_receives_unevaluated_args() {
    let expr = Expression::new("first(1, 1/0)", EvaluateOptions::NONE).on_function(|name, args| {
        if name != "first" {
            return Ok(None);
        }
        assert_eq!(args.len(), 2);
        args.evaluate(0).map(Some)
    });
    assert_eq!(expr.evaluate().unwrap(), Value::Integer(1));
}

#[test]
fn test_function_hook_sees_lowercased_name_under_ignore_case() {
    let expr = Expression::new("MyFunc()", EvaluateOptions::IGNORE_CASE)
        .on_function(|name, _| Ok(Some(Value::from(name))));
    assert_eq!(expr.evaluate().unwrap(), Value::from("myfunc"));
}

#[test]
fn test_function_hook_declining_falls_through() {
    let expr = Expression::new("Abs(-2)", EvaluateOptions::NONE).on_function(|_, _| Ok(None));
    assert_eq!(expr.evaluate().unwrap(), Value::Float(2.0));
}

// ============================================================================
// Conversions during evaluation
// ============================================================================

#[test]
fn test_condition_must_convert_to_boolean() {
    assert!(matches!(
        evaluate("'maybe' ? 1 : 2").unwrap_err(),
        EvalError::Conversion(ConversionError::InvalidCast { .. })
    ));
    assert_eq!(evaluate("1 ? 'yes' : 'no'").unwrap(), Value::from("yes"));
}

#[test]
fn test_integer_overflow_is_an_error() {
    assert!(matches!(
        evaluate("9223372036854775807 + 1").unwrap_err(),
        EvalError::Conversion(ConversionError::Overflow { .. })
    ));
}
