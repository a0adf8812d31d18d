// tests/expression_tests.rs

use std::sync::Arc;

use formula_lang::{
    BinOp, EvalError, EvaluateOptions, Expr, Expression, Parameters, Value, cache,
};

fn bindings(pairs: &[(&str, Value)]) -> Parameters {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

// ============================================================================
// Compilation and caching
// ============================================================================

#[test]
fn test_same_text_shares_compiled_tree() {
    let first = Expression::new("cache_shared + 1", EvaluateOptions::NONE);
    let second = Expression::new("cache_shared + 1", EvaluateOptions::NONE);

    let a = first.parsed().unwrap();
    let b = second.parsed().unwrap();
    assert!(Arc::ptr_eq(a, b));
}

#[test]
fn test_no_cache_recompiles() {
    let first = Expression::new("cache_private + 1", EvaluateOptions::NO_CACHE);
    let second = Expression::new("cache_private + 1", EvaluateOptions::NO_CACHE);

    let a = first.parsed().unwrap();
    let b = second.parsed().unwrap();
    assert!(!Arc::ptr_eq(a, b));
    assert_eq!(a, b);
}

#[test]
fn test_compile_entry_point() {
    let a = Expression::compile("cache_compile * 2", false).unwrap();
    let b = Expression::compile("cache_compile * 2", false).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let c = Expression::compile("cache_compile * 2", true).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
}

#[test]
fn test_released_tree_is_recompiled() {
    let first = Expression::compile("cache_released - 1", false).unwrap();
    let weak = Arc::downgrade(&first);
    drop(first);
    assert!(weak.upgrade().is_none());

    // Nothing keeps the old tree alive, so this is a fresh compile
    let second = Expression::compile("cache_released - 1", false).unwrap();
    assert_eq!(*second, Expr::binary(BinOp::Subtract, Expr::identifier("cache_released"), Expr::value(1)));
}

#[test]
fn test_failed_compile_is_not_cached() {
    let expr = Expression::new("cache_broken +", EvaluateOptions::NONE);
    assert!(expr.has_errors());
    assert!(cache::lookup("cache_broken +").is_none());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_has_errors_does_not_fail() {
    let bad = Expression::new("(1 + ", EvaluateOptions::NONE);
    assert!(bad.has_errors());
    assert!(bad.error().is_some());
    assert!(bad.parsed().is_none());

    let good = Expression::new("1 + 1", EvaluateOptions::NONE);
    assert!(!good.has_errors());
    assert!(good.error().is_none());
}

#[test]
fn test_evaluate_reports_every_compile_error() {
    let bad = Expression::new("(1 + ) * (2 +", EvaluateOptions::NONE);
    let err = bad.evaluate().unwrap_err();
    let EvalError::Compile(compile) = &err else {
        panic!("expected a compile error, got {}", err);
    };
    assert!(compile.len() >= 2);
    assert_eq!(err.to_string(), compile.to_string());
}

#[test]
fn test_empty_expression() {
    let err = Expression::new("", EvaluateOptions::NONE).evaluate().unwrap_err();
    assert!(err.to_string().contains("expression can't be empty"));
}

// ============================================================================
// Bindings
// ============================================================================

#[test]
fn test_call_bindings_override_own() {
    let expr = Expression::new("x + y", EvaluateOptions::NONE)
        .with_parameter("x", 1)
        .with_parameter("y", 2);
    assert_eq!(expr.evaluate().unwrap(), Value::Integer(3));
    assert_eq!(
        expr.evaluate_with(&bindings(&[("y", Value::Integer(10))])).unwrap(),
        Value::Integer(11)
    );
}

#[test]
fn test_parameter_names() {
    let expr = Expression::new("a + f(b, a) * [c d]", EvaluateOptions::NONE);
    assert_eq!(expr.parameter_names(), vec!["a", "b", "c d"]);
    assert!(Expression::new("1 +", EvaluateOptions::NONE).parameter_names().is_empty());
}

#[test]
fn test_from_ast() {
    let tree = Expr::binary(BinOp::Multiply, Expr::identifier("n"), Expr::value(3));
    let expr = Expression::from_ast(tree, EvaluateOptions::NONE).with_parameter("n", 5);
    assert_eq!(expr.source(), "[n] * 3");
    assert_eq!(expr.evaluate().unwrap(), Value::Integer(15));
}

#[test]
fn test_expression_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Expression>();
}

#[test]
fn test_evaluation_across_threads() {
    let expr = Arc::new(Expression::new("n * n", EvaluateOptions::NONE));
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let expr = Arc::clone(&expr);
            std::thread::spawn(move || expr.evaluate_with(&bindings(&[("n", Value::Integer(n))])))
        })
        .collect();

    let results: Vec<Value> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();
    assert_eq!(
        results,
        vec![Value::Integer(0), Value::Integer(1), Value::Integer(4), Value::Integer(9)]
    );
}

// ============================================================================
// Broadcast
// ============================================================================

#[test]
fn test_broadcast_over_columns() {
    let expr = Expression::new("a + b", EvaluateOptions::ITERATE_PARAMETERS);
    let result = expr
        .evaluate_with(&bindings(&[
            ("a", Value::from(vec![1, 2, 3])),
            ("b", Value::from(vec![10, 20, 30])),
        ]))
        .unwrap();
    assert_eq!(result, Value::from(vec![11, 22, 33]));
}

#[test]
fn test_broadcast_reuses_scalars() {
    let expr = Expression::new("a * k", EvaluateOptions::ITERATE_PARAMETERS).with_parameter("k", 2);
    let result = expr
        .evaluate_with(&bindings(&[("a", Value::from(vec![1, 2]))]))
        .unwrap();
    assert_eq!(result, Value::from(vec![2, 4]));
}

#[test]
fn test_broadcast_length_mismatch() {
    let expr = Expression::new("a + b", EvaluateOptions::ITERATE_PARAMETERS);
    let err = expr
        .evaluate_with(&bindings(&[
            ("a", Value::from(vec![1, 2])),
            ("b", Value::from(vec![10, 20, 30])),
        ]))
        .unwrap_err();
    assert_eq!(
        err,
        EvalError::InconsistentIterableLength {
            parameter: "b".into(),
            expected: 2,
            found: 3,
        }
    );
}

#[test]
fn test_broadcast_without_columns_is_empty() {
    let expr = Expression::new("1 + 1", EvaluateOptions::ITERATE_PARAMETERS);
    assert_eq!(expr.evaluate().unwrap(), Value::Array(vec![]));
}

#[test]
fn test_broadcast_failure_aborts_everything() {
    let expr = Expression::new("10 / a", EvaluateOptions::ITERATE_PARAMETERS);
    assert!(expr
        .evaluate_with(&bindings(&[("a", Value::from(vec![1, 0, 2]))]))
        .is_err());
}

// ============================================================================
// Formatting
// ============================================================================

#[test]
fn test_display_is_source_text() {
    let expr = Expression::from("1+2");
    assert_eq!(expr.to_string(), "1+2");
}
