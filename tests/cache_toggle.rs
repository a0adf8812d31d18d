// tests/cache_toggle.rs
//
// Toggling the cache is process-wide, so this lives in its own test binary.

use std::sync::Arc;

use formula_lang::{EvaluateOptions, Expression, cache};

#[test]
fn test_disabling_cache_clears_and_bypasses_it() {
    let kept = Expression::compile("toggle + 1", false).unwrap();
    assert!(cache::len() >= 1);

    cache::set_enabled(false);
    assert!(!cache::is_enabled());
    assert!(cache::is_empty());

    let recompiled = Expression::compile("toggle + 1", false).unwrap();
    assert!(!Arc::ptr_eq(&kept, &recompiled));
    assert!(cache::is_empty());

    cache::set_enabled(true);
    let first = Expression::new("toggle + 2", EvaluateOptions::NONE);
    let second = Expression::new("toggle + 2", EvaluateOptions::NONE);
    assert!(Arc::ptr_eq(first.parsed().unwrap(), second.parsed().unwrap()));
    assert_eq!(cache::len(), 1);
}
