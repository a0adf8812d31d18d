//! Process-wide cache of compiled syntax trees, keyed by source text.
//!
//! Entries are weak: the cache never keeps a tree alive on its own. Once
//! every expression holding a tree is dropped the entry goes dead, and the
//! next lookup of that text misses and recompiles.

use std::{
    collections::HashMap,
    sync::{
        Arc, PoisonError, RwLock, Weak,
        atomic::{AtomicBool, Ordering},
    },
};

use once_cell::sync::Lazy;

use crate::ast::Expr;

static CACHE: Lazy<RwLock<HashMap<String, Weak<Expr>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Returns the live tree compiled from `source`, if any.
pub fn lookup(source: &str) -> Option<Arc<Expr>> {
    if !is_enabled() {
        return None;
    }

    let cache = CACHE.read().unwrap_or_else(PoisonError::into_inner);
    let tree = cache.get(source)?.upgrade();
    match &tree {
        Some(_) => tracing::trace!(source, "expression retrieved from cache"),
        None => tracing::trace!(source, "cached expression was released"),
    }
    tree
}

/// Records `tree` as the compiled form of `source`, then drops every
/// entry whose tree has been released.
///
/// Racing inserts of the same text are harmless: the last writer wins.
pub fn insert(source: &str, tree: &Arc<Expr>) {
    if !is_enabled() {
        return;
    }

    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    cache.insert(source.to_string(), Arc::downgrade(tree));
    tracing::trace!(source, "expression added to cache");

    let before = cache.len();
    cache.retain(|_, entry| entry.strong_count() > 0);
    let released = before - cache.len();
    if released > 0 {
        tracing::debug!(released, "swept released expressions from cache");
    }
}

/// Turns the cache on or off for the whole process. Turning it off
/// clears every entry.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::SeqCst);
    if !enabled {
        clear();
    }
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::SeqCst)
}

pub fn clear() {
    CACHE.write().unwrap_or_else(PoisonError::into_inner).clear();
}

/// Number of entries whose tree is still alive.
pub fn len() -> usize {
    CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .values()
        .filter(|entry| entry.strong_count() > 0)
        .count()
}

pub fn is_empty() -> bool {
    len() == 0
}
