use std::{fmt, ops};

/// Independent flags controlling compilation and evaluation.
///
/// ```
/// use formula_lang::EvaluateOptions;
///
/// let options = EvaluateOptions::IGNORE_CASE | EvaluateOptions::NO_CACHE;
/// assert!(options.contains(EvaluateOptions::IGNORE_CASE));
/// assert!(!options.contains(EvaluateOptions::ITERATE_PARAMETERS));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EvaluateOptions(u8);

impl EvaluateOptions {
    pub const NONE: Self = EvaluateOptions(0);

    /// Builtin names match regardless of case, and the function hook sees
    /// the name lowercased.
    pub const IGNORE_CASE: Self = EvaluateOptions(1);

    /// Compile privately instead of going through the shared cache.
    pub const NO_CACHE: Self = EvaluateOptions(1 << 1);

    /// Broadcast over every array binding.
    pub const ITERATE_PARAMETERS: Self = EvaluateOptions(1 << 2);

    /// Reserved. `round` does not consult it.
    pub const ROUND_AWAY_FROM_ZERO: Self = EvaluateOptions(1 << 3);

    const NAMED: [(Self, &'static str); 4] = [
        (Self::IGNORE_CASE, "IGNORE_CASE"),
        (Self::NO_CACHE, "NO_CACHE"),
        (Self::ITERATE_PARAMETERS, "ITERATE_PARAMETERS"),
        (Self::ROUND_AWAY_FROM_ZERO, "ROUND_AWAY_FROM_ZERO"),
    ];

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl ops::BitOr for EvaluateOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        EvaluateOptions(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for EvaluateOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.insert(rhs);
    }
}

impl fmt::Debug for EvaluateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join(" | "))
    }
}

#[test]
fn test_debug_lists_flags() {
    let options = EvaluateOptions::NO_CACHE | EvaluateOptions::ITERATE_PARAMETERS;
    assert_eq!(format!("{:?}", options), "NO_CACHE | ITERATE_PARAMETERS");
    assert_eq!(format!("{:?}", EvaluateOptions::NONE), "NONE");
}

#[test]
fn test_insert_and_remove() {
    let mut options = EvaluateOptions::NONE;
    options |= EvaluateOptions::IGNORE_CASE;
    assert!(options.contains(EvaluateOptions::IGNORE_CASE));
    options.remove(EvaluateOptions::IGNORE_CASE);
    assert!(options.is_empty());
}
