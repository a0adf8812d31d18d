//! The fixed table of functions available to every expression.
//!
//! Numeric builtins evaluate all of their arguments, convert each to a
//! float and return a float. `In` is the exception: it evaluates the
//! needle once, then the haystack one argument at a time, and stops at
//! the first match.

use std::fmt;

use crate::{
    conversion,
    error::EvalError,
    evaluator::FunctionArgs,
    options::EvaluateOptions,
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, provided: usize) -> bool {
        match self {
            Arity::Exact(n) => provided == n,
            Arity::AtLeast(n) => provided >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{}+", n),
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Unary(fn(f64) -> f64),
    Binary(fn(f64, f64) -> f64),
    In,
}

#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub summary: &'static str,
    kind: Kind,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

const fn unary(name: &'static str, summary: &'static str, f: fn(f64) -> f64) -> Builtin {
    Builtin {
        name,
        arity: Arity::Exact(1),
        summary,
        kind: Kind::Unary(f),
    }
}

const fn binary(name: &'static str, summary: &'static str, f: fn(f64, f64) -> f64) -> Builtin {
    Builtin {
        name,
        arity: Arity::Exact(2),
        summary,
        kind: Kind::Binary(f),
    }
}

fn sign(x: f64) -> f64 {
    if x >= 0.0 { 1.0 } else { -1.0 }
}

/// Every builtin, by canonical name.
pub static BUILTINS: [Builtin; 19] = [
    unary("Abs", "absolute value", f64::abs),
    unary("Acos", "arc cosine, in radians", f64::acos),
    unary("Asin", "arc sine, in radians", f64::asin),
    unary("Atan", "arc tangent, in radians", f64::atan),
    unary("Ceil", "smallest integer not less than x", f64::ceil),
    unary("Cos", "cosine of an angle in radians", f64::cos),
    unary("Exp", "e raised to x", f64::exp),
    unary("Floor", "largest integer not greater than x", f64::floor),
    binary("Log", "logarithm of x in the given base", f64::log),
    unary("Log10", "base 10 logarithm", f64::log10),
    binary("Pow", "x raised to y", f64::powf),
    // Ties go to even whatever the options say
    unary("Round", "nearest integer, ties to even", f64::round_ties_even),
    unary("Sign", "1 when x >= 0, otherwise -1", sign),
    unary("Sin", "sine of an angle in radians", f64::sin),
    unary("Sqrt", "square root", f64::sqrt),
    unary("Tan", "tangent of an angle in radians", f64::tan),
    binary("Max", "larger of x and y", f64::max),
    binary("Min", "smaller of x and y", f64::min),
    Builtin {
        name: "In",
        arity: Arity::AtLeast(2),
        summary: "true when the first argument equals any of the others",
        kind: Kind::In,
    },
];

/// Finds the builtin called `name`.
///
/// Without `ignore_case` the spelling must match exactly; a name that
/// only differs by case fails with the canonical spelling as a hint.
pub fn lookup(name: &str, ignore_case: bool) -> Result<&'static Builtin, EvalError> {
    if let Some(builtin) = BUILTINS.iter().find(|b| b.name == name) {
        return Ok(builtin);
    }

    match BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name)) {
        Some(builtin) if ignore_case => Ok(builtin),
        Some(builtin) => Err(EvalError::FunctionNotFound {
            name: name.to_string(),
            suggestion: Some(builtin.name),
        }),
        None => Err(EvalError::function_not_found(name)),
    }
}

/// Resolves a call that no hook answered, honouring the calling
/// evaluator's options.
pub fn call(name: &str, args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let options = args.evaluator().options();
    let builtin = lookup(name, options.contains(EvaluateOptions::IGNORE_CASE))?;

    if !builtin.arity.accepts(args.len()) {
        let (expected, at_least) = match builtin.arity {
            Arity::Exact(n) => (n, false),
            Arity::AtLeast(n) => (n, true),
        };
        return Err(EvalError::ArgumentCountMismatch {
            function: builtin.name.to_string(),
            expected,
            provided: args.len(),
            at_least,
        });
    }

    match builtin.kind {
        Kind::Unary(f) => {
            let x = float_arg(args, 0)?;
            Ok(Value::Float(f(x)))
        }
        Kind::Binary(f) => {
            let x = float_arg(args, 0)?;
            let y = float_arg(args, 1)?;
            Ok(Value::Float(f(x, y)))
        }
        Kind::In => contains(args),
    }
}

fn float_arg(args: &FunctionArgs<'_>, index: usize) -> Result<f64, EvalError> {
    let value = args.evaluate(index)?;
    Ok(conversion::to_float(&value)?)
}

fn contains(args: &FunctionArgs<'_>) -> Result<Value, EvalError> {
    let needle = args.evaluate(0)?;
    for index in 1..args.len() {
        if args.evaluate(index)? == needle {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}
