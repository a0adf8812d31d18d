//! An embeddable expression language.
//!
//! Hosts compile small formulas such as `a + b * 2` or
//! `f(x) > 0 ? 1 : -1` once and evaluate them repeatedly against runtime
//! bindings. Unknown parameters and functions are resolved through
//! host-supplied hooks.
//!
//! ```
//! use formula_lang::{EvaluateOptions, Expression, Value};
//!
//! assert_eq!(formula_lang::evaluate("2 + 3 * 4").unwrap(), Value::Integer(14));
//!
//! let expr = Expression::new("double(x)", EvaluateOptions::NONE)
//!     .with_parameter("x", 21)
//!     .on_function(|name, args| match name {
//!         "double" => {
//!             let x = args.evaluate(0)?;
//!             Ok(Some(formula_lang::conversion::multiply(&x, &Value::Integer(2))?))
//!         }
//!         _ => Ok(None),
//!     });
//! assert_eq!(expr.evaluate().unwrap(), Value::Integer(42));
//! ```
pub mod ast;
pub mod builtins;
pub mod cache;
pub mod conversion;
pub mod datetime;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod printer;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{BinOp, Expr, Token, TokenKind, UnaryOp, Visitor};
pub use datetime::DateTime;
pub use error::{CompileError, ConversionError, EvalError, LexError, ParseError};
pub use evaluator::{Evaluator, FunctionArgs, FunctionHook, Hooks, ParameterHook};
pub use expression::Expression;
pub use lexer::{Lexer, Position};
pub use options::EvaluateOptions;
pub use parser::Parser;
pub use printer::Printer;
pub use value::{Parameters, Value, ValueKind};

/// Compiles and evaluates `source` with no bindings and default options.
pub fn evaluate(source: &str) -> Result<Value, EvalError> {
    Expression::new(source, EvaluateOptions::NONE).evaluate()
}
