//! CLI support for formula-lang
//!
//! Provides programmatic access to the `formula` command so other tools can
//! embed the same checks.

mod check;
mod convert;
mod functions;

pub use check::{CheckOptions, CheckResult, execute_check, parse_param};
pub use convert::{json_to_value, value_to_json};
pub use functions::functions_listing;

use std::io;

use crate::{CompileError, EvalError};

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Syntax error:\n{0}")]
    Compile(#[from] CompileError),

    #[error("Evaluation error: {0}")]
    Eval(EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Bindings must be a JSON object of name to value
    #[error("Bindings must be a JSON object, found {0}")]
    BindingsNotObject(&'static str),

    /// Objects have no counterpart among formula values
    #[error("Unsupported value for '{0}': objects cannot be bound")]
    UnsupportedValue(String),

    #[error("Invalid parameter '{0}': expected name=JSON")]
    InvalidParam(String),
}

impl From<EvalError> for CliError {
    fn from(e: EvalError) -> Self {
        match e {
            EvalError::Compile(e) => CliError::Compile(e),
            other => CliError::Eval(other),
        }
    }
}
