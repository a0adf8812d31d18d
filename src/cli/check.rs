//! Compile and evaluate formulas against JSON bindings

use crate::{EvaluateOptions, Expression, Parameters, parser};

use super::{CliError, json_to_value, value_to_json};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The formula to evaluate
    pub expression: String,
    /// JSON object of bindings
    pub bindings: Option<String>,
    /// Individual `name=JSON` bindings, applied over `bindings`
    pub params: Vec<String>,
    /// Broadcast over array bindings
    pub iterate: bool,
    pub ignore_case: bool,
    pub no_cache: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Formula evaluated successfully
    Success(serde_json::Value),
}

/// Splits `name=JSON` into a binding.
pub fn parse_param(param: &str) -> Result<(String, crate::Value), CliError> {
    let (name, json) = param
        .split_once('=')
        .ok_or_else(|| CliError::InvalidParam(param.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidParam(param.to_string()));
    }
    let value = json_to_value(name, serde_json::from_str(json)?)?;
    Ok((name.to_string(), value))
}

fn parse_bindings(json: &str) -> Result<Parameters, CliError> {
    let object = match serde_json::from_str(json)? {
        serde_json::Value::Object(object) => object,
        serde_json::Value::Null => return Err(CliError::BindingsNotObject("null")),
        serde_json::Value::Bool(_) => return Err(CliError::BindingsNotObject("a boolean")),
        serde_json::Value::Number(_) => return Err(CliError::BindingsNotObject("a number")),
        serde_json::Value::String(_) => return Err(CliError::BindingsNotObject("a string")),
        serde_json::Value::Array(_) => return Err(CliError::BindingsNotObject("an array")),
    };

    object
        .into_iter()
        .map(|(name, value)| Ok((name.clone(), json_to_value(&name, value)?)))
        .collect()
}

/// Execute a formula check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.syntax_only {
        parser::parse(&options.expression)?;
        return Ok(CheckResult::SyntaxValid);
    }

    let mut bindings = match &options.bindings {
        Some(json) if !json.trim().is_empty() => parse_bindings(json)?,
        _ => Parameters::new(),
    };
    for param in &options.params {
        let (name, value) = parse_param(param)?;
        bindings.insert(name, value);
    }

    let mut flags = EvaluateOptions::NONE;
    if options.iterate {
        flags |= EvaluateOptions::ITERATE_PARAMETERS;
    }
    if options.ignore_case {
        flags |= EvaluateOptions::IGNORE_CASE;
    }
    if options.no_cache {
        flags |= EvaluateOptions::NO_CACHE;
    }

    let expression = Expression::new(options.expression.as_str(), flags);
    let result = expression.evaluate_with(&bindings)?;
    Ok(CheckResult::Success(value_to_json(result)))
}
