use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;

use crate::{
    ast::Expr,
    cache,
    error::{CompileError, EvalError},
    evaluator::{self, Evaluator, FunctionArgs, Hooks},
    options::EvaluateOptions,
    parser,
    value::{Parameters, Value},
};

/// A formula: source text compiled on first use, plus the bindings,
/// hooks and options it is evaluated with.
///
/// Compiled trees are shared through a process-wide cache keyed by source
/// text, so building many expressions from the same text parses it once.
///
/// # Examples
///
/// ```
/// use formula_lang::{EvaluateOptions, Expression, Value};
///
/// let expr = Expression::new("[unit price] * quantity", EvaluateOptions::NONE)
///     .with_parameter("unit price", 2.5)
///     .with_parameter("quantity", 4);
///
/// assert_eq!(expr.evaluate().unwrap(), Value::Float(10.0));
/// ```
#[derive(Clone)]
pub struct Expression {
    source: String,
    parsed: OnceCell<Result<Arc<Expr>, CompileError>>,
    options: EvaluateOptions,
    parameters: Parameters,
    hooks: Hooks,
}

impl Expression {
    pub fn new(source: impl Into<String>, options: EvaluateOptions) -> Self {
        Expression {
            source: source.into(),
            parsed: OnceCell::new(),
            options,
            parameters: Parameters::new(),
            hooks: Hooks::default(),
        }
    }

    /// Wraps an already-built tree. Nothing is parsed or cached.
    pub fn from_ast(tree: Expr, options: EvaluateOptions) -> Self {
        Expression {
            source: tree.to_string(),
            parsed: OnceCell::with_value(Ok(Arc::new(tree))),
            options,
            parameters: Parameters::new(),
            hooks: Hooks::default(),
        }
    }

    /// Compiles `source`, going through the shared cache unless
    /// `no_cache` is set.
    #[tracing::instrument(level = "debug", skip(source), fields(len = source.len()))]
    pub fn compile(source: &str, no_cache: bool) -> Result<Arc<Expr>, CompileError> {
        if !no_cache && let Some(tree) = cache::lookup(source) {
            return Ok(tree);
        }

        let tree = Arc::new(parser::parse(source)?);
        if !no_cache {
            cache::insert(source, &tree);
        }
        Ok(tree)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn options(&self) -> EvaluateOptions {
        self.options
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    /// Installs the function hook, consulted before the builtins.
    pub fn on_function<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &FunctionArgs<'_>) -> Result<Option<Value>, EvalError> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_function(hook);
        self
    }

    /// Installs the parameter hook, consulted for unbound identifiers.
    pub fn on_parameter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Result<Option<Value>, EvalError> + Send + Sync + 'static,
    {
        self.hooks = self.hooks.on_parameter(hook);
        self
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    fn compiled(&self) -> &Result<Arc<Expr>, CompileError> {
        self.parsed.get_or_init(|| {
            Self::compile(&self.source, self.options.contains(EvaluateOptions::NO_CACHE))
        })
    }

    /// Parses if needed and reports whether compilation failed.
    pub fn has_errors(&self) -> bool {
        self.compiled().is_err()
    }

    pub fn error(&self) -> Option<&CompileError> {
        self.compiled().as_ref().err()
    }

    /// The compiled tree, or `None` when compilation failed.
    pub fn parsed(&self) -> Option<&Arc<Expr>> {
        self.compiled().as_ref().ok()
    }

    /// Identifiers the formula refers to, in first-seen order.
    pub fn parameter_names(&self) -> Vec<String> {
        self.parsed().map(|tree| tree.parameter_names()).unwrap_or_default()
    }

    /// Evaluates against the expression's own bindings.
    pub fn evaluate(&self) -> Result<Value, EvalError> {
        self.evaluate_with(&Parameters::new())
    }

    /// Evaluates with `bindings` layered over the expression's own.
    ///
    /// Under [`EvaluateOptions::ITERATE_PARAMETERS`] the result is an
    /// array with one element per row of the array bindings.
    pub fn evaluate_with(&self, bindings: &Parameters) -> Result<Value, EvalError> {
        self.run(bindings, &self.hooks)
    }

    /// Evaluates as the value of an identifier in another expression.
    ///
    /// The caller's bindings win over this expression's own, and each of
    /// the caller's hooks replaces the matching one here.
    pub(crate) fn evaluate_nested(
        &self,
        caller_parameters: &Parameters,
        caller_hooks: &Hooks,
    ) -> Result<Value, EvalError> {
        let hooks = caller_hooks.or(&self.hooks);
        self.run(caller_parameters, &hooks)
    }

    fn run(&self, bindings: &Parameters, hooks: &Hooks) -> Result<Value, EvalError> {
        let tree = self.compiled().as_ref().map_err(|e| EvalError::Compile(e.clone()))?;

        let mut parameters = Parameters::with_capacity(self.parameters.len() + bindings.len() + 2);
        parameters.insert("null".to_string(), Value::Null);
        parameters.insert("NULL".to_string(), Value::Null);
        parameters.extend(self.parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        parameters.extend(bindings.iter().map(|(k, v)| (k.clone(), v.clone())));

        if self.options.contains(EvaluateOptions::ITERATE_PARAMETERS) {
            evaluator::broadcast(tree, &parameters, hooks, self.options)
        } else {
            Evaluator::new(&parameters, hooks, self.options).evaluate(tree)
        }
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("source", &self.source)
            .field("options", &self.options)
            .field("parameters", &self.parameters)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Two expressions are equal when they share source, options and
/// bindings. Hooks are not compared.
impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.options == other.options
            && self.parameters == other.parameters
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for Expression {
    fn from(source: &str) -> Self {
        Expression::new(source, EvaluateOptions::NONE)
    }
}
