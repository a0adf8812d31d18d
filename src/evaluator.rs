use std::{borrow::Cow, fmt, sync::Arc};

use once_cell::unsync::OnceCell;

use crate::{
    ast::{BinOp, Expr, UnaryOp, Visitor},
    builtins, conversion,
    error::EvalError,
    options::EvaluateOptions,
    value::{Parameters, Value},
};

/// Host callback consulted for every call before the builtin table.
///
/// Receives the call name (lowercased under
/// [`EvaluateOptions::IGNORE_CASE`]) and the unevaluated arguments.
/// Returning `Ok(None)` passes the call on to the builtins.
pub type FunctionHook =
    Arc<dyn Fn(&str, &FunctionArgs<'_>) -> Result<Option<Value>, EvalError> + Send + Sync>;

/// Host callback consulted for identifiers missing from the bindings.
pub type ParameterHook = Arc<dyn Fn(&str) -> Result<Option<Value>, EvalError> + Send + Sync>;

/// The two host extension points. The first responder wins: a hook
/// that returns a value ends resolution.
#[derive(Clone, Default)]
pub struct Hooks {
    pub function: Option<FunctionHook>,
    pub parameter: Option<ParameterHook>,
}

impl Hooks {
    pub fn on_function<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &FunctionArgs<'_>) -> Result<Option<Value>, EvalError> + Send + Sync + 'static,
    {
        self.function = Some(Arc::new(hook));
        self
    }

    pub fn on_parameter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Result<Option<Value>, EvalError> + Send + Sync + 'static,
    {
        self.parameter = Some(Arc::new(hook));
        self
    }

    /// Keeps each of `self`'s hooks, filling gaps from `fallback`.
    pub fn or(&self, fallback: &Hooks) -> Hooks {
        Hooks {
            function: self.function.clone().or_else(|| fallback.function.clone()),
            parameter: self.parameter.clone().or_else(|| fallback.parameter.clone()),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("function", &self.function.is_some())
            .field("parameter", &self.parameter.is_some())
            .finish()
    }
}

/// Tree-walking evaluator over one set of bindings.
///
/// The evaluator borrows everything it needs and holds no result state;
/// each `visit_*` returns its value directly.
pub struct Evaluator<'a> {
    parameters: &'a Parameters,
    hooks: &'a Hooks,
    options: EvaluateOptions,
}

impl<'a> Evaluator<'a> {
    pub fn new(parameters: &'a Parameters, hooks: &'a Hooks, options: EvaluateOptions) -> Self {
        Evaluator {
            parameters,
            hooks,
            options,
        }
    }

    pub fn evaluate(&self, expr: &Expr) -> Result<Value, EvalError> {
        expr.accept(self)
    }

    pub fn parameters(&self) -> &'a Parameters {
        self.parameters
    }

    pub fn options(&self) -> EvaluateOptions {
        self.options
    }
}

/// An operand evaluated at most once, on first demand.
struct Thunk<'e, 'v> {
    node: &'e Expr,
    evaluator: &'e Evaluator<'v>,
    value: OnceCell<Value>,
}

impl<'e, 'v> Thunk<'e, 'v> {
    fn new(node: &'e Expr, evaluator: &'e Evaluator<'v>) -> Self {
        Thunk {
            node,
            evaluator,
            value: OnceCell::new(),
        }
    }

    fn force(&self) -> Result<&Value, EvalError> {
        self.value.get_or_try_init(|| self.node.accept(self.evaluator))
    }

    fn force_bool(&self) -> Result<bool, EvalError> {
        Ok(conversion::to_bool(self.force()?)?)
    }
}

impl Visitor for Evaluator<'_> {
    type Output = Result<Value, EvalError>;

    fn visit_value(&self, value: &Value) -> Self::Output {
        Ok(value.clone())
    }

    fn visit_identifier(&self, name: &str) -> Self::Output {
        if let Some(bound) = self.parameters.get(name) {
            return match bound {
                Value::Expression(nested) => nested.evaluate_nested(self.parameters, self.hooks),
                other => Ok(other.clone()),
            };
        }

        if let Some(hook) = &self.hooks.parameter
            && let Some(value) = hook(name)?
        {
            return Ok(value);
        }

        Err(EvalError::ParameterNotDefined(name.to_string()))
    }

    fn visit_unary(&self, op: UnaryOp, operand: &Expr) -> Self::Output {
        let value = operand.accept(self)?;
        Ok(conversion::unary(op, &value)?)
    }

    fn visit_binary(&self, op: BinOp, left: &Expr, right: &Expr) -> Self::Output {
        let lhs = Thunk::new(left, self);
        let rhs = Thunk::new(right, self);

        match op {
            BinOp::And => Ok(Value::Boolean(lhs.force_bool()? && rhs.force_bool()?)),
            BinOp::Or => Ok(Value::Boolean(lhs.force_bool()? || rhs.force_bool()?)),
            _ => Ok(conversion::binary(op, lhs.force()?, rhs.force()?)?),
        }
    }

    fn visit_ternary(&self, condition: &Expr, when_true: &Expr, when_false: &Expr) -> Self::Output {
        let condition = condition.accept(self)?;
        if conversion::to_bool(&condition)? {
            when_true.accept(self)
        } else {
            when_false.accept(self)
        }
    }

    fn visit_call(&self, name: &str, args: &[Expr]) -> Self::Output {
        let args = FunctionArgs::new(args, self);

        if let Some(hook) = &self.hooks.function {
            let hook_name = if self.options.contains(EvaluateOptions::IGNORE_CASE) {
                Cow::Owned(name.to_lowercase())
            } else {
                Cow::Borrowed(name)
            };
            if let Some(value) = hook(&*hook_name, &args)? {
                return Ok(value);
            }
        }

        builtins::call(name, &args)
    }
}

/// The unevaluated arguments of a call, with the means to evaluate them.
///
/// Handed to the function hook and to builtins so each decides which
/// arguments to evaluate and when.
pub struct FunctionArgs<'a> {
    nodes: &'a [Expr],
    evaluator: &'a Evaluator<'a>,
}

impl<'a> FunctionArgs<'a> {
    pub fn new(nodes: &'a [Expr], evaluator: &'a Evaluator<'a>) -> Self {
        FunctionArgs { nodes, evaluator }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &'a [Expr] {
        self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&'a Expr> {
        self.nodes.get(index)
    }

    /// Evaluates argument `index` with the caller's bindings and hooks.
    pub fn evaluate(&self, index: usize) -> Result<Value, EvalError> {
        match self.nodes.get(index) {
            Some(node) => node.accept(self.evaluator),
            None => Err(EvalError::host(format!(
                "argument {} is out of range ({} provided)",
                index,
                self.nodes.len()
            ))),
        }
    }

    pub fn evaluate_all(&self) -> Result<Vec<Value>, EvalError> {
        self.nodes.iter().map(|node| node.accept(self.evaluator)).collect()
    }

    /// The evaluator running the call, for its bindings and options.
    pub fn evaluator(&self) -> &'a Evaluator<'a> {
        self.evaluator
    }
}

/// Evaluates `expr` once per row of the array bindings.
///
/// Every `Value::Array` binding is a column; all columns must share a
/// length. Row `i` rebinds each column to its `i`th element and leaves
/// the other bindings untouched. The results come back in row order.
/// With no columns at all the result is an empty array.
pub fn broadcast(
    expr: &Expr,
    parameters: &Parameters,
    hooks: &Hooks,
    options: EvaluateOptions,
) -> Result<Value, EvalError> {
    let mut columns: Vec<(&str, &[Value])> = parameters
        .iter()
        .filter_map(|(name, value)| value.as_array().map(|items| (name.as_str(), items)))
        .collect();
    // Deterministic error reporting
    columns.sort_by_key(|(name, _)| *name);

    let rows = match columns.first() {
        Some((_, items)) => items.len(),
        None => return Ok(Value::Array(Vec::new())),
    };

    if let Some((name, items)) = columns.iter().find(|(_, items)| items.len() != rows) {
        return Err(EvalError::InconsistentIterableLength {
            parameter: name.to_string(),
            expected: rows,
            found: items.len(),
        });
    }

    tracing::debug!(columns = columns.len(), rows, "broadcasting expression");

    let mut row_parameters = parameters.clone();
    let mut results = Vec::with_capacity(rows);
    for row in 0..rows {
        for (name, items) in &columns {
            row_parameters.insert(name.to_string(), items[row].clone());
        }
        let evaluator = Evaluator::new(&row_parameters, hooks, options);
        results.push(evaluator.evaluate(expr)?);
    }

    Ok(Value::Array(results))
}
