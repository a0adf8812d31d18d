use crate::{
    ast::{BinOp, Expr, UnaryOp},
    value::Value,
};

/// A consumer of the syntax tree, with one handler per node variant.
///
/// [`Expr::accept`] performs the dispatch, so consumers such as the
/// evaluator and the printer never match on node types themselves.
/// Handlers take `&self`: a consumer that evaluates function arguments on
/// demand hands out shared references to itself while a call is resolving.
pub trait Visitor {
    type Output;

    fn visit_value(&self, value: &Value) -> Self::Output;

    fn visit_identifier(&self, name: &str) -> Self::Output;

    fn visit_unary(&self, op: UnaryOp, operand: &Expr) -> Self::Output;

    fn visit_binary(&self, op: BinOp, left: &Expr, right: &Expr) -> Self::Output;

    fn visit_ternary(&self, condition: &Expr, when_true: &Expr, when_false: &Expr) -> Self::Output;

    fn visit_call(&self, name: &str, args: &[Expr]) -> Self::Output;
}
