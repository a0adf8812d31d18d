use std::fmt;

use crate::{
    ast::{BinOp, UnaryOp, Visitor},
    printer::Printer,
    value::Value,
};

/// Abstract Syntax Tree node representing a parsed expression.
///
/// Trees are immutable once built; compiled trees are shared behind an
/// `Arc` between every expression compiled from the same text.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 2.5
    /// 'text'
    /// true
    /// #2024-01-31#
    /// ```
    Value(Value),

    /// Named parameter
    ///
    /// # Examples
    /// ```text
    /// price            // Identifier("price")
    /// [unit price]     // Identifier("unit price")
    /// ```
    Identifier(String),

    /// Prefix operation
    ///
    /// # Examples
    /// ```text
    /// -x
    /// !enabled
    /// ~mask
    /// ```
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Infix operation
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Conditional `condition ? when_true : when_false`
    Ternary {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },

    /// Function call; arguments are evaluated by whoever resolves the call
    ///
    /// # Examples
    /// ```text
    /// Abs(-1)          // Call { name: "Abs", args: [-1] }
    /// 2 in (1, 2, 3)   // Call { name: "In", args: [2, 1, 2, 3] }
    /// ```
    Call { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Value(value.into())
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier(name.into())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn ternary(condition: Expr, when_true: Expr, when_false: Expr) -> Self {
        Expr::Ternary {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    /// Dispatches to the visitor handler matching this node's variant.
    pub fn accept<V: Visitor>(&self, visitor: &V) -> V::Output {
        match self {
            Expr::Value(value) => visitor.visit_value(value),
            Expr::Identifier(name) => visitor.visit_identifier(name),
            Expr::Unary { op, operand } => visitor.visit_unary(*op, operand),
            Expr::Binary { op, left, right } => visitor.visit_binary(*op, left, right),
            Expr::Ternary {
                condition,
                when_true,
                when_false,
            } => visitor.visit_ternary(condition, when_true, when_false),
            Expr::Call { name, args } => visitor.visit_call(name, args),
        }
    }

    /// Names of every identifier referenced in the tree, in first-seen order.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.accept(&ParameterNames) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.accept(&Printer))
    }
}

/// Collects identifier names; call names are not parameters.
struct ParameterNames;

impl Visitor for ParameterNames {
    type Output = Vec<String>;

    fn visit_value(&self, _value: &Value) -> Self::Output {
        Vec::new()
    }

    fn visit_identifier(&self, name: &str) -> Self::Output {
        vec![name.to_string()]
    }

    fn visit_unary(&self, _op: UnaryOp, operand: &Expr) -> Self::Output {
        operand.accept(self)
    }

    fn visit_binary(&self, _op: BinOp, left: &Expr, right: &Expr) -> Self::Output {
        let mut names = left.accept(self);
        names.extend(right.accept(self));
        names
    }

    fn visit_ternary(&self, condition: &Expr, when_true: &Expr, when_false: &Expr) -> Self::Output {
        let mut names = condition.accept(self);
        names.extend(when_true.accept(self));
        names.extend(when_false.accept(self));
        names
    }

    fn visit_call(&self, _name: &str, args: &[Expr]) -> Self::Output {
        args.iter().flat_map(|arg| arg.accept(self)).collect()
    }
}
