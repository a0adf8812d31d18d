use crate::{
    ast::{BinOp, Expr, UnaryOp, Visitor},
    value::Value,
};

/// Re-serializes a syntax tree into source text.
///
/// The output parses back to the same tree. Identifiers are always
/// bracketed and every compound operand is parenthesised, so the text
/// never depends on precedence or associativity:
///
/// ```
/// use formula_lang::parser;
///
/// let expr = parser::parse("a || b || c").unwrap();
/// assert_eq!(expr.to_string(), "[a] or ([b] or [c])");
/// ```
pub struct Printer;

impl Printer {
    fn operand(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary { .. } | Expr::Ternary { .. } => format!("({})", expr.accept(self)),
            _ => expr.accept(self),
        }
    }
}

fn is_keyword(name: &str) -> bool {
    matches!(name, "true" | "false" | "and" | "or" | "not" | "in")
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

impl Visitor for Printer {
    type Output = String;

    fn visit_value(&self, value: &Value) -> String {
        match value {
            Value::String(s) => quote(s),
            // `{:?}` keeps the decimal point so floats stay floats
            Value::Float(n) => format!("{:?}", n),
            Value::DateTime(dt) => format!("#{}#", dt),
            other => other.to_string(),
        }
    }

    fn visit_identifier(&self, name: &str) -> String {
        format!("[{}]", name)
    }

    fn visit_unary(&self, op: UnaryOp, operand: &Expr) -> String {
        let operand = match operand {
            Expr::Value(_) | Expr::Identifier(_) | Expr::Call { .. } => operand.accept(self),
            _ => format!("({})", operand.accept(self)),
        };
        format!("{}{}", op.symbol(), operand)
    }

    fn visit_binary(&self, op: BinOp, left: &Expr, right: &Expr) -> String {
        format!("{} {} {}", self.operand(left), op.symbol(), self.operand(right))
    }

    fn visit_ternary(&self, condition: &Expr, when_true: &Expr, when_false: &Expr) -> String {
        format!(
            "{} ? {} : {}",
            self.operand(condition),
            self.operand(when_true),
            self.operand(when_false)
        )
    }

    fn visit_call(&self, name: &str, args: &[Expr]) -> String {
        let args: Vec<String> = args.iter().map(|arg| arg.accept(self)).collect();
        if is_bare_identifier(name) && !is_keyword(name) {
            format!("{}({})", name, args.join(", "))
        } else {
            format!("[{}]({})", name, args.join(", "))
        }
    }
}
