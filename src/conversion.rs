//! Type coercion and operator semantics for dynamically-typed values.
//!
//! Every operator the evaluator applies lands in one of the functions in
//! this module. The rules:
//!
//! | Operands | Result |
//! |---|---|
//! | `Integer ⊕ Integer` | `Integer` (checked; overflow is an error) |
//! | `Integer ⊕ Float`, `Float ⊕ Float` | `Float` |
//! | `Integer / Integer` | `Integer` when exact, `Float` otherwise |
//! | `String + any`, `any + String` | concatenation |
//! | comparisons | numbers widen, strings ordinal, dates chronological |
//! | `==` across unrelated kinds | `false` |
//! | `& \| ^` | integers, or booleans |
//! | `<< >> ~` | integers |
//!
//! Mixed integer/float arithmetic goes through `rust_decimal` so that
//! `1 + 0.1` does not pick up binary rounding noise.

use std::cmp::Ordering;

use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use crate::{
    ast::{BinOp, UnaryOp},
    datetime::DateTime,
    error::ConversionError,
    value::{Value, ValueKind},
};

type ConversionResult<T> = Result<T, ConversionError>;

/// Converts `value` to the requested kind, or fails when no conversion
/// is viable.
pub fn convert(value: &Value, target: ValueKind) -> ConversionResult<Value> {
    if value.kind() == target {
        return Ok(value.clone());
    }

    match target {
        ValueKind::Boolean => to_bool(value).map(Value::Boolean),
        ValueKind::Float => to_float(value).map(Value::Float),
        ValueKind::Integer => to_integer(value).map(Value::Integer),
        ValueKind::String => match value {
            Value::Null | Value::Expression(_) => Err(invalid_cast(value, target)),
            other => Ok(Value::String(other.as_string())),
        },
        ValueKind::DateTime => match value {
            Value::String(s) => DateTime::parse(s).map(Value::DateTime),
            _ => Err(invalid_cast(value, target)),
        },
        ValueKind::Array | ValueKind::Null | ValueKind::Expression => {
            Err(invalid_cast(value, target))
        }
    }
}

fn invalid_cast(value: &Value, target: ValueKind) -> ConversionError {
    ConversionError::InvalidCast {
        from: value.type_name(),
        to: target.name(),
    }
}

pub fn to_bool(value: &Value) -> ConversionResult<bool> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Integer(n) => Ok(*n != 0),
        Value::Float(n) => Ok(*n != 0.0),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(invalid_cast(other, ValueKind::Boolean)),
    }
}

pub fn to_float(value: &Value) -> ConversionResult<f64> {
    match value {
        Value::Integer(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid_cast(value, ValueKind::Float)),
        other => Err(invalid_cast(other, ValueKind::Float)),
    }
}

pub fn to_integer(value: &Value) -> ConversionResult<i64> {
    match value {
        Value::Integer(n) => Ok(*n),
        Value::Float(n) if n.is_finite() && n.fract() == 0.0 => Decimal::from_f64(*n)
            .and_then(|d| d.to_i64())
            .ok_or(ConversionError::Overflow { op: "convert" }),
        Value::Boolean(b) => Ok(i64::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid_cast(value, ValueKind::Integer)),
        other => Err(invalid_cast(other, ValueKind::Integer)),
    }
}

/// A numeric operand pair after widening.
enum Numbers {
    Integers(i64, i64),
    /// At least one side was an integer; kept for decimal arithmetic.
    Mixed(f64, f64),
    Floats(f64, f64),
}

fn numbers(left: &Value, right: &Value) -> Option<Numbers> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Numbers::Integers(*a, *b)),
        (Value::Integer(a), Value::Float(b)) => Some(Numbers::Mixed(*a as f64, *b)),
        (Value::Float(a), Value::Integer(b)) => Some(Numbers::Mixed(*a, *b as f64)),
        (Value::Float(a), Value::Float(b)) => Some(Numbers::Floats(*a, *b)),
        _ => None,
    }
}

fn invalid_operands(op: BinOp, left: &Value, right: &Value) -> ConversionError {
    ConversionError::InvalidOperands {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

/// Runs `decimal_op` on exact decimal representations, falling back to
/// `float_op` when either side has no decimal form (NaN, infinities, huge
/// magnitudes) or the decimal operation overflows.
fn mixed(
    a: f64,
    b: f64,
    decimal_op: fn(Decimal, Decimal) -> Option<Decimal>,
    float_op: fn(f64, f64) -> f64,
) -> f64 {
    if let Some(ad) = Decimal::from_f64(a)
        && let Some(bd) = Decimal::from_f64(b)
        && let Some(rd) = decimal_op(ad, bd)
        && let Some(r) = rd.to_f64()
    {
        return r;
    }
    float_op(a, b)
}

pub fn add(left: &Value, right: &Value) -> ConversionResult<Value> {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        if left.is_null() || right.is_null() {
            return Err(invalid_operands(BinOp::Add, left, right));
        }
        return Ok(Value::String(format!("{}{}", left.as_string(), right.as_string())));
    }

    match numbers(left, right) {
        Some(Numbers::Integers(a, b)) => a
            .checked_add(b)
            .map(Value::Integer)
            .ok_or(ConversionError::Overflow { op: "+" }),
        Some(Numbers::Mixed(a, b)) => Ok(Value::Float(mixed(a, b, Decimal::checked_add, |a, b| a + b))),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a + b)),
        None => Err(invalid_operands(BinOp::Add, left, right)),
    }
}

pub fn subtract(left: &Value, right: &Value) -> ConversionResult<Value> {
    match numbers(left, right) {
        Some(Numbers::Integers(a, b)) => a
            .checked_sub(b)
            .map(Value::Integer)
            .ok_or(ConversionError::Overflow { op: "-" }),
        Some(Numbers::Mixed(a, b)) => Ok(Value::Float(mixed(a, b, Decimal::checked_sub, |a, b| a - b))),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a - b)),
        None => Err(invalid_operands(BinOp::Subtract, left, right)),
    }
}

pub fn multiply(left: &Value, right: &Value) -> ConversionResult<Value> {
    match numbers(left, right) {
        Some(Numbers::Integers(a, b)) => a
            .checked_mul(b)
            .map(Value::Integer)
            .ok_or(ConversionError::Overflow { op: "*" }),
        Some(Numbers::Mixed(a, b)) => Ok(Value::Float(mixed(a, b, Decimal::checked_mul, |a, b| a * b))),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a * b)),
        None => Err(invalid_operands(BinOp::Multiply, left, right)),
    }
}

pub fn divide(left: &Value, right: &Value) -> ConversionResult<Value> {
    match numbers(left, right) {
        Some(Numbers::Integers(_, 0)) => Err(ConversionError::DivisionByZero),
        Some(Numbers::Integers(a, b)) => {
            // Exact quotients stay integers
            if a.checked_rem(b) == Some(0) {
                a.checked_div(b)
                    .map(Value::Integer)
                    .ok_or(ConversionError::Overflow { op: "/" })
            } else {
                Ok(Value::Float(a as f64 / b as f64))
            }
        }
        Some(Numbers::Mixed(a, b)) => Ok(Value::Float(mixed(a, b, Decimal::checked_div, |a, b| a / b))),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a / b)),
        None => Err(invalid_operands(BinOp::Divide, left, right)),
    }
}

pub fn modulo(left: &Value, right: &Value) -> ConversionResult<Value> {
    match numbers(left, right) {
        Some(Numbers::Integers(_, 0)) => Err(ConversionError::DivisionByZero),
        Some(Numbers::Integers(a, b)) => a
            .checked_rem(b)
            .map(Value::Integer)
            .ok_or(ConversionError::Overflow { op: "%" }),
        Some(Numbers::Mixed(a, b)) => Ok(Value::Float(mixed(a, b, Decimal::checked_rem, |a, b| a % b))),
        Some(Numbers::Floats(a, b)) => Ok(Value::Float(a % b)),
        None => Err(invalid_operands(BinOp::Modulo, left, right)),
    }
}

fn compare(op: BinOp, left: &Value, right: &Value) -> ConversionResult<Option<Ordering>> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Some(a.cmp(b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        (Value::DateTime(a), Value::DateTime(b)) => Ok(Some(a.cmp(b))),
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
            _ => Err(invalid_operands(op, left, right)),
        },
    }
}

pub fn equal(left: &Value, right: &Value) -> ConversionResult<Value> {
    Ok(Value::Boolean(values_equal(left, right)))
}

pub fn not_equal(left: &Value, right: &Value) -> ConversionResult<Value> {
    Ok(Value::Boolean(!values_equal(left, right)))
}

/// Equality with numeric widening: `1 == 1.0` holds.
fn values_equal(left: &Value, right: &Value) -> bool {
    match numbers(left, right) {
        Some(Numbers::Integers(a, b)) => a == b,
        Some(Numbers::Mixed(a, b) | Numbers::Floats(a, b)) => a == b,
        None => left == right,
    }
}

pub fn less(left: &Value, right: &Value) -> ConversionResult<Value> {
    let ord = compare(BinOp::Less, left, right)?;
    Ok(Value::Boolean(ord == Some(Ordering::Less)))
}

pub fn less_or_equal(left: &Value, right: &Value) -> ConversionResult<Value> {
    let ord = compare(BinOp::LessOrEqual, left, right)?;
    Ok(Value::Boolean(matches!(ord, Some(Ordering::Less | Ordering::Equal))))
}

pub fn greater(left: &Value, right: &Value) -> ConversionResult<Value> {
    let ord = compare(BinOp::Greater, left, right)?;
    Ok(Value::Boolean(ord == Some(Ordering::Greater)))
}

pub fn greater_or_equal(left: &Value, right: &Value) -> ConversionResult<Value> {
    let ord = compare(BinOp::GreaterOrEqual, left, right)?;
    Ok(Value::Boolean(matches!(ord, Some(Ordering::Greater | Ordering::Equal))))
}

pub fn bitwise_and(left: &Value, right: &Value) -> ConversionResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a & b)),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a & b)),
        _ => Err(invalid_operands(BinOp::BitwiseAnd, left, right)),
    }
}

pub fn bitwise_or(left: &Value, right: &Value) -> ConversionResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a | b)),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a | b)),
        _ => Err(invalid_operands(BinOp::BitwiseOr, left, right)),
    }
}

pub fn bitwise_xor(left: &Value, right: &Value) -> ConversionResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a ^ b)),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a ^ b)),
        _ => Err(invalid_operands(BinOp::BitwiseXor, left, right)),
    }
}

/// Shift counts are masked to the operand width.
pub fn left_shift(left: &Value, right: &Value) -> ConversionResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_shl((*b & 63) as u32))),
        _ => Err(invalid_operands(BinOp::LeftShift, left, right)),
    }
}

pub fn right_shift(left: &Value, right: &Value) -> ConversionResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Value::Integer(a.wrapping_shr((*b & 63) as u32))),
        _ => Err(invalid_operands(BinOp::RightShift, left, right)),
    }
}

pub fn bitwise_not(operand: &Value) -> ConversionResult<Value> {
    match operand {
        Value::Integer(n) => Ok(Value::Integer(!n)),
        other => Err(ConversionError::InvalidOperand {
            op: UnaryOp::BitwiseNot.symbol(),
            operand: other.type_name(),
        }),
    }
}

pub fn negate(operand: &Value) -> ConversionResult<Value> {
    match operand {
        Value::Integer(n) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or(ConversionError::Overflow { op: "-" }),
        Value::Float(n) => Ok(Value::Float(-n)),
        other => Err(ConversionError::InvalidOperand {
            op: UnaryOp::Negate.symbol(),
            operand: other.type_name(),
        }),
    }
}

pub fn logical_not(operand: &Value) -> ConversionResult<Value> {
    to_bool(operand).map(|b| Value::Boolean(!b))
}

/// Applies a non-short-circuiting binary operator.
///
/// `And` and `Or` are accepted here too, with both operands already
/// evaluated; the evaluator handles them lazily itself.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> ConversionResult<Value> {
    match op {
        BinOp::Or => Ok(Value::Boolean(to_bool(left)? || to_bool(right)?)),
        BinOp::And => Ok(Value::Boolean(to_bool(left)? && to_bool(right)?)),
        BinOp::BitwiseOr => bitwise_or(left, right),
        BinOp::BitwiseXor => bitwise_xor(left, right),
        BinOp::BitwiseAnd => bitwise_and(left, right),
        BinOp::Equal => equal(left, right),
        BinOp::NotEqual => not_equal(left, right),
        BinOp::Less => less(left, right),
        BinOp::LessOrEqual => less_or_equal(left, right),
        BinOp::Greater => greater(left, right),
        BinOp::GreaterOrEqual => greater_or_equal(left, right),
        BinOp::LeftShift => left_shift(left, right),
        BinOp::RightShift => right_shift(left, right),
        BinOp::Add => add(left, right),
        BinOp::Subtract => subtract(left, right),
        BinOp::Multiply => multiply(left, right),
        BinOp::Divide => divide(left, right),
        BinOp::Modulo => modulo(left, right),
    }
}

pub fn unary(op: UnaryOp, operand: &Value) -> ConversionResult<Value> {
    match op {
        UnaryOp::Not => logical_not(operand),
        UnaryOp::Negate => negate(operand),
        UnaryOp::BitwiseNot => bitwise_not(operand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_integer() {
        assert_eq!(add(&Value::Integer(2), &Value::Integer(3)).unwrap(), Value::Integer(5));
        assert_eq!(multiply(&Value::Integer(4), &Value::Integer(5)).unwrap(), Value::Integer(20));
    }

    #[test]
    fn mixed_arithmetic_widens_without_noise() {
        assert_eq!(add(&Value::Integer(1), &Value::Float(0.1)).unwrap(), Value::Float(1.1));
        assert_eq!(subtract(&Value::Float(2.5), &Value::Integer(1)).unwrap(), Value::Float(1.5));
    }

    #[test]
    fn division_is_exact_or_float() {
        assert_eq!(divide(&Value::Integer(6), &Value::Integer(3)).unwrap(), Value::Integer(2));
        assert_eq!(divide(&Value::Integer(7), &Value::Integer(2)).unwrap(), Value::Float(3.5));
        assert_eq!(
            divide(&Value::Integer(1), &Value::Integer(0)),
            Err(ConversionError::DivisionByZero)
        );
        assert_eq!(
            modulo(&Value::Integer(1), &Value::Integer(0)),
            Err(ConversionError::DivisionByZero)
        );
    }

    #[test]
    fn integer_overflow_is_reported() {
        assert_eq!(
            add(&Value::Integer(i64::MAX), &Value::Integer(1)),
            Err(ConversionError::Overflow { op: "+" })
        );
        assert_eq!(
            negate(&Value::Integer(i64::MIN)),
            Err(ConversionError::Overflow { op: "-" })
        );
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            add(&Value::from("n = "), &Value::Integer(3)).unwrap(),
            Value::from("n = 3")
        );
    }

    #[test]
    fn equality_widens_numbers_but_not_kinds() {
        assert_eq!(equal(&Value::Integer(1), &Value::Float(1.0)).unwrap(), Value::Boolean(true));
        assert_eq!(equal(&Value::Integer(1), &Value::from("1")).unwrap(), Value::Boolean(false));
        assert_eq!(equal(&Value::Null, &Value::Null).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn ordering_across_kinds_fails() {
        assert!(less(&Value::Integer(1), &Value::from("a")).is_err());
        assert_eq!(less(&Value::from("a"), &Value::from("b")).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn bitwise_operators() {
        assert_eq!(bitwise_and(&Value::Integer(6), &Value::Integer(3)).unwrap(), Value::Integer(2));
        assert_eq!(bitwise_or(&Value::Integer(6), &Value::Integer(3)).unwrap(), Value::Integer(7));
        assert_eq!(bitwise_xor(&Value::Integer(6), &Value::Integer(3)).unwrap(), Value::Integer(5));
        assert_eq!(left_shift(&Value::Integer(1), &Value::Integer(4)).unwrap(), Value::Integer(16));
        assert_eq!(right_shift(&Value::Integer(16), &Value::Integer(2)).unwrap(), Value::Integer(4));
        assert_eq!(bitwise_not(&Value::Integer(0)).unwrap(), Value::Integer(-1));
    }

    #[test]
    fn boolean_conversion_rules() {
        assert!(to_bool(&Value::Integer(2)).unwrap());
        assert!(!to_bool(&Value::from("FALSE")).unwrap());
        assert!(to_bool(&Value::Null).is_err());
        assert!(to_bool(&Value::from("maybe")).is_err());
    }

    #[test]
    fn convert_targets() {
        assert_eq!(convert(&Value::from("2.5"), ValueKind::Float).unwrap(), Value::Float(2.5));
        assert_eq!(convert(&Value::Float(3.0), ValueKind::Integer).unwrap(), Value::Integer(3));
        assert!(convert(&Value::Float(3.5), ValueKind::Integer).is_err());
        assert_eq!(convert(&Value::Integer(7), ValueKind::String).unwrap(), Value::from("7"));
        assert!(matches!(
            convert(&Value::from("2024-01-31"), ValueKind::DateTime).unwrap(),
            Value::DateTime(_)
        ));
    }
}
