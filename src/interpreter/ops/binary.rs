//! Binary operators
//!
//! Every binary intrinsic pops `b` (right operand) first and `a` second, then
//! pushes `a OP b`. Int with Int stays Int and overflow is checked; a Float on
//! either side promotes the other operand.

use crate::interpreter::errors::RuntimeError;
use crate::lexer::{SourceLocation, TokenKind};
use crate::memory::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        let op = match kind {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            TokenKind::StarStar => BinaryOp::Pow,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::BangEq => BinaryOp::Ne,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::Le,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::GtEq => BinaryOp::Ge,
            TokenKind::And => BinaryOp::And,
            TokenKind::Or => BinaryOp::Or,
            _ => return None,
        };
        Some(op)
    }

    /// The arithmetic operator behind a compound assignment (`+=` etc.)
    pub fn from_compound(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::PlusEq => Some(BinaryOp::Add),
            TokenKind::MinusEq => Some(BinaryOp::Sub),
            TokenKind::StarEq => Some(BinaryOp::Mul),
            TokenKind::SlashEq => Some(BinaryOp::Div),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

/// Evaluate `a OP b`
pub fn apply(
    op: BinaryOp,
    a: Value,
    b: Value,
    location: &SourceLocation,
) -> Result<Value, RuntimeError> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(op, a, b, location)
        }
        BinaryOp::Pow => power(a, b, location),
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&a, &b))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&a, &b))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(op, &a, &b, location)?;
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::And | BinaryOp::Or => match (&a, &b) {
            (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(if op == BinaryOp::And {
                *x && *y
            } else {
                *x || *y
            })),
            _ => Err(type_error(op, "bool and bool", &a, &b, location)),
        },
    }
}

fn arithmetic(
    op: BinaryOp,
    a: Value,
    b: Value,
    location: &SourceLocation,
) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => {
            let (x, y) = (*x, *y);
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && y == 0 {
                return Err(RuntimeError::DivisionByZero {
                    op: op.symbol(),
                    location: location.clone(),
                });
            }
            let result = match op {
                BinaryOp::Add => x.checked_add(y),
                BinaryOp::Sub => x.checked_sub(y),
                BinaryOp::Mul => x.checked_mul(y),
                BinaryOp::Div => x.checked_div(y),
                _ => x.checked_rem(y),
            };
            result.map(Value::Int).ok_or_else(|| RuntimeError::IntegerOverflow {
                op: op.symbol(),
                location: location.clone(),
            })
        }
        (Value::Str(x), Value::Str(y)) if op == BinaryOp::Add => Ok(Value::Str(format!("{x}{y}"))),
        _ => {
            let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
                return Err(type_error(op, "numbers", &a, &b, location));
            };
            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && y == 0.0 {
                return Err(RuntimeError::DivisionByZero {
                    op: op.symbol(),
                    location: location.clone(),
                });
            }
            let result = match op {
                BinaryOp::Add => x + y,
                BinaryOp::Sub => x - y,
                BinaryOp::Mul => x * y,
                BinaryOp::Div => x / y,
                _ => x % y,
            };
            Ok(Value::Float(result))
        }
    }
}

fn power(a: Value, b: Value, location: &SourceLocation) -> Result<Value, RuntimeError> {
    match (&a, &b) {
        (Value::Int(base), Value::Int(exp)) if *exp >= 0 => u32::try_from(*exp)
            .ok()
            .and_then(|exp| base.checked_pow(exp))
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::IntegerOverflow {
                op: "**",
                location: location.clone(),
            }),
        (Value::Int(base), Value::Int(exp)) => Ok(Value::Float((*base as f64).powf(*exp as f64))),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => Ok(Value::Float(x.powf(y))),
            _ => Err(type_error(BinaryOp::Pow, "numbers", &a, &b, location)),
        },
    }
}

/// Structural equality with Int/Float compared numerically.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => (*x as f64) == *y,
        _ => a == b,
    }
}

fn compare(
    op: BinaryOp,
    a: &Value,
    b: &Value,
    location: &SourceLocation,
) -> Result<Ordering, RuntimeError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x
                .partial_cmp(&y)
                .ok_or_else(|| type_error(op, "comparable numbers", a, b, location)),
            _ => Err(type_error(op, "two numbers or two strings", a, b, location)),
        },
    }
}

fn type_error(
    op: BinaryOp,
    expected: &str,
    a: &Value,
    b: &Value,
    location: &SourceLocation,
) -> RuntimeError {
    RuntimeError::TypeError {
        op: op.symbol(),
        expected: expected.to_string(),
        got: format!("{} and {}", a.type_name(), b.type_name()),
        location: location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("t"), 1, 1)
    }

    fn eval(op: BinaryOp, a: Value, b: Value) -> Result<Value, RuntimeError> {
        apply(op, a, b, &loc())
    }

    #[test]
    fn test_operand_order() {
        assert_eq!(eval(BinaryOp::Sub, Value::Int(10), Value::Int(4)), Ok(Value::Int(6)));
        assert_eq!(eval(BinaryOp::Div, Value::Int(7), Value::Int(2)), Ok(Value::Int(3)));
        assert_eq!(
            eval(BinaryOp::Lt, Value::Int(1), Value::Int(2)),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn test_float_promotion_and_concat() {
        assert_eq!(
            eval(BinaryOp::Mul, Value::Int(2), Value::Float(1.5)),
            Ok(Value::Float(3.0))
        );
        assert_eq!(
            eval(BinaryOp::Add, Value::Str("ab".into()), Value::Str("cd".into())),
            Ok(Value::Str("abcd".into()))
        );
        assert!(eval(BinaryOp::Add, Value::Str("a".into()), Value::Int(1)).is_err());
    }

    #[test]
    fn test_division_by_zero_and_overflow() {
        assert!(matches!(
            eval(BinaryOp::Mod, Value::Int(1), Value::Int(0)),
            Err(RuntimeError::DivisionByZero { op: "%", .. })
        ));
        assert!(matches!(
            eval(BinaryOp::Add, Value::Int(i64::MAX), Value::Int(1)),
            Err(RuntimeError::IntegerOverflow { .. })
        ));
    }

    #[test]
    fn test_power() {
        assert_eq!(eval(BinaryOp::Pow, Value::Int(2), Value::Int(10)), Ok(Value::Int(1024)));
        assert_eq!(
            eval(BinaryOp::Pow, Value::Int(2), Value::Int(-1)),
            Ok(Value::Float(0.5))
        );
    }

    #[test]
    fn test_mixed_equality() {
        assert!(values_equal(&Value::Int(2), &Value::Float(2.0)));
        assert!(!values_equal(&Value::Int(2), &Value::Str("2".into())));
    }
}
