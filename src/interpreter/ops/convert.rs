//! Type-name intrinsics: `int`, `float`, `str`, `bool`

use crate::interpreter::errors::RuntimeError;
use crate::lexer::{Token, TokenKind};
use crate::memory::Value;

/// Convert `value` to the type named by `target`
pub fn convert(target: TokenKind, value: Value, token: &Token) -> Result<Value, RuntimeError> {
    let invalid = |value: &Value, target: &'static str| RuntimeError::InvalidConversion {
        value: format!("{} {}", value.type_name(), value.repr()),
        target,
        location: token.location.clone(),
    };

    match target {
        TokenKind::TypeInt => match &value {
            Value::Int(_) => Ok(value),
            Value::Float(x) if x.is_finite() && x.abs() < 9.2e18 => Ok(Value::Int(x.trunc() as i64)),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| invalid(&value, "int")),
            _ => Err(invalid(&value, "int")),
        },
        TokenKind::TypeFloat => match &value {
            Value::Float(_) => Ok(value),
            Value::Int(n) => Ok(Value::Float(*n as f64)),
            Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
            Value::Str(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| invalid(&value, "float")),
            _ => Err(invalid(&value, "float")),
        },
        TokenKind::TypeStr => match value {
            Value::Str(_) => Ok(value),
            other => Ok(Value::Str(other.to_string())),
        },
        TokenKind::TypeBool => match &value {
            Value::Bool(_) => Ok(value),
            Value::Int(n) => Ok(Value::Bool(*n != 0)),
            Value::Float(x) => Ok(Value::Bool(*x != 0.0)),
            Value::Str(s) => match s.trim() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid(&value, "bool")),
            },
            _ => Err(invalid(&value, "bool")),
        },
        _ => Err(RuntimeError::UnexpectedToken {
            kind: target,
            location: token.location.clone(),
        }),
    }
}
