//! Runtime value representation
//!
//! This module defines the [`Value`] enum, the closed set of things that can
//! live on the operand stack, in a variable, or in simulated memory.
//!
//! # Value Types
//!
//! - [`Value::Int`]: 64-bit signed integer (also used for simulated addresses)
//! - [`Value::Float`]: 64-bit float
//! - [`Value::Str`]: owned string; bare identifiers push as `Str` names
//! - [`Value::Bool`]: boolean
//! - [`Value::Proc`]: a captured procedure body
//! - [`Value::Struct`]: an instance of a struct type
//!
//! # Struct identity
//!
//! Struct instances are plain values. Fetching a variable copies the
//! instance; writing a field changes only the copy it is applied to.

use crate::lexer::{Literal, TokenSeq};
use std::fmt;

/// Simulated memory address
pub type Address = i64;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Proc(TokenSeq),
    Struct(StructInstance),
}

impl Value {
    /// Name of the variant, used in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bool(_) => "bool",
            Value::Proc(_) => "proc",
            Value::Struct(_) => "struct",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view with int → float promotion.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Size in simulated bytes
    pub fn size_of(&self) -> usize {
        match self {
            Value::Int(_) | Value::Float(_) | Value::Proc(_) => 8,
            Value::Bool(_) => 1,
            Value::Str(s) => s.len(),
            Value::Struct(instance) => instance
                .fields
                .iter()
                .map(|field| field.value.as_ref().map_or(8, Value::size_of))
                .sum(),
        }
    }

    /// Text used when the value is quoted inside another value (struct dumps).
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("{:?}", s),
            other => other.to_string(),
        }
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Int(n) => Value::Int(n),
            Literal::Float(x) => Value::Float(x),
            Literal::Str(s) => Value::Str(s),
            Literal::Bool(b) => Value::Bool(b),
            Literal::Ident(name) => Value::Str(name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => {
                if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{}", x)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Proc(body) => write!(f, "<proc: {} tokens>", body.len()),
            Value::Struct(instance) => write!(f, "{}", instance),
        }
    }
}

/// Declared type of a struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Int,
    Float,
    Str,
    Bool,
    Ptr,
    Struct(String),
}

impl TypeTag {
    /// Zero value a fresh instance starts with; struct-typed fields start unset.
    pub fn zero_value(&self) -> Option<Value> {
        match self {
            TypeTag::Int | TypeTag::Ptr => Some(Value::Int(0)),
            TypeTag::Float => Some(Value::Float(0.0)),
            TypeTag::Str => Some(Value::Str(String::new())),
            TypeTag::Bool => Some(Value::Bool(false)),
            TypeTag::Struct(_) => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Int => write!(f, "int"),
            TypeTag::Float => write!(f, "float"),
            TypeTag::Str => write!(f, "str"),
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::Ptr => write!(f, "ptr"),
            TypeTag::Struct(name) => write!(f, "{}", name),
        }
    }
}

/// Struct type definition: ordered field table
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<(String, TypeTag)>,
}

impl StructDef {
    /// Copy the field table into a fresh instance.
    pub fn instantiate(&self) -> StructInstance {
        StructInstance {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .map(|(name, tag)| Field {
                    name: name.clone(),
                    value: tag.zero_value(),
                    tag: tag.clone(),
                })
                .collect(),
        }
    }
}

/// One slot of a struct instance
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Option<Value>,
    pub tag: TypeTag,
}

/// An instance of a struct type
#[derive(Debug, Clone, PartialEq)]
pub struct StructInstance {
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructInstance {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }
}

impl fmt::Display for StructInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match &field.value {
                Some(value) => write!(f, " {}: {}", field.name, value.repr())?,
                None => write!(f, " {}: <unset>", field.name)?,
            }
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> StructDef {
        StructDef {
            name: "Point".to_string(),
            fields: vec![
                ("x".to_string(), TypeTag::Int),
                ("label".to_string(), TypeTag::Str),
                ("next".to_string(), TypeTag::Struct("Point".to_string())),
            ],
        }
    }

    #[test]
    fn test_instantiate_fills_zero_values() {
        let instance = point().instantiate();
        assert_eq!(instance.field("x").unwrap().value, Some(Value::Int(0)));
        assert_eq!(
            instance.field("label").unwrap().value,
            Some(Value::Str(String::new()))
        );
        assert_eq!(instance.field("next").unwrap().value, None);
        assert_eq!(instance.to_string(), "Point { x: 0, label: \"\", next: <unset> }");
    }

    #[test]
    fn test_float_display_keeps_fraction_marker() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_sizes() {
        assert_eq!(Value::Int(1).size_of(), 8);
        assert_eq!(Value::Bool(true).size_of(), 1);
        assert_eq!(Value::Str("abc".into()).size_of(), 3);
        // int (8) + empty str (0) + unset struct (8)
        assert_eq!(Value::Struct(point().instantiate()).size_of(), 16);
    }
}
