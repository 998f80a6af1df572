//! Runtime error types for the finn interpreter
//!
//! This module defines [`RuntimeError`], which represents every error that can
//! occur while executing a token stream (as opposed to lexing errors).
//!
//! All runtime errors are fatal: the engine reports them as a
//! `file:line:col: message` diagnostic and halts cooperatively.

use crate::lexer::{SourceLocation, TokenKind};
use crate::memory::MemoryError;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Stack underflow: '{op}' needs {needed} value(s)")]
    StackUnderflow {
        op: &'static str,
        needed: usize,
        location: SourceLocation,
    },

    #[error("Print from empty stack")]
    PrintFromEmptyStack { location: SourceLocation },

    #[error("Undefined variable '{name}'")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("Undefined procedure '{name}'")]
    UndefinedProcedure {
        name: String,
        location: SourceLocation,
    },

    #[error("Undefined struct '{name}'")]
    UndefinedStruct {
        name: String,
        location: SourceLocation,
    },

    /// A name used with `::` aliasing that is bound nowhere
    #[error("Undefined name '{name}'")]
    UndefinedName {
        name: String,
        location: SourceLocation,
    },

    #[error("Else without if")]
    ElseWithoutIf { location: SourceLocation },

    #[error("End without an open block")]
    UnmatchedEnd { location: SourceLocation },

    /// Input ended inside a branch skip or a definition capture
    #[error("Unterminated block: {what} opened here never reaches 'end'")]
    UnterminatedBlock {
        what: String,
        location: SourceLocation,
    },

    #[error("Malformed definition of '{name}': {message}")]
    MalformedDefinition {
        name: String,
        message: String,
        location: SourceLocation,
    },

    #[error("Malformed struct '{name}': {message}")]
    MalformedStruct {
        name: String,
        message: String,
        location: SourceLocation,
    },

    #[error("'{keyword}' definition needs a name ('NAME :: {keyword} ... end')")]
    UnnamedDefinition {
        keyword: &'static str,
        location: SourceLocation,
    },

    #[error("Definitions are not allowed inside macro '{macro_name}'")]
    DefinitionInMacro {
        macro_name: String,
        location: SourceLocation,
    },

    #[error("Type error in '{op}': expected {expected}, got {got}")]
    TypeError {
        op: &'static str,
        expected: String,
        got: String,
        location: SourceLocation,
    },

    #[error("Division by zero in '{op}'")]
    DivisionByZero {
        op: &'static str,
        location: SourceLocation,
    },

    #[error("Integer overflow in '{op}'")]
    IntegerOverflow {
        op: &'static str,
        location: SourceLocation,
    },

    #[error("Cannot convert {value} to {target}")]
    InvalidConversion {
        value: String,
        target: &'static str,
        location: SourceLocation,
    },

    #[error("Struct '{struct_name}' does not have field '{field_name}'")]
    MissingStructField {
        struct_name: String,
        field_name: String,
        location: SourceLocation,
    },

    #[error("Field '{field_name}' of struct '{struct_name}' is not set")]
    UninitializedField {
        struct_name: String,
        field_name: String,
        location: SourceLocation,
    },

    #[error("Recursion limit exceeded: call depth above {limit}")]
    RecursionLimit {
        limit: usize,
        location: SourceLocation,
    },

    #[error("Macro expansion depth above {limit} while expanding '{name}'")]
    MacroDepthExceeded {
        name: String,
        limit: usize,
        location: SourceLocation,
    },

    #[error("Include of '{path}' failed: {message}")]
    IncludeFailed {
        path: String,
        message: String,
        location: SourceLocation,
    },

    #[error("Unexpected token '{}'", .kind.spelling())]
    UnexpectedToken {
        kind: TokenKind,
        location: SourceLocation,
    },

    #[error("{source}")]
    Memory {
        #[source]
        source: MemoryError,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            RuntimeError::StackUnderflow { location, .. }
            | RuntimeError::PrintFromEmptyStack { location }
            | RuntimeError::UndefinedVariable { location, .. }
            | RuntimeError::UndefinedProcedure { location, .. }
            | RuntimeError::UndefinedStruct { location, .. }
            | RuntimeError::UndefinedName { location, .. }
            | RuntimeError::ElseWithoutIf { location }
            | RuntimeError::UnmatchedEnd { location }
            | RuntimeError::UnterminatedBlock { location, .. }
            | RuntimeError::MalformedDefinition { location, .. }
            | RuntimeError::MalformedStruct { location, .. }
            | RuntimeError::UnnamedDefinition { location, .. }
            | RuntimeError::DefinitionInMacro { location, .. }
            | RuntimeError::TypeError { location, .. }
            | RuntimeError::DivisionByZero { location, .. }
            | RuntimeError::IntegerOverflow { location, .. }
            | RuntimeError::InvalidConversion { location, .. }
            | RuntimeError::MissingStructField { location, .. }
            | RuntimeError::UninitializedField { location, .. }
            | RuntimeError::RecursionLimit { location, .. }
            | RuntimeError::MacroDepthExceeded { location, .. }
            | RuntimeError::IncludeFailed { location, .. }
            | RuntimeError::UnexpectedToken { location, .. }
            | RuntimeError::Memory { location, .. } => location,
        }
    }

    /// The `file:line:col: message` line written to the console on halt.
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.location(), self)
    }
}
