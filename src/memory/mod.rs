//! Memory model for the finn interpreter
//!
//! - [`value`]: runtime value representation (Int, Float, Str, Bool, Proc, Struct)
//! - [`stack`]: the operand stack
//! - [`heap`]: the simulated address space behind `&`, `deref` and `free`
//!
//! # Sizes
//!
//! Sizes are fixed and platform independent:
//! - `int`, `float`, procedure values: 8 bytes
//! - `bool`: 1 byte
//! - `str`: its UTF-8 byte length
//! - struct: sum of field sizes, unset fields counting as 8

pub mod heap;
pub mod stack;
pub mod value;

pub use heap::{Allocation, BlockUsage, MemoryError, MemorySimulator, MemoryUsage};
pub use stack::OperandStack;
pub use value::{Address, Field, StructDef, StructInstance, TypeTag, Value};
