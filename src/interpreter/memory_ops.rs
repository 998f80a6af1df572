//! Pointer intrinsics over the simulated address space
//!
//! - `&`: store a copy of a variable's value, bind the name, push the address
//! - `deref`: push the value stored at an address
//! - `free`: release an address (no-op if unknown)
//! - `sizeof`: push the simulated size of a value
//! - `ptr`: assert that an Int is a live address
//!
//! Addresses are plain `Int` values.

use crate::interpreter::engine::{type_error, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::lexer::Token;
use crate::memory::{MemoryError, Value};

impl Interpreter {
    pub(crate) fn address_of(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let name = self.pop_name("&", token)?;
        let value = self.variable(&name, token)?.clone();
        let size = value.size_of();

        let address = self
            .memory
            .allocate(size, value)
            .map_err(|source| memory_error(source, token))?;
        self.memory.bind(name.as_str(), address);
        tracing::debug!(name = %name, address, size, "address taken");

        self.stack.push(Value::Int(address));
        Ok(())
    }

    pub(crate) fn deref(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let address = self.pop_int("deref", token)?;
        let value = self
            .memory
            .read(address)
            .map_err(|source| memory_error(source, token))?
            .clone();
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn free(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let address = self.pop_int("free", token)?;
        if self.memory.free(address).is_none() {
            tracing::debug!(address, "free of unallocated address ignored");
        }
        Ok(())
    }

    pub(crate) fn size_of(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let value = self.pop("sizeof", token)?;
        let size = i64::try_from(value.size_of()).unwrap_or(i64::MAX);
        self.stack.push(Value::Int(size));
        Ok(())
    }

    pub(crate) fn check_pointer(&mut self, token: &Token) -> Result<(), RuntimeError> {
        match self.pop("ptr", token)? {
            Value::Int(address) if self.memory.is_allocated(address) => {
                self.stack.push(Value::Int(address));
                Ok(())
            }
            Value::Int(address) => Err(memory_error(MemoryError::InvalidAddress(address), token)),
            other => Err(type_error("ptr", "an address", &other, token)),
        }
    }
}

fn memory_error(source: MemoryError, token: &Token) -> RuntimeError {
    RuntimeError::Memory {
        source,
        location: token.location.clone(),
    }
}
