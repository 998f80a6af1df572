//! Simulated address space backing the pointer intrinsics
//!
//! The simulator declares a fixed capacity (one mebibyte by default) spread
//! over a fixed number of address slots (2^20 by default). Capacity
//! accounting and the set of free addresses are independent checks and both
//! must pass for an allocation to succeed.
//!
//! Addresses are handed out from a deterministic free list: the most recently
//! freed address is reused first, otherwise the lowest address never handed
//! out so far. Address `0` is never allocated.

use super::value::{Address, Value};
use crate::interpreter::constants::{ADDRESS_SLOTS, MAX_MEMORY};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure of a memory operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("Out of memory: requested {requested} bytes with {available} bytes available")]
    OutOfMemory { requested: usize, available: usize },

    #[error("Address space exhausted: all {slots} addresses are in use")]
    AddressSpaceExhausted { slots: usize },

    #[error("Invalid address 0x{0:x}: nothing is allocated there")]
    InvalidAddress(Address),
}

/// A live allocation
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub size: usize,
    pub value: Value,
}

/// One row of the usage report
#[derive(Debug, Clone, PartialEq)]
pub struct BlockUsage {
    pub address: Address,
    pub size: usize,
    pub names: Vec<String>,
}

/// Usage report over all live addresses, in ascending address order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryUsage {
    pub used: usize,
    pub capacity: usize,
    pub blocks: Vec<BlockUsage>,
}

impl MemoryUsage {
    /// Text report printed by the `-mem` front-end flag.
    pub fn render(&self) -> String {
        if self.used == 0 && self.blocks.is_empty() {
            return "Total Memory Used: 0 bytes".to_string();
        }
        let mut out = format!("Total Memory Used: {} bytes\n    at addresses:", self.used);
        for block in &self.blocks {
            let left = format!("0x{:05x} -> {} bytes", block.address, block.size);
            out.push_str(&format!("\n        {:<24}|", left));
            if !block.names.is_empty() {
                out.push_str(&format!(" ({})", block.names.join(", ")));
            }
        }
        out
    }
}

/// The simulated address space
#[derive(Debug, Clone)]
pub struct MemorySimulator {
    capacity: usize,
    remaining: usize,
    slots: usize,
    /// Lowest address never handed out
    next_fresh: Address,
    /// Freed addresses available for reuse, most recent last
    recycled: Vec<Address>,
    allocations: BTreeMap<Address, Allocation>,
    bindings: FxHashMap<String, Address>,
}

impl MemorySimulator {
    pub fn new(capacity: usize, slots: usize) -> Self {
        MemorySimulator {
            capacity,
            remaining: capacity,
            slots,
            next_fresh: 1,
            recycled: Vec::new(),
            allocations: BTreeMap::new(),
            bindings: FxHashMap::default(),
        }
    }

    /// Allocate `size` bytes holding `value`
    pub fn allocate(&mut self, size: usize, value: Value) -> Result<Address, MemoryError> {
        if size > self.remaining {
            return Err(MemoryError::OutOfMemory {
                requested: size,
                available: self.remaining,
            });
        }

        let address = match self.recycled.pop() {
            Some(address) => address,
            None if self.next_fresh <= self.slots as Address => {
                let address = self.next_fresh;
                self.next_fresh += 1;
                address
            }
            None => return Err(MemoryError::AddressSpaceExhausted { slots: self.slots }),
        };

        self.remaining -= size;
        self.allocations.insert(address, Allocation { size, value });
        tracing::debug!(address, size, remaining = self.remaining, "allocated");
        Ok(address)
    }

    /// Free an address. Unknown or already-free addresses are a no-op.
    ///
    /// Returns the number of bytes given back.
    pub fn free(&mut self, address: Address) -> Option<usize> {
        let allocation = self.allocations.remove(&address)?;
        self.remaining += allocation.size;
        self.bindings.retain(|_, bound| *bound != address);
        self.recycled.push(address);
        tracing::debug!(address, size = allocation.size, "freed");
        Some(allocation.size)
    }

    /// Record that variable `name` points at `address`.
    pub fn bind(&mut self, name: impl Into<String>, address: Address) {
        self.bindings.insert(name.into(), address);
    }

    pub fn binding(&self, name: &str) -> Option<Address> {
        self.bindings.get(name).copied()
    }

    pub fn read(&self, address: Address) -> Result<&Value, MemoryError> {
        self.allocations
            .get(&address)
            .map(|allocation| &allocation.value)
            .ok_or(MemoryError::InvalidAddress(address))
    }

    pub fn is_allocated(&self, address: Address) -> bool {
        self.allocations.contains_key(&address)
    }

    /// Whether `address` is inside the address space and not allocated.
    pub fn is_free(&self, address: Address) -> bool {
        address >= 1 && address <= self.slots as Address && !self.is_allocated(address)
    }

    pub fn used(&self) -> usize {
        self.capacity - self.remaining
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn allocations(&self) -> &BTreeMap<Address, Allocation> {
        &self.allocations
    }

    /// Enumerate live addresses with their sizes and bound variable names.
    pub fn usage(&self) -> MemoryUsage {
        let blocks = self
            .allocations
            .iter()
            .map(|(&address, allocation)| {
                let mut names: Vec<String> = self
                    .bindings
                    .iter()
                    .filter(|(_, &bound)| bound == address)
                    .map(|(name, _)| name.clone())
                    .collect();
                names.sort();
                BlockUsage {
                    address,
                    size: allocation.size,
                    names,
                }
            })
            .collect();

        MemoryUsage {
            used: self.used(),
            capacity: self.capacity,
            blocks,
        }
    }
}

impl Default for MemorySimulator {
    fn default() -> Self {
        Self::new(MAX_MEMORY, ADDRESS_SLOTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_free_accounting() {
        let mut memory = MemorySimulator::default();
        let first = memory.allocate(100, Value::Int(1)).unwrap();
        let second = memory.allocate(50, Value::Int(2)).unwrap();
        assert_ne!(first, second);
        assert_eq!(memory.used(), 150);

        assert_eq!(memory.free(first), Some(100));
        assert_eq!(memory.used(), 50);
        assert!(memory.is_free(first));
        assert!(!memory.is_free(second));
    }

    #[test]
    fn test_capacity_checked_before_free_slots() {
        let mut memory = MemorySimulator::new(64, 1024);
        memory.allocate(60, Value::Int(0)).unwrap();
        let err = memory.allocate(5, Value::Int(0)).unwrap_err();
        assert_eq!(
            err,
            MemoryError::OutOfMemory {
                requested: 5,
                available: 4
            }
        );
        // Failed allocation leaves the counter untouched
        assert_eq!(memory.remaining(), 4);
    }

    #[test]
    fn test_address_space_exhausted() {
        let mut memory = MemorySimulator::new(1024, 2);
        memory.allocate(1, Value::Int(0)).unwrap();
        memory.allocate(1, Value::Int(0)).unwrap();
        assert_eq!(
            memory.allocate(1, Value::Int(0)),
            Err(MemoryError::AddressSpaceExhausted { slots: 2 })
        );
    }

    #[test]
    fn test_free_is_noop_for_unknown_and_double_free() {
        let mut memory = MemorySimulator::default();
        let address = memory.allocate(8, Value::Int(0)).unwrap();
        assert_eq!(memory.free(999), None);
        assert_eq!(memory.free(address), Some(8));
        assert_eq!(memory.free(address), None);
        assert_eq!(memory.used(), 0);
    }

    #[test]
    fn test_freed_address_is_reused_first() {
        let mut memory = MemorySimulator::default();
        let a = memory.allocate(1, Value::Int(0)).unwrap();
        let _b = memory.allocate(1, Value::Int(0)).unwrap();
        memory.free(a);
        assert_eq!(memory.allocate(1, Value::Int(0)).unwrap(), a);
    }

    #[test]
    fn test_free_drops_bindings() {
        let mut memory = MemorySimulator::default();
        let address = memory.allocate(8, Value::Int(7)).unwrap();
        memory.bind("x", address);
        memory.bind("y", address);
        assert_eq!(memory.usage().blocks[0].names, vec!["x", "y"]);

        memory.free(address);
        assert_eq!(memory.binding("x"), None);
        assert!(memory.usage().blocks.is_empty());
    }

    #[test]
    fn test_usage_report_text() {
        let mut memory = MemorySimulator::default();
        let address = memory.allocate(8, Value::Int(7)).unwrap();
        memory.bind("x", address);
        let report = memory.usage().render();
        assert!(report.starts_with("Total Memory Used: 8 bytes"));
        assert!(report.contains("0x00001 -> 8 bytes"));
        assert!(report.contains("(x)"));
    }
}
