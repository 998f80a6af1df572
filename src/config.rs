//! Engine configuration
//!
//! [`EngineConfig`] gathers every tunable limit of an [`Interpreter`]. The
//! defaults come from [`crate::interpreter::constants`]; the front end
//! adjusts them from command-line flags.
//!
//! [`Interpreter`]: crate::interpreter::engine::Interpreter

use crate::interpreter::constants::{
    ADDRESS_SLOTS, DEFAULT_SNAPSHOT_MEMORY_LIMIT, MAX_CALL_DEPTH, MAX_INCLUDE_DEPTH,
    MAX_MACRO_DEPTH, MAX_MEMORY,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_call_depth: usize,
    pub max_macro_depth: usize,
    pub max_include_depth: usize,
    /// Simulated memory capacity in bytes
    pub memory_capacity: usize,
    pub address_slots: usize,
    /// Record a snapshot before every executed token
    pub record_snapshots: bool,
    pub snapshot_memory_limit: usize,
    /// Echo console lines to standard output as they are written
    pub echo: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_call_depth: MAX_CALL_DEPTH,
            max_macro_depth: MAX_MACRO_DEPTH,
            max_include_depth: MAX_INCLUDE_DEPTH,
            memory_capacity: MAX_MEMORY,
            address_slots: ADDRESS_SLOTS,
            record_snapshots: false,
            snapshot_memory_limit: DEFAULT_SNAPSHOT_MEMORY_LIMIT,
            echo: false,
        }
    }
}

impl EngineConfig {
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_snapshots(mut self, limit: usize) -> Self {
        self.record_snapshots = true;
        self.snapshot_memory_limit = limit;
        self
    }
}
