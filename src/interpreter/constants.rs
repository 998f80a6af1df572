// Default limits for the finn interpreter

/// Declared capacity of the simulated memory, in bytes (1 MiB)
pub const MAX_MEMORY: usize = 1 << 20;

/// Number of simulated address slots; addresses run from 1 to this value
pub const ADDRESS_SLOTS: usize = 1 << 20;

/// Maximum nesting of procedure calls
pub const MAX_CALL_DEPTH: usize = 1000;

/// Maximum nesting of macro expansions
pub const MAX_MACRO_DEPTH: usize = 64;

/// Maximum nesting of `include`
pub const MAX_INCLUDE_DEPTH: usize = 16;

/// Default byte budget for recorded snapshots (64 MiB)
pub const DEFAULT_SNAPSHOT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;
