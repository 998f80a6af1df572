// Snapshot recording for the step inspector

use crate::lexer::{SourceLocation, Token};
use crate::memory::{MemoryUsage, Value};
use thiserror::Error;

/// Engine state captured before one token is processed
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Index of the processed token in execution order
    pub step: usize,
    /// `None` for the final snapshot taken after the run
    pub token: Option<Token>,
    pub location: SourceLocation,
    /// Operand stack, bottom to top
    pub stack: Vec<Value>,
    /// Variables sorted by name
    pub variables: Vec<(String, Value)>,
    pub procedures: Vec<String>,
    pub structs: Vec<String>,
    pub macros: Vec<String>,
    pub memory: MemoryUsage,
    /// Console writes visible at this point
    pub console_len: usize,
    /// Skip-mode description ("normal", "skipping branch ...", "capturing ...")
    pub mode: String,
    pub frame_depth: usize,
}

impl Snapshot {
    /// Estimate the memory usage of this snapshot in bytes
    pub fn estimated_size(&self) -> usize {
        // Rough per-entry estimates
        let stack_size: usize = self.stack.iter().map(|v| v.size_of() + 32).sum();
        let variable_size: usize = self
            .variables
            .iter()
            .map(|(name, value)| name.len() + value.size_of() + 32)
            .sum();
        let name_size: usize = self
            .procedures
            .iter()
            .chain(&self.structs)
            .chain(&self.macros)
            .map(|name| name.len() + 24)
            .sum();
        let memory_size = self.memory.blocks.len() * 48;

        std::mem::size_of::<Snapshot>()
            + stack_size
            + variable_size
            + name_size
            + memory_size
            + self.mode.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Snapshot memory limit exceeded: {current} + {size} > {limit} bytes")]
pub struct SnapshotLimitExceeded {
    pub current: usize,
    pub size: usize,
    pub limit: usize,
}

/// Execution history with a memory budget
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<Snapshot>,
    max_memory: usize,
    current_memory: usize,
    truncated: bool,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
            truncated: false,
        }
    }

    /// Add a snapshot to history. Once the budget is exceeded, the history
    /// is marked truncated and every later push is refused.
    pub fn push(&mut self, snapshot: Snapshot) -> Result<(), SnapshotLimitExceeded> {
        let size = snapshot.estimated_size();

        if self.truncated || self.current_memory + size > self.max_memory {
            self.truncated = true;
            return Err(SnapshotLimitExceeded {
                current: self.current_memory,
                size,
                limit: self.max_memory,
            });
        }

        self.current_memory += size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Record the final state even if the budget is spent, so the inspector
    /// always ends on the post-run state.
    pub fn push_final(&mut self, snapshot: Snapshot) {
        self.current_memory += snapshot.estimated_size();
        self.snapshots.push(snapshot);
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    pub fn memory_limit(&self) -> usize {
        self.max_memory
    }
}

/// Cursor over a snapshot history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    position: usize,
    len: usize,
}

impl Timeline {
    pub fn new(len: usize) -> Self {
        Timeline { position: 0, len }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn at_end(&self) -> bool {
        self.position + 1 >= self.len
    }

    /// Move forward up to `n` steps; returns false if already at the end.
    pub fn step_forward(&mut self, n: usize) -> bool {
        if self.at_end() {
            return false;
        }
        self.position = (self.position + n).min(self.len - 1);
        true
    }

    /// Move back up to `n` steps; returns false if already at the start.
    pub fn step_back(&mut self, n: usize) -> bool {
        if self.position == 0 {
            return false;
        }
        self.position = self.position.saturating_sub(n);
        true
    }

    pub fn to_start(&mut self) {
        self.position = 0;
    }

    pub fn to_end(&mut self) {
        self.position = self.len.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snapshot(step: usize) -> Snapshot {
        Snapshot {
            step,
            token: None,
            location: SourceLocation::new(Arc::from("t"), 1, 1),
            stack: vec![Value::Int(step as i64)],
            variables: Vec::new(),
            procedures: Vec::new(),
            structs: Vec::new(),
            macros: Vec::new(),
            memory: MemoryUsage::default(),
            console_len: 0,
            mode: "normal".to_string(),
            frame_depth: 1,
        }
    }

    #[test]
    fn test_budget_truncates_history() {
        let size = snapshot(0).estimated_size();
        let mut manager = SnapshotManager::new(size * 2);
        assert!(manager.push(snapshot(0)).is_ok());
        assert!(manager.push(snapshot(1)).is_ok());
        assert!(manager.push(snapshot(2)).is_err());
        assert!(manager.is_truncated());
        assert_eq!(manager.len(), 2);

        manager.push_final(snapshot(9));
        assert_eq!(manager.len(), 3);
        assert_eq!(manager.get(2).map(|s| s.step), Some(9));
    }

    #[test]
    fn test_timeline_clamps() {
        let mut timeline = Timeline::new(5);
        assert!(!timeline.step_back(1));
        assert!(timeline.step_forward(3));
        assert_eq!(timeline.position(), 3);
        assert!(timeline.step_forward(10));
        assert_eq!(timeline.position(), 4);
        assert!(!timeline.step_forward(1));
        assert!(timeline.step_back(9));
        assert_eq!(timeline.position(), 0);
        timeline.to_end();
        assert!(timeline.at_end());
    }
}
