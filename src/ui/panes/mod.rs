//! Render functions for the inspector panes
//!
//! - [`source`]: source text with finn highlighting and the current line
//! - [`console`]: output and diagnostics written so far
//! - [`stack`]: operand stack, top first
//! - [`namespaces`]: variables and defined names
//! - [`memory`]: live simulated allocations
//! - [`status`]: step counter, engine mode and key hints
//!
//! Each module exports one `render_*` function. Scroll offsets are owned by
//! the app and clamped here, at render time.

mod utils;

pub mod console;
pub mod memory;
pub mod namespaces;
pub mod source;
pub mod stack;
pub mod status;

pub use console::render_console_pane;
pub use memory::render_memory_pane;
pub use namespaces::render_namespaces_pane;
pub use source::{render_source_pane, SourceScrollState, SourceView};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusView};
