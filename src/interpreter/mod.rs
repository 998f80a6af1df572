//! finn execution engine
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`Interpreter`], its execution frames and run loop
//! - [`intrinsics`]: normal-mode dispatch of every intrinsic
//! - [`definitions`]: the `::` operator and installation of definitions
//! - [`skip`]: the branch-skip / definition-capture state machine
//! - [`namespaces`]: variables, procedures, struct types and macros
//! - [`errors`]: runtime error types
//!
//! # Execution Model
//!
//! There is no syntax tree. The engine walks flat token sequences with a
//! cursor per frame; `call`, macro expansion and `include` push a frame and
//! the caller resumes after the call site once it is exhausted. While a branch
//! is skipped or a definition body is captured, tokens are fed to the skip
//! machine instead of being executed.

pub mod constants;
pub mod definitions;
pub mod engine;
pub mod errors;
pub mod include;
pub mod intrinsics;
pub mod memory_ops;
pub mod namespaces;
pub mod ops;
pub mod skip;

pub use engine::{ExecFrame, FrameKind, Interpreter};
pub use errors::RuntimeError;
pub use include::{FsLoader, LoadedSource, SourceLoader};
pub use namespaces::{NameKind, Namespaces};
pub use skip::SkipState;
