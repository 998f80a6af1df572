//! # Introduction
//!
//! finn runs programs written in a small stack-based scripting language.
//! Source text is tokenized and then executed directly over the token stream:
//! there is no syntax tree. Execution can be recorded token by token and
//! replayed in a terminal UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Interpreter → Console / Snapshots → TUI
//!                     └──→ AsmEmitter → NASM listing
//! ```
//!
//! 1. [`lexer`]: tokenizes source text into a flat [`lexer::Token`] stream.
//! 2. [`interpreter`]: executes the stream over an operand stack and four
//!    namespaces, with a skip-mode state machine for untaken branches and
//!    definition capture.
//! 3. [`memory`]: the tagged [`memory::Value`] union, the operand stack and
//!    the simulated address space behind `&`, `deref` and `free`.
//! 4. [`snapshot`]: per-token state captures with a memory budget, and a
//!    [`snapshot::Timeline`] to navigate them.
//! 5. [`emit`]: the NASM emitter behind `-c`.
//! 6. [`ui`]: ratatui-based step inspector; not part of the stable library API.
//!
//! ## Example
//!
//! ```
//! use finn::{config::EngineConfig, interpreter::Interpreter, lexer::tokenize};
//!
//! let lexed = tokenize("10 4 - print", "example.finn").unwrap();
//! let mut interpreter = Interpreter::new(lexed.tokens, EngineConfig::default());
//! interpreter.run().unwrap();
//! assert_eq!(interpreter.console().output(), vec!["6"]);
//! ```

pub mod cli;
pub mod config;
pub mod console;
pub mod emit;
pub mod interpreter;
pub mod lexer;
pub mod memory;
pub mod snapshot;
pub mod ui;
