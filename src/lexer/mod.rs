//! finn source tokenizer
//!
//! - [`token`]: token record, kinds and literal payloads
//! - [`lexer`]: source text → token stream
//!
//! There is no parser; the interpreter executes the token stream directly.

pub mod lexer;
pub mod token;

pub use lexer::{tokenize, LexError, LexErrorKind, Lexed, Lexer};
pub use token::{Literal, LiteralKind, SourceLocation, Token, TokenCategory, TokenKind, TokenSeq};
