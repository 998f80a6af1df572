//! NASM emitter for the `-c` front-end mode
//!
//! The emitter walks a token sequence independently of the interpreter and
//! supports a small subset of the language:
//!
//! - string pushes become `db` entries in `section .data` with deterministic
//!   labels (`str_0`, `str_1`, ...), reused for equal strings;
//! - integer pushes become `push N` in `_start`;
//! - `print` of a string becomes a `write(1, label, len)` syscall;
//! - the listing ends with `exit(0)`.
//!
//! Every other token is ignored.

use crate::lexer::{Literal, SourceLocation, Token, TokenKind};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmitError {
    #[error("{location}: can only print string literals, found {found}")]
    UnsupportedPrint {
        found: String,
        location: SourceLocation,
    },

    #[error("{location}: print from empty stack")]
    PrintFromEmptyStack { location: SourceLocation },
}

/// Compile-time model of what a push left on the stack
#[derive(Debug, Clone, PartialEq)]
enum StackEntry {
    Str(String),
    Other(&'static str),
}

pub struct AsmEmitter<'a> {
    tokens: &'a [Token],
    stack: Vec<StackEntry>,
    labels: FxHashMap<String, String>,
    data: String,
    text: String,
}

impl<'a> AsmEmitter<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        AsmEmitter {
            tokens,
            stack: Vec::new(),
            labels: FxHashMap::default(),
            data: String::from("section .data\n"),
            text: String::from("\nsection .text\nglobal _start\n_start:\n"),
        }
    }

    /// Produce the full listing
    pub fn emit(mut self) -> Result<String, EmitError> {
        let tokens = self.tokens;
        for token in tokens {
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Push => self.push(token),
                TokenKind::True | TokenKind::False => self.stack.push(StackEntry::Other("bool")),
                TokenKind::Print => self.print(token)?,
                _ => {}
            }
        }

        self.text.push_str("  mov eax, 1\n  mov ebx, 0\n  int 80h\n");
        Ok(self.data + &self.text)
    }

    fn push(&mut self, token: &Token) {
        match &token.literal {
            Some(Literal::Str(text)) => {
                let label = self.label_for(text);
                self.stack.push(StackEntry::Str(label));
            }
            Some(Literal::Int(n)) => {
                let _ = writeln!(self.text, "  push {}", n);
                self.stack.push(StackEntry::Other("int"));
            }
            Some(Literal::Float(_)) => self.stack.push(StackEntry::Other("float")),
            Some(Literal::Ident(_)) => self.stack.push(StackEntry::Other("identifier")),
            Some(Literal::Bool(_)) | None => self.stack.push(StackEntry::Other("bool")),
        }
    }

    fn label_for(&mut self, text: &str) -> String {
        if let Some(label) = self.labels.get(text) {
            return label.clone();
        }
        let label = format!("str_{}", self.labels.len());
        let _ = writeln!(
            self.data,
            "  {label}: db {}\n  {label}_len: equ $-{label}",
            db_operands(text)
        );
        self.labels.insert(text.to_string(), label.clone());
        label
    }

    fn print(&mut self, token: &Token) -> Result<(), EmitError> {
        match self.stack.pop() {
            Some(StackEntry::Str(label)) => {
                let _ = write!(
                    self.text,
                    "  mov eax, 4\n  mov ebx, 1\n  mov ecx, {label}\n  mov edx, {label}_len\n  int 80h\n"
                );
                Ok(())
            }
            Some(StackEntry::Other(found)) => Err(EmitError::UnsupportedPrint {
                found: found.to_string(),
                location: token.location.clone(),
            }),
            None => Err(EmitError::PrintFromEmptyStack {
                location: token.location.clone(),
            }),
        }
    }
}

/// `db` operands for `text` followed by a newline byte: printable runs are
/// quoted, everything else is written as byte values.
fn db_operands(text: &str) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut run = String::new();
    for byte in text.bytes() {
        if (0x20..0x7f).contains(&byte) && byte != b'"' {
            run.push(byte as char);
        } else {
            if !run.is_empty() {
                parts.push(format!("\"{}\"", run));
                run.clear();
            }
            parts.push(byte.to_string());
        }
    }
    if !run.is_empty() {
        parts.push(format!("\"{}\"", run));
    }
    parts.push("10".to_string());
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn emit(source: &str) -> Result<String, EmitError> {
        let tokens = tokenize(source, "t.finn").unwrap().tokens;
        AsmEmitter::new(&tokens).emit()
    }

    #[test]
    fn test_hello_listing() {
        let asm = emit("\"hi\" print 7").unwrap();
        assert_eq!(
            asm,
            "section .data\n\
             \x20 str_0: db \"hi\", 10\n\
             \x20 str_0_len: equ $-str_0\n\
             \n\
             section .text\n\
             global _start\n\
             _start:\n\
             \x20 mov eax, 4\n\
             \x20 mov ebx, 1\n\
             \x20 mov ecx, str_0\n\
             \x20 mov edx, str_0_len\n\
             \x20 int 80h\n\
             \x20 push 7\n\
             \x20 mov eax, 1\n\
             \x20 mov ebx, 0\n\
             \x20 int 80h\n"
        );
    }

    #[test]
    fn test_equal_strings_share_a_label() {
        let asm = emit("\"a\" print \"b\" print \"a\" print").unwrap();
        assert_eq!(asm.matches(": db").count(), 2);
        assert_eq!(asm.matches("mov ecx, str_0").count(), 2);
        assert!(asm.contains("mov ecx, str_1"));
    }

    #[test]
    fn test_print_errors() {
        assert!(matches!(
            emit("5 print"),
            Err(EmitError::UnsupportedPrint { .. })
        ));
        let err = emit("print").unwrap_err();
        assert_eq!(err.to_string(), "t.finn:1:1: print from empty stack");
    }

    #[test]
    fn test_db_escapes_quotes_and_newlines() {
        assert_eq!(db_operands("say \"x\"\n"), "\"say \", 34, \"x\", 34, 10, 10");
    }
}
