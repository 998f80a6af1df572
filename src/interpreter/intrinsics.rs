//! Normal-mode dispatch of every intrinsic

use super::engine::{type_error, Conditional, FrameKind, Flow, Interpreter};
use super::errors::RuntimeError;
use super::ops::binary::{self, BinaryOp};
use super::ops::convert;
use super::skip::{CaptureKind, SkipState};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::memory::Value;
use std::sync::Arc;

impl Interpreter {
    /// Execute one token outside skip mode
    pub(crate) fn dispatch(&mut self, token: &Token) -> Result<Flow, RuntimeError> {
        use TokenKind::*;

        match token.kind {
            Push => self.push_literal(token)?,
            True => self.stack.push(Value::Bool(true)),
            False => self.stack.push(Value::Bool(false)),

            ObjectAssign => self.define(token)?,
            Proc => {
                self.skip = SkipState::capture(CaptureKind::Procedure(None), token.clone());
            }
            Macro | Struct => {
                return Err(RuntimeError::UnnamedDefinition {
                    keyword: token.kind.spelling(),
                    location: token.location.clone(),
                })
            }

            Call => self.call(token)?,
            If => self.begin_if(token)?,
            Else => self.begin_else(token)?,
            End => {
                if self.conditionals.len() <= self.conditional_base() {
                    return Err(RuntimeError::UnmatchedEnd {
                        location: token.location.clone(),
                    });
                }
                self.conditionals.pop();
            }
            Return => return Ok(self.return_from_procedure()),
            Exit => {
                self.exit(token)?;
                return Ok(Flow::Stop);
            }

            kind if BinaryOp::from_token(kind).is_some() => self.binary(token)?,
            Not => match self.pop("not", token)? {
                Value::Bool(b) => self.stack.push(Value::Bool(!b)),
                other => return Err(type_error("not", "bool", &other, token)),
            },

            Eq => {
                let value = self.pop("=", token)?;
                let name = self.pop_name("=", token)?;
                tracing::trace!(name = %name, "assign");
                self.namespaces.set_variable(name, value);
            }
            Bang => {
                let name = self.pop_name("!", token)?;
                let value = self.variable(&name, token)?.clone();
                self.stack.push(value);
            }
            PlusEq | MinusEq | StarEq | SlashEq => self.compound_assign(token)?,
            PlusPlus | MinusMinus => self.increment(token)?,

            Dup => {
                let value = self.pop("dup", token)?;
                self.stack.push(value.clone());
                self.stack.push(value);
            }
            Swap => {
                let (a, b) = self.pop_pair("swap", token)?;
                self.stack.push(b);
                self.stack.push(a);
            }
            Drop => {
                if let Value::Str(name) = self.pop("drop", token)? {
                    if self.namespaces.remove_variable(&name).is_some() {
                        tracing::debug!(name = %name, "variable dropped");
                    }
                }
            }
            Print => {
                let value = self.stack.pop().ok_or_else(|| RuntimeError::PrintFromEmptyStack {
                    location: token.location.clone(),
                })?;
                self.console.print(value.to_string(), token.location.clone());
            }

            CallStruct => self.instantiate(token)?,
            Arrow => self.field_access(token)?,
            Pipe => self.push_procedure_body(token)?,

            Address => self.address_of(token)?,
            Deref => self.deref(token)?,
            Free => self.free(token)?,
            Sizeof => self.size_of(token)?,
            TypePtr => self.check_pointer(token)?,
            TypeInt | TypeFloat | TypeStr | TypeBool => {
                let value = self.pop(token.kind.spelling(), token)?;
                self.stack.push(convert::convert(token.kind, value, token)?);
            }

            Include => self.include(token)?,

            Pass | LParen | RParen | LBrace | RBrace | Comma => {}
            Eof => return Ok(Flow::Stop),

            _ => {
                return Err(RuntimeError::UnexpectedToken {
                    kind: token.kind,
                    location: token.location.clone(),
                })
            }
        }

        Ok(Flow::Continue)
    }

    /// Literal push, or inline expansion of a macro reference
    fn push_literal(&mut self, token: &Token) -> Result<(), RuntimeError> {
        if let Some(name) = token.ident() {
            let redefining = self.peek(0).is_some_and(|t| t.is(TokenKind::ObjectAssign));
            if !redefining {
                if let Some(body) = self.namespaces.macro_body(name).cloned() {
                    tracing::trace!(name = %name, tokens = body.len(), "macro expanded");
                    return self.enter(body, FrameKind::Macro(name.to_string()), &token.location);
                }
            }
        }

        let literal = token
            .literal
            .clone()
            .ok_or_else(|| RuntimeError::UnexpectedToken {
                kind: token.kind,
                location: token.location.clone(),
            })?;
        self.stack.push(Value::from(literal));
        Ok(())
    }

    pub(crate) fn variable(&self, name: &str, token: &Token) -> Result<&Value, RuntimeError> {
        self.namespaces
            .variable(name)
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
                location: token.location.clone(),
            })
    }

    fn binary(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let Some(op) = BinaryOp::from_token(token.kind) else {
            return Ok(());
        };
        let (a, b) = self.pop_pair(op.symbol(), token)?;
        let result = binary::apply(op, a, b, &token.location)?;
        self.stack.push(result);
        Ok(())
    }

    /// `NAME VALUE +=` and friends
    fn compound_assign(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let Some(op) = BinaryOp::from_compound(token.kind) else {
            return Ok(());
        };
        let spelling = token.kind.spelling();
        let value = self.pop(spelling, token)?;
        let name = self.pop_name(spelling, token)?;
        let current = self.variable(&name, token)?.clone();
        let updated = binary::apply(op, current, value, &token.location)?;
        self.namespaces.set_variable(name, updated);
        Ok(())
    }

    /// `NAME ++` / `NAME --`
    fn increment(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let op = if token.is(TokenKind::PlusPlus) {
            BinaryOp::Add
        } else {
            BinaryOp::Sub
        };
        let name = self.pop_name(token.kind.spelling(), token)?;
        let current = self.variable(&name, token)?.clone();
        let updated = binary::apply(op, current, Value::Int(1), &token.location)?;
        self.namespaces.set_variable(name, updated);
        Ok(())
    }

    fn call(&mut self, token: &Token) -> Result<(), RuntimeError> {
        match self.pop("call", token)? {
            Value::Proc(body) => self.enter(body, FrameKind::Procedure(None), &token.location),
            Value::Str(name) => {
                let body = match self.namespaces.procedure(&name) {
                    Some(body) => Arc::clone(body),
                    None => match self.namespaces.variable(&name) {
                        Some(Value::Proc(body)) => Arc::clone(body),
                        _ => {
                            return Err(RuntimeError::UndefinedProcedure {
                                name,
                                location: token.location.clone(),
                            })
                        }
                    },
                };
                tracing::debug!(name = %name, location = %token.location, "call");
                self.enter(body, FrameKind::Procedure(Some(name)), &token.location)
            }
            other => Err(type_error("call", "a procedure or its name", &other, token)),
        }
    }

    /// `|name|`: push the body of procedure `name`
    fn push_procedure_body(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let name = match (self.peek(0), self.peek(1)) {
            (Some(ident), Some(close)) if close.is(TokenKind::Pipe) => ident.ident().map(str::to_string),
            _ => None,
        };
        let Some(name) = name else {
            return Err(RuntimeError::UnexpectedToken {
                kind: token.kind,
                location: token.location.clone(),
            });
        };
        self.advance(2);

        let body = self.namespaces.procedure(&name).cloned().ok_or_else(|| {
            RuntimeError::UndefinedProcedure {
                name,
                location: token.location.clone(),
            }
        })?;
        self.stack.push(Value::Proc(body));
        Ok(())
    }

    fn begin_if(&mut self, token: &Token) -> Result<(), RuntimeError> {
        match self.pop("if", token)? {
            Value::Bool(true) => self.conditionals.push(Conditional::Then),
            Value::Bool(false) => self.skip = SkipState::branch(true, token.location.clone()),
            other => return Err(type_error("if", "bool", &other, token)),
        }
        Ok(())
    }

    /// `else` reached while executing a taken branch: skip to its `end`
    fn begin_else(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let in_then = self.conditionals.len() > self.conditional_base()
            && self.conditionals.last() == Some(&Conditional::Then);
        if !in_then {
            return Err(RuntimeError::ElseWithoutIf {
                location: token.location.clone(),
            });
        }
        self.conditionals.pop();
        self.skip = SkipState::branch(false, token.location.clone());
        Ok(())
    }

    fn exit(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let code = match self.stack.pop() {
            None => 0,
            Some(Value::Int(n)) => {
                i32::try_from(n).map_err(|_| RuntimeError::InvalidConversion {
                    value: n.to_string(),
                    target: "exit code",
                    location: token.location.clone(),
                })?
            }
            Some(other) => return Err(type_error("exit", "int", &other, token)),
        };
        tracing::debug!(code, location = %token.location, "exit");
        self.exit_code = Some(code);
        self.stop();
        Ok(())
    }

    fn include(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let path = self.pop_name("include", token)?;
        let failed = |message: String| RuntimeError::IncludeFailed {
            path: path.clone(),
            message,
            location: token.location.clone(),
        };

        let Some(loader) = &self.loader else {
            return Err(failed("no source loader is configured".to_string()));
        };
        let source = loader.load(&path, &token.location.file).map_err(failed)?;
        let lexed = tokenize(&source.text, &source.name).map_err(|e| failed(e.to_string()))?;

        for diagnostic in lexed.diagnostics {
            self.console
                .diagnostic(diagnostic.to_string(), diagnostic.location.clone());
        }

        let tokens: Vec<Token> = lexed
            .tokens
            .into_iter()
            .filter(|t| !t.is(TokenKind::Eof))
            .collect();
        tracing::debug!(path = %path, tokens = tokens.len(), "include");
        self.enter(Arc::from(tokens), FrameKind::Include(path.clone()), &token.location)
    }
}
