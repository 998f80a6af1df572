//! The definition operator `::` and installation of captured definitions

use super::engine::Interpreter;
use super::errors::RuntimeError;
use super::namespaces::NameKind;
use super::skip::{CaptureKind, Definition, SkipState};
use crate::lexer::{Literal, Token, TokenKind};
use crate::memory::Value;

impl Interpreter {
    /// `NAME ::` followed by a definition form
    pub(crate) fn define(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let name = self.pop_name("::", token)?;
        let malformed = |message: &str| RuntimeError::MalformedDefinition {
            name: name.clone(),
            message: message.to_string(),
            location: token.location.clone(),
        };

        let Some(next) = self.peek(0).cloned() else {
            return Err(malformed("nothing follows '::'"));
        };

        match next.kind {
            TokenKind::Proc | TokenKind::Macro | TokenKind::Struct => {
                self.advance(1);
                let kind = match next.kind {
                    TokenKind::Proc => CaptureKind::Procedure(Some(name)),
                    TokenKind::Macro => CaptureKind::Macro(name),
                    _ => CaptureKind::Struct(name),
                };
                tracing::trace!(?kind, location = %next.location, "capture started");
                self.skip = SkipState::capture(kind, next);
                Ok(())
            }

            // NAME :: <Type>
            TokenKind::Lt => {
                let struct_name = match (self.peek(1), self.peek(2)) {
                    (Some(ident), Some(close)) if close.is(TokenKind::Gt) => ident
                        .ident()
                        .map(str::to_string)
                        .ok_or_else(|| malformed("expected '<Type>'"))?,
                    _ => return Err(malformed("expected '<Type>'")),
                };
                self.advance(3);
                let def = self.namespaces.struct_def(&struct_name).ok_or_else(|| {
                    RuntimeError::UndefinedStruct {
                        name: struct_name.clone(),
                        location: next.location.clone(),
                    }
                })?;
                let instance = def.instantiate();
                tracing::debug!(name = %name, struct_name = %struct_name, "instance bound");
                self.namespaces.set_variable(name, Value::Struct(instance));
                Ok(())
            }

            // NAME :: ...
            TokenKind::GrabObject => {
                self.advance(1);
                let Some(Value::Proc(body)) =
                    self.stack.take_first(|v| matches!(v, Value::Proc(_)))
                else {
                    return Err(malformed("no procedure value on the stack for '...'"));
                };
                tracing::debug!(name = %name, tokens = body.len(), "procedure bound from value");
                self.namespaces.set_procedure(name, body);
                Ok(())
            }

            // NAME :: |other|
            TokenKind::Pipe => {
                let target = match (self.peek(1), self.peek(2)) {
                    (Some(ident), Some(close)) if close.is(TokenKind::Pipe) => ident
                        .ident()
                        .map(str::to_string)
                        .ok_or_else(|| malformed("expected '|procedure|'"))?,
                    _ => return Err(malformed("expected '|procedure|'")),
                };
                self.advance(3);
                let body = self.namespaces.procedure(&target).cloned().ok_or_else(|| {
                    RuntimeError::UndefinedProcedure {
                        name: target.clone(),
                        location: next.location.clone(),
                    }
                })?;
                self.namespaces.set_procedure(name, body);
                Ok(())
            }

            TokenKind::Push | TokenKind::True | TokenKind::False => {
                self.advance(1);
                match next.literal.clone() {
                    Some(Literal::Ident(other)) => self.alias(name, &other, &next),
                    Some(literal) => {
                        self.namespaces.set_variable(name, Value::from(literal));
                        Ok(())
                    }
                    None => Err(malformed("literal without a value")),
                }
            }

            _ => Err(malformed(&format!(
                "unexpected '{}' after '::'",
                next.kind.spelling()
            ))),
        }
    }

    /// `NAME :: other` where `other` is an existing name
    fn alias(&mut self, name: String, other: &str, token: &Token) -> Result<(), RuntimeError> {
        match self.namespaces.kind_of(other) {
            Some(NameKind::Procedure) => {
                if let Some(body) = self.namespaces.procedure(other).cloned() {
                    self.namespaces.set_procedure(name, body);
                }
            }
            Some(NameKind::Variable) => {
                if let Some(value) = self.namespaces.variable(other).cloned() {
                    self.namespaces.set_variable(name, value);
                }
            }
            Some(NameKind::Macro) => {
                if let Some(body) = self.namespaces.macro_body(other).cloned() {
                    self.namespaces.set_macro(name, body);
                }
            }
            Some(NameKind::Struct) => {
                if let Some(mut def) = self.namespaces.struct_def(other).cloned() {
                    def.name = name;
                    self.namespaces.set_struct(def);
                }
            }
            None => {
                return Err(RuntimeError::UndefinedName {
                    name: other.to_string(),
                    location: token.location.clone(),
                })
            }
        }
        Ok(())
    }

    /// Install a definition completed by a capture
    pub(crate) fn install(&mut self, definition: Definition, token: &Token) {
        match definition {
            Definition::Procedure {
                name: Some(name),
                body,
            } => {
                tracing::debug!(name = %name, tokens = body.len(), location = %token.location, "procedure defined");
                self.namespaces.set_procedure(name, body);
            }
            Definition::Procedure { name: None, body } => {
                tracing::debug!(tokens = body.len(), "anonymous procedure pushed");
                self.stack.push(Value::Proc(body));
            }
            Definition::Macro { name, body } => {
                tracing::debug!(name = %name, tokens = body.len(), "macro defined");
                self.namespaces.set_macro(name, body);
            }
            Definition::Struct(def) => {
                tracing::debug!(name = %def.name, fields = def.fields.len(), "struct defined");
                self.namespaces.set_struct(def);
            }
        }
    }
}
