use crate::interpreter::engine::{type_error, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::lexer::{Token, TokenKind};
use crate::memory::{StructInstance, Value};

impl Interpreter {
    /// `<>`: pop a struct type name, push a fresh instance
    pub(crate) fn instantiate(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let name = self.pop_name("<>", token)?;
        let def = self
            .namespaces
            .struct_def(&name)
            .ok_or_else(|| RuntimeError::UndefinedStruct {
                name: name.clone(),
                location: token.location.clone(),
            })?;
        let instance = def.instantiate();
        self.stack.push(Value::Struct(instance));
        Ok(())
    }

    /// `-> field <literal> =` writes, `-> field` reads. A bare `=` after the
    /// field is left for the next step, so `v inst -> f =` binds `v`.
    pub(crate) fn field_access(&mut self, token: &Token) -> Result<(), RuntimeError> {
        let field = match self.peek(0).and_then(Token::ident) {
            Some(field) => field.to_string(),
            None => {
                return Err(RuntimeError::UnexpectedToken {
                    kind: token.kind,
                    location: token.location.clone(),
                })
            }
        };

        let is_eq = |t: Option<&Token>| t.is_some_and(|t| t.is(TokenKind::Eq));
        let inline_literal = match (self.peek(1), self.peek(2)) {
            (Some(literal), next)
                if is_eq(next)
                    && matches!(
                        literal.kind,
                        TokenKind::Push | TokenKind::True | TokenKind::False
                    ) =>
            {
                literal.literal.clone()
            }
            _ => None,
        };

        if let Some(literal) = inline_literal {
            // -> f <literal> =
            self.advance(3);
            let mut instance = self.pop_struct("->", token)?;
            write_field(&mut instance, &field, Value::from(literal), token)?;
            self.stack.push(Value::Struct(instance));
        } else {
            // -> f
            self.advance(1);
            let instance = self.pop_struct("->", token)?;
            let value = read_field(&instance, &field, token)?;
            self.stack.push(value);
        }
        Ok(())
    }

    fn pop_struct(&mut self, op: &'static str, token: &Token) -> Result<StructInstance, RuntimeError> {
        match self.pop(op, token)? {
            Value::Struct(instance) => Ok(instance),
            other => Err(type_error(op, "struct", &other, token)),
        }
    }
}

fn read_field(instance: &StructInstance, field: &str, token: &Token) -> Result<Value, RuntimeError> {
    let slot = instance
        .field(field)
        .ok_or_else(|| missing_field(instance, field, token))?;
    slot.value
        .clone()
        .ok_or_else(|| RuntimeError::UninitializedField {
            struct_name: instance.name.clone(),
            field_name: field.to_string(),
            location: token.location.clone(),
        })
}

fn write_field(
    instance: &mut StructInstance,
    field: &str,
    value: Value,
    token: &Token,
) -> Result<(), RuntimeError> {
    match instance.field_mut(field) {
        Some(slot) => {
            slot.value = Some(value);
            Ok(())
        }
        None => Err(missing_field(instance, field, token)),
    }
}

fn missing_field(instance: &StructInstance, field: &str, token: &Token) -> RuntimeError {
    RuntimeError::MissingStructField {
        struct_name: instance.name.clone(),
        field_name: field.to_string(),
        location: token.location.clone(),
    }
}
