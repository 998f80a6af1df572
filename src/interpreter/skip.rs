//! Skip-mode state machine
//!
//! While skip mode is active the engine feeds every token to [`SkipState::feed`]
//! instead of executing it. Two kinds of region exist:
//!
//! - **Branch skip**: the tokens of a branch not taken are discarded. Block
//!   openers (`if`, `proc`, `macro`, `struct`) raise the tolerance and `end`
//!   lowers it; the region ends at the `end` (or, for a false `if`, the `else`)
//!   seen at tolerance zero.
//! - **Capture**: the tokens of a definition body are collected into a stack
//!   of [`CaptureFrame`]s, one per definition in progress. A nested definition
//!   pushes a frame with its own tolerance, so the outer frame resumes exactly
//!   where it was once the inner one completes.
//!
//! The machine is pure: it never touches the operand stack or the namespaces.
//! Completed definitions are handed back as [`SkipEvent::Defined`] and
//! installed by the engine.

use super::errors::RuntimeError;
use crate::lexer::{Literal, SourceLocation, Token, TokenKind, TokenSeq};
use crate::memory::{StructDef, TypeTag};
use std::sync::Arc;

/// What a capture frame is collecting
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureKind {
    /// `None` for an anonymous procedure
    Procedure(Option<String>),
    Macro(String),
    Struct(String),
}

impl CaptureKind {
    fn label(&self) -> String {
        match self {
            CaptureKind::Procedure(Some(name)) => format!("proc '{}'", name),
            CaptureKind::Procedure(None) => "anonymous proc".to_string(),
            CaptureKind::Macro(name) => format!("macro '{}'", name),
            CaptureKind::Struct(name) => format!("struct '{}'", name),
        }
    }
}

/// Accumulator for one definition body
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFrame {
    pub kind: CaptureKind,
    /// The `proc`/`macro`/`struct` keyword that opened the frame
    pub opener: Token,
    pub tokens: Vec<Token>,
    /// Open `if` blocks inside this body
    pub tolerance: usize,
}

/// A definition completed by a capture
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// `name: None` is an outermost anonymous procedure, pushed as a value
    Procedure {
        name: Option<String>,
        body: TokenSeq,
    },
    Macro {
        name: String,
        body: TokenSeq,
    },
    Struct(StructDef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchEnd {
    /// Stopped on the `else` of a false `if`: the else-branch runs next
    Else,
    /// Stopped on the terminating `end`
    End,
}

/// Outcome of feeding one token
#[derive(Debug, Clone, PartialEq)]
pub enum SkipEvent {
    Consumed,
    BranchEnded(BranchEnd),
    Defined(Definition),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SkipState {
    #[default]
    Inactive,
    Branch {
        tolerance: usize,
        stop_at_else: bool,
        opener: SourceLocation,
    },
    Capture {
        frames: Vec<CaptureFrame>,
    },
}

impl SkipState {
    /// Start skipping a branch. `stop_at_else` is set for a false `if`.
    pub fn branch(stop_at_else: bool, opener: SourceLocation) -> Self {
        SkipState::Branch {
            tolerance: 0,
            stop_at_else,
            opener,
        }
    }

    /// Start capturing a definition opened by `opener`.
    pub fn capture(kind: CaptureKind, opener: Token) -> Self {
        SkipState::Capture {
            frames: vec![CaptureFrame {
                kind,
                opener,
                tokens: Vec::new(),
                tolerance: 0,
            }],
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, SkipState::Inactive)
    }

    /// Tolerance of the innermost region
    pub fn tolerance(&self) -> usize {
        match self {
            SkipState::Inactive => 0,
            SkipState::Branch { tolerance, .. } => *tolerance,
            SkipState::Capture { frames } => frames.last().map_or(0, |f| f.tolerance),
        }
    }

    /// Number of capture frames in progress
    pub fn depth(&self) -> usize {
        match self {
            SkipState::Capture { frames } => frames.len(),
            _ => 0,
        }
    }

    /// One-line description for snapshots and the inspector.
    pub fn describe(&self) -> String {
        match self {
            SkipState::Inactive => "normal".to_string(),
            SkipState::Branch {
                tolerance,
                stop_at_else,
                ..
            } => format!(
                "skipping branch to {} (tolerance {})",
                if *stop_at_else { "else/end" } else { "end" },
                tolerance
            ),
            SkipState::Capture { frames } => {
                let path: Vec<String> = frames.iter().map(|f| f.kind.label()).collect();
                format!(
                    "capturing {} (tolerance {})",
                    path.join(" > "),
                    self.tolerance()
                )
            }
        }
    }

    /// The error reported when input ends while this region is open.
    pub fn unterminated(&self) -> Option<RuntimeError> {
        match self {
            SkipState::Inactive => None,
            SkipState::Branch { opener, .. } => Some(RuntimeError::UnterminatedBlock {
                what: "if".to_string(),
                location: opener.clone(),
            }),
            SkipState::Capture { frames } => frames.last().map(|frame| {
                RuntimeError::UnterminatedBlock {
                    what: frame.kind.label(),
                    location: frame.opener.location.clone(),
                }
            }),
        }
    }

    /// Feed one token to the active region.
    pub fn feed(&mut self, token: &Token) -> Result<SkipEvent, RuntimeError> {
        if token.is(TokenKind::Eof) {
            return Err(self.unterminated().unwrap_or(RuntimeError::UnexpectedToken {
                kind: TokenKind::Eof,
                location: token.location.clone(),
            }));
        }

        match self {
            SkipState::Inactive => Err(RuntimeError::UnexpectedToken {
                kind: token.kind,
                location: token.location.clone(),
            }),
            SkipState::Branch {
                tolerance,
                stop_at_else,
                ..
            } => {
                let stop_at_else = *stop_at_else;
                match token.kind {
                    kind if kind.opens_block() => {
                        *tolerance += 1;
                        Ok(SkipEvent::Consumed)
                    }
                    TokenKind::End if *tolerance == 0 => {
                        *self = SkipState::Inactive;
                        Ok(SkipEvent::BranchEnded(BranchEnd::End))
                    }
                    TokenKind::End => {
                        *tolerance -= 1;
                        Ok(SkipEvent::Consumed)
                    }
                    TokenKind::Else if *tolerance == 0 && stop_at_else => {
                        *self = SkipState::Inactive;
                        Ok(SkipEvent::BranchEnded(BranchEnd::Else))
                    }
                    _ => Ok(SkipEvent::Consumed),
                }
            }
            SkipState::Capture { frames } => {
                let event = feed_capture(frames, token)?;
                if frames.is_empty() {
                    *self = SkipState::Inactive;
                }
                Ok(event)
            }
        }
    }
}

fn feed_capture(frames: &mut Vec<CaptureFrame>, token: &Token) -> Result<SkipEvent, RuntimeError> {
    let Some(frame) = frames.last_mut() else {
        return Ok(SkipEvent::Consumed);
    };

    if let CaptureKind::Struct(_) = frame.kind {
        if token.is(TokenKind::End) {
            return complete_frame(frames, token);
        }
        frame.tokens.push(token.clone());
        return Ok(SkipEvent::Consumed);
    }

    match token.kind {
        TokenKind::If => {
            frame.tolerance += 1;
            frame.tokens.push(token.clone());
            Ok(SkipEvent::Consumed)
        }
        TokenKind::End if frame.tolerance == 0 => complete_frame(frames, token),
        TokenKind::End => {
            frame.tolerance -= 1;
            frame.tokens.push(token.clone());
            Ok(SkipEvent::Consumed)
        }
        TokenKind::Proc | TokenKind::Macro | TokenKind::Struct => {
            let name = take_pending_name(frame, token)?;
            let kind = match (token.kind, name) {
                (TokenKind::Proc, name) => CaptureKind::Procedure(name),
                (TokenKind::Macro, Some(name)) => CaptureKind::Macro(name),
                (_, Some(name)) => CaptureKind::Struct(name),
                (kind, None) => {
                    return Err(RuntimeError::UnnamedDefinition {
                        keyword: kind.spelling(),
                        location: token.location.clone(),
                    })
                }
            };
            tracing::trace!(frame = %kind.label(), depth = frames.len() + 1, "nested capture");
            frames.push(CaptureFrame {
                kind,
                opener: token.clone(),
                tokens: Vec::new(),
                tolerance: 0,
            });
            Ok(SkipEvent::Consumed)
        }
        _ => {
            frame.tokens.push(token.clone());
            Ok(SkipEvent::Consumed)
        }
    }
}

/// If the buffer ends in `NAME ::`, remove those two tokens and return `NAME`.
///
/// Named definitions are rejected inside macro bodies.
fn take_pending_name(
    frame: &mut CaptureFrame,
    opener: &Token,
) -> Result<Option<String>, RuntimeError> {
    let name = match frame.tokens.as_slice() {
        [.., name_token, assign] if assign.is(TokenKind::ObjectAssign) => {
            match (&name_token.kind, &name_token.literal) {
                (TokenKind::Push, Some(Literal::Ident(name) | Literal::Str(name))) => {
                    Some(name.clone())
                }
                _ => None,
            }
        }
        _ => None,
    };

    let Some(name) = name else {
        return Ok(None);
    };

    if let CaptureKind::Macro(macro_name) = &frame.kind {
        return Err(RuntimeError::DefinitionInMacro {
            macro_name: macro_name.clone(),
            location: opener.location.clone(),
        });
    }

    frame.tokens.truncate(frame.tokens.len() - 2);
    Ok(Some(name))
}

fn complete_frame(frames: &mut Vec<CaptureFrame>, end: &Token) -> Result<SkipEvent, RuntimeError> {
    let Some(frame) = frames.pop() else {
        return Ok(SkipEvent::Consumed);
    };

    let definition = match frame.kind {
        CaptureKind::Procedure(None) => {
            if let Some(parent) = frames.last_mut() {
                // Anonymous nested procedure: splice back as `proc ... end`
                parent.tokens.push(frame.opener);
                parent.tokens.extend(frame.tokens);
                parent.tokens.push(end.clone());
                return Ok(SkipEvent::Consumed);
            }
            Definition::Procedure {
                name: None,
                body: Arc::from(frame.tokens),
            }
        }
        CaptureKind::Procedure(Some(name)) => Definition::Procedure {
            name: Some(name),
            body: Arc::from(frame.tokens),
        },
        CaptureKind::Macro(name) => Definition::Macro {
            name,
            body: Arc::from(frame.tokens),
        },
        CaptureKind::Struct(name) => {
            Definition::Struct(parse_struct_fields(name, &frame.tokens, &frame.opener)?)
        }
    };

    Ok(SkipEvent::Defined(definition))
}

/// Parse a struct body: a sequence of `field [:] type` entries.
pub fn parse_struct_fields(
    name: String,
    tokens: &[Token],
    opener: &Token,
) -> Result<StructDef, RuntimeError> {
    let malformed = |message: String, location: &SourceLocation| RuntimeError::MalformedStruct {
        name: name.clone(),
        message,
        location: location.clone(),
    };

    let mut fields: Vec<(String, TypeTag)> = Vec::new();
    let mut iter = tokens.iter().peekable();

    while let Some(field_token) = iter.next() {
        let Some(field) = field_token.ident() else {
            return Err(malformed(
                format!("expected a field name, found '{}'", describe(field_token)),
                &field_token.location,
            ));
        };

        if iter.peek().is_some_and(|t| t.is(TokenKind::Colon)) {
            iter.next();
        }

        let Some(type_token) = iter.next() else {
            return Err(malformed(
                format!("field '{}' has no type", field),
                &field_token.location,
            ));
        };

        let tag = match type_token.kind {
            TokenKind::TypeInt => TypeTag::Int,
            TokenKind::TypeFloat => TypeTag::Float,
            TokenKind::TypeStr => TypeTag::Str,
            TokenKind::TypeBool => TypeTag::Bool,
            TokenKind::TypePtr => TypeTag::Ptr,
            _ => match type_token.ident() {
                Some(struct_name) => TypeTag::Struct(struct_name.to_string()),
                None => {
                    return Err(malformed(
                        format!(
                            "field '{}' has invalid type '{}'",
                            field,
                            describe(type_token)
                        ),
                        &type_token.location,
                    ))
                }
            },
        };

        if fields.iter().any(|(existing, _)| existing == field) {
            return Err(malformed(
                format!("duplicate field '{}'", field),
                &field_token.location,
            ));
        }
        fields.push((field.to_string(), tag));
    }

    tracing::debug!(name = %name, fields = fields.len(), location = %opener.location, "struct parsed");
    Ok(StructDef { name, fields })
}

fn describe(token: &Token) -> String {
    match &token.literal {
        Some(literal) => literal.to_string(),
        None => token.kind.spelling().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn tokens(source: &str) -> Vec<Token> {
        let mut tokens = tokenize(source, "t").unwrap().tokens;
        tokens.pop(); // Eof
        tokens
    }

    fn opener(kind: TokenKind) -> Token {
        let mut token = tokens("proc").remove(0);
        token.kind = kind;
        token
    }

    /// Feed tokens until the region ends, returning the index of the terminator.
    fn run_branch(state: &mut SkipState, tokens: &[Token]) -> (usize, BranchEnd) {
        for (i, token) in tokens.iter().enumerate() {
            if let SkipEvent::BranchEnded(end) = state.feed(token).unwrap() {
                assert_eq!(state.tolerance(), 0);
                return (i, end);
            }
        }
        panic!("branch never ended");
    }

    #[test]
    fn test_branch_skip_stops_at_matching_end() {
        let toks = tokens("a true if b else c end d end e");
        let mut state = SkipState::branch(false, toks[0].location.clone());
        let (index, end) = run_branch(&mut state, &toks);
        assert_eq!(end, BranchEnd::End);
        assert_eq!(toks[index + 1].ident(), Some("e"));
        assert!(!state.is_active());
    }

    #[test]
    fn test_false_if_stops_at_same_level_else() {
        let toks = tokens("x if y else z end else w end");
        let mut state = SkipState::branch(true, toks[0].location.clone());
        let (index, end) = run_branch(&mut state, &toks);
        assert_eq!(end, BranchEnd::Else);
        assert_eq!(toks[index + 1].ident(), Some("w"));
    }

    #[test]
    fn test_branch_skip_counts_definition_openers() {
        let toks = tokens("P :: proc 1 end S :: struct x int end end tail");
        let mut state = SkipState::branch(true, toks[0].location.clone());
        let (index, _) = run_branch(&mut state, &toks);
        assert_eq!(toks[index + 1].ident(), Some("tail"));
    }

    #[test]
    fn test_capture_balances_inner_if() {
        let mut state = SkipState::capture(
            CaptureKind::Procedure(Some("f".into())),
            opener(TokenKind::Proc),
        );
        let toks = tokens("true if 1 print end 2 end");
        let mut defined = None;
        for token in &toks {
            if let SkipEvent::Defined(def) = state.feed(token).unwrap() {
                defined = Some(def);
            }
        }
        let Some(Definition::Procedure { name, body }) = defined else {
            panic!("expected a procedure");
        };
        assert_eq!(name.as_deref(), Some("f"));
        assert_eq!(body.len(), 6);
        assert_eq!(body[4].kind, TokenKind::End);
        assert!(!state.is_active());
    }

    #[test]
    fn test_named_nested_definition_is_lifted_out() {
        let mut state = SkipState::capture(
            CaptureKind::Procedure(Some("outer".into())),
            opener(TokenKind::Proc),
        );
        let toks = tokens("1 inner :: proc 2 end 3 end");
        let mut defs = Vec::new();
        for token in &toks {
            if let SkipEvent::Defined(def) = state.feed(token).unwrap() {
                defs.push(def);
            }
        }
        assert_eq!(defs.len(), 2);
        match &defs[0] {
            Definition::Procedure { name, body } => {
                assert_eq!(name.as_deref(), Some("inner"));
                assert_eq!(body.len(), 1);
            }
            other => panic!("unexpected {:?}", other),
        }
        match &defs[1] {
            Definition::Procedure { name, body } => {
                assert_eq!(name.as_deref(), Some("outer"));
                let lits: Vec<_> = body.iter().map(|t| t.literal.clone()).collect();
                assert_eq!(lits, vec![Some(Literal::Int(1)), Some(Literal::Int(3))]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_anonymous_nested_proc_is_merged_back() {
        let mut state = SkipState::capture(
            CaptureKind::Procedure(Some("outer".into())),
            opener(TokenKind::Proc),
        );
        let toks = tokens("proc 1 if 2 end end call end");
        let mut defs = Vec::new();
        for token in &toks {
            if let SkipEvent::Defined(def) = state.feed(token).unwrap() {
                defs.push(def);
            }
        }
        let [Definition::Procedure { body, .. }] = defs.as_slice() else {
            panic!("expected one procedure");
        };
        let kinds: Vec<_> = body.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(kinds, vec![Proc, Push, If, Push, End, End, Call]);
    }

    #[test]
    fn test_outer_tolerance_survives_inner_frame() {
        let mut state =
            SkipState::capture(CaptureKind::Macro("m".into()), opener(TokenKind::Macro));
        for token in &tokens("true if proc if") {
            state.feed(token).unwrap();
        }
        assert_eq!(state.depth(), 2);
        assert_eq!(state.tolerance(), 1);
        for token in &tokens("end end") {
            state.feed(token).unwrap();
        }
        assert_eq!(state.depth(), 1);
        assert_eq!(state.tolerance(), 1);
    }

    #[test]
    fn test_named_definition_inside_macro_is_fatal() {
        let mut state =
            SkipState::capture(CaptureKind::Macro("m".into()), opener(TokenKind::Macro));
        let toks = tokens("f :: proc");
        state.feed(&toks[0]).unwrap();
        state.feed(&toks[1]).unwrap();
        let err = state.feed(&toks[2]).unwrap_err();
        assert!(matches!(err, RuntimeError::DefinitionInMacro { .. }));
    }

    #[test]
    fn test_unnamed_nested_struct_is_fatal() {
        let mut state = SkipState::capture(CaptureKind::Procedure(None), opener(TokenKind::Proc));
        let err = state.feed(&tokens("struct")[0]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::UnnamedDefinition { keyword: "struct", .. }
        ));
    }

    #[test]
    fn test_struct_fields_with_optional_colon() {
        let open = opener(TokenKind::Struct);
        let def = parse_struct_fields(
            "Node".into(),
            &tokens("value: int label str next Node"),
            &open,
        )
        .unwrap();
        assert_eq!(
            def.fields,
            vec![
                ("value".to_string(), TypeTag::Int),
                ("label".to_string(), TypeTag::Str),
                ("next".to_string(), TypeTag::Struct("Node".into())),
            ]
        );
    }

    #[test]
    fn test_struct_rejects_duplicates_and_garbage() {
        let open = opener(TokenKind::Struct);
        let dup = parse_struct_fields("S".into(), &tokens("a int a int"), &open).unwrap_err();
        assert!(dup.to_string().contains("duplicate field 'a'"));

        let bad = parse_struct_fields("S".into(), &tokens("a 5"), &open).unwrap_err();
        assert!(matches!(bad, RuntimeError::MalformedStruct { .. }));
    }

    #[test]
    fn test_eof_while_capturing_is_unterminated() {
        let mut state = SkipState::capture(CaptureKind::Procedure(None), opener(TokenKind::Proc));
        let eof = tokenize("", "t").unwrap().tokens.remove(0);
        let err = state.feed(&eof).unwrap_err();
        assert!(matches!(err, RuntimeError::UnterminatedBlock { .. }));
    }
}
