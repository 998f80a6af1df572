// Execution engine for the finn interpreter

use super::errors::RuntimeError;
use super::include::SourceLoader;
use super::namespaces::Namespaces;
use super::skip::{BranchEnd, SkipEvent, SkipState};
use crate::config::EngineConfig;
use crate::console::Console;
use crate::lexer::{SourceLocation, Token, TokenKind, TokenSeq};
use crate::memory::{MemorySimulator, OperandStack, Value};
use crate::snapshot::{Snapshot, SnapshotManager};
use std::sync::Arc;

/// What pushed an execution frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Program,
    /// Procedure call; `None` for an anonymous `Proc` value
    Procedure(Option<String>),
    Macro(String),
    Include(String),
}

/// A token sequence being executed, with its cursor
#[derive(Debug, Clone)]
pub struct ExecFrame {
    pub tokens: TokenSeq,
    pub cursor: usize,
    pub kind: FrameKind,
    /// Height of the conditional stack when the frame was entered
    pub conditional_base: usize,
}

/// Branch of an open `if` currently executing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conditional {
    Then,
    Else,
}

/// Whether the run loop keeps going after a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Stop,
}

/// The finn interpreter: one instance owns all execution state
#[derive(Debug)]
pub struct Interpreter {
    /// Execution frames, innermost last
    frames: Vec<ExecFrame>,

    pub(crate) stack: OperandStack,

    pub(crate) namespaces: Namespaces,

    /// Branch skip or definition capture in progress
    pub(crate) skip: SkipState,

    /// Open conditionals, innermost last
    pub(crate) conditionals: Vec<Conditional>,

    pub(crate) memory: MemorySimulator,

    pub(crate) console: Console,

    pub(crate) config: EngineConfig,

    /// Host-supplied loader for `include`
    pub(crate) loader: Option<Box<dyn SourceLoader>>,

    snapshots: Option<SnapshotManager>,

    /// Error that halted the run, if any
    halted: Option<RuntimeError>,

    /// Code recorded by `exit`
    pub(crate) exit_code: Option<i32>,

    call_depth: usize,
    macro_depth: usize,
    include_depth: usize,

    /// Tokens processed so far
    steps: usize,

    last_location: SourceLocation,
}

impl Interpreter {
    /// Create an interpreter for a tokenized program
    pub fn new(tokens: Vec<Token>, config: EngineConfig) -> Self {
        let last_location = tokens
            .first()
            .map(|t| t.location.clone())
            .unwrap_or_else(|| SourceLocation::new(Arc::from("<input>"), 1, 1));
        let snapshots = config
            .record_snapshots
            .then(|| SnapshotManager::new(config.snapshot_memory_limit));

        Interpreter {
            frames: vec![ExecFrame {
                tokens: Arc::from(tokens),
                cursor: 0,
                kind: FrameKind::Program,
                conditional_base: 0,
            }],
            stack: OperandStack::new(),
            namespaces: Namespaces::new(),
            skip: SkipState::Inactive,
            conditionals: Vec::new(),
            memory: MemorySimulator::new(config.memory_capacity, config.address_slots),
            console: Console::new(config.echo),
            config,
            loader: None,
            snapshots,
            halted: None,
            exit_code: None,
            call_depth: 0,
            macro_depth: 0,
            include_depth: 0,
            steps: 0,
            last_location,
        }
    }

    /// Attach the loader used by `include`
    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Replace the program with a new one, keeping namespaces, the operand
    /// stack and memory. Used by the REPL; clears a previous halt.
    pub fn load(&mut self, tokens: Vec<Token>) {
        if let Some(first) = tokens.first() {
            self.last_location = first.location.clone();
        }
        self.frames = vec![ExecFrame {
            tokens: Arc::from(tokens),
            cursor: 0,
            kind: FrameKind::Program,
            conditional_base: 0,
        }];
        self.skip = SkipState::Inactive;
        self.conditionals.clear();
        self.halted = None;
        self.call_depth = 0;
        self.macro_depth = 0;
        self.include_depth = 0;
    }

    /// Run until the end of the program, `exit`, or a fatal error.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        tracing::debug!(tokens = self.frames.first().map_or(0, |f| f.tokens.len()), "run started");

        loop {
            let (tokens, index) = match self.next_token() {
                Ok(Some(next)) => next,
                Ok(None) => break,
                Err(error) => return Err(self.halt(error)),
            };
            let token = &tokens[index];

            self.record_snapshot(Some(token));
            self.steps += 1;
            self.last_location = token.location.clone();

            match self.step(token) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break,
                Err(error) => return Err(self.halt(error)),
            }
        }

        self.record_final_snapshot();
        tracing::debug!(steps = self.steps, exit_code = ?self.exit_code, "run finished");
        Ok(())
    }

    /// Process one token in the current mode
    fn step(&mut self, token: &Token) -> Result<Flow, RuntimeError> {
        if !self.skip.is_active() {
            tracing::trace!(kind = %token.kind, location = %token.location, "dispatch");
            return self.dispatch(token);
        }

        match self.skip.feed(token)? {
            SkipEvent::Consumed | SkipEvent::BranchEnded(BranchEnd::End) => {}
            SkipEvent::BranchEnded(BranchEnd::Else) => self.conditionals.push(Conditional::Else),
            SkipEvent::Defined(definition) => self.install(definition, token),
        }
        Ok(Flow::Continue)
    }

    /// Fetch the next token, popping exhausted frames.
    ///
    /// Returns the shared sequence and an index into it so the caller can
    /// borrow the token while mutating the interpreter.
    fn next_token(&mut self) -> Result<Option<(TokenSeq, usize)>, RuntimeError> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };

            if frame.cursor < frame.tokens.len() {
                let index = frame.cursor;
                frame.cursor += 1;
                return Ok(Some((Arc::clone(&frame.tokens), index)));
            }

            if let Some(frame) = self.frames.pop() {
                self.leave(&frame);
                if matches!(frame.kind, FrameKind::Include(_)) {
                    if let Some(error) = self.skip.unterminated() {
                        return Err(error);
                    }
                }
            }
        }
    }

    /// Bookkeeping for a frame that is being left
    fn leave(&mut self, frame: &ExecFrame) {
        match frame.kind {
            FrameKind::Procedure(_) => self.call_depth = self.call_depth.saturating_sub(1),
            FrameKind::Macro(_) => self.macro_depth = self.macro_depth.saturating_sub(1),
            FrameKind::Include(_) => self.include_depth = self.include_depth.saturating_sub(1),
            FrameKind::Program => {}
        }
        self.conditionals.truncate(frame.conditional_base);
    }

    /// Push a frame for a call site at `location`, enforcing the depth limits.
    pub(crate) fn enter(
        &mut self,
        tokens: TokenSeq,
        kind: FrameKind,
        location: &SourceLocation,
    ) -> Result<(), RuntimeError> {
        match &kind {
            FrameKind::Procedure(_) => {
                if self.call_depth >= self.config.max_call_depth {
                    return Err(RuntimeError::RecursionLimit {
                        limit: self.config.max_call_depth,
                        location: location.clone(),
                    });
                }
                self.call_depth += 1;
            }
            FrameKind::Macro(name) => {
                if self.macro_depth >= self.config.max_macro_depth {
                    return Err(RuntimeError::MacroDepthExceeded {
                        name: name.clone(),
                        limit: self.config.max_macro_depth,
                        location: location.clone(),
                    });
                }
                self.macro_depth += 1;
            }
            FrameKind::Include(path) => {
                if self.include_depth >= self.config.max_include_depth {
                    return Err(RuntimeError::IncludeFailed {
                        path: path.clone(),
                        message: format!(
                            "include depth above {}",
                            self.config.max_include_depth
                        ),
                        location: location.clone(),
                    });
                }
                self.include_depth += 1;
            }
            FrameKind::Program => {}
        }

        tracing::debug!(frame = ?kind, depth = self.frames.len() + 1, "enter frame");
        self.frames.push(ExecFrame {
            tokens,
            cursor: 0,
            kind,
            conditional_base: self.conditionals.len(),
        });
        Ok(())
    }

    /// Leave the innermost procedure. Returns `Flow::Stop` at top level.
    pub(crate) fn return_from_procedure(&mut self) -> Flow {
        let Some(index) = self
            .frames
            .iter()
            .rposition(|f| matches!(f.kind, FrameKind::Procedure(_)))
        else {
            self.frames.clear();
            return Flow::Stop;
        };

        while self.frames.len() > index {
            if let Some(frame) = self.frames.pop() {
                self.leave(&frame);
            }
        }
        Flow::Continue
    }

    /// Drop every frame; the run loop ends on its next fetch.
    pub(crate) fn stop(&mut self) {
        self.frames.clear();
    }

    /// Token `offset` positions after the one being executed, in the same frame
    pub(crate) fn peek(&self, offset: usize) -> Option<&Token> {
        let frame = self.frames.last()?;
        frame.tokens.get(frame.cursor + offset)
    }

    /// Consume `n` look-ahead tokens
    pub(crate) fn advance(&mut self, n: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.cursor = (frame.cursor + n).min(frame.tokens.len());
        }
    }

    /// Conditional stack height owned by the current frame
    pub(crate) fn conditional_base(&self) -> usize {
        self.frames.last().map_or(0, |f| f.conditional_base)
    }

    /// Cooperative halt: report, then replace the remaining stream with an
    /// end marker so nothing else executes. State is retained.
    fn halt(&mut self, error: RuntimeError) -> RuntimeError {
        let location = error.location().clone();
        tracing::debug!(%error, "halted");
        self.console.diagnostic(error.diagnostic(), location.clone());

        self.frames = vec![ExecFrame {
            tokens: Arc::from(vec![Token::eof(location)]),
            cursor: 0,
            kind: FrameKind::Program,
            conditional_base: 0,
        }];
        self.skip = SkipState::Inactive;
        self.conditionals.clear();
        self.call_depth = 0;
        self.macro_depth = 0;
        self.include_depth = 0;
        self.halted = Some(error.clone());
        self.record_final_snapshot();
        error
    }

    /// Pop one value for intrinsic `op`
    pub(crate) fn pop(&mut self, op: &'static str, token: &Token) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| RuntimeError::StackUnderflow {
            op,
            needed: 1,
            location: token.location.clone(),
        })
    }

    /// Pop two values `(a, b)` where `b` was on top
    pub(crate) fn pop_pair(
        &mut self,
        op: &'static str,
        token: &Token,
    ) -> Result<(Value, Value), RuntimeError> {
        if self.stack.len() < 2 {
            return Err(RuntimeError::StackUnderflow {
                op,
                needed: 2,
                location: token.location.clone(),
            });
        }
        let b = self.pop(op, token)?;
        let a = self.pop(op, token)?;
        Ok((a, b))
    }

    /// Pop a value that must be a name (`Str`)
    pub(crate) fn pop_name(&mut self, op: &'static str, token: &Token) -> Result<String, RuntimeError> {
        match self.pop(op, token)? {
            Value::Str(name) => Ok(name),
            other => Err(type_error(op, "a name", &other, token)),
        }
    }

    pub(crate) fn pop_int(&mut self, op: &'static str, token: &Token) -> Result<i64, RuntimeError> {
        match self.pop(op, token)? {
            Value::Int(n) => Ok(n),
            other => Err(type_error(op, "int", &other, token)),
        }
    }

    fn record_snapshot(&mut self, token: Option<&Token>) {
        let Some(manager) = &self.snapshots else {
            return;
        };
        if manager.is_truncated() {
            return;
        }

        let snapshot = self.capture(token);
        if let Some(manager) = &mut self.snapshots {
            if let Err(error) = manager.push(snapshot) {
                tracing::warn!(%error, step = self.steps, "snapshot recording stopped");
            }
        }
    }

    fn record_final_snapshot(&mut self) {
        if self.snapshots.is_none() {
            return;
        }
        let snapshot = self.capture(None);
        if let Some(manager) = &mut self.snapshots {
            manager.push_final(snapshot);
        }
    }

    fn capture(&self, token: Option<&Token>) -> Snapshot {
        Snapshot {
            step: self.steps,
            token: token.cloned(),
            location: token.map_or_else(|| self.last_location.clone(), |t| t.location.clone()),
            stack: self.stack.as_slice().to_vec(),
            variables: self.namespaces.sorted_variables(),
            procedures: self.namespaces.procedure_names(),
            structs: self.namespaces.struct_names(),
            macros: self.namespaces.macro_names(),
            memory: self.memory.usage(),
            console_len: self.console.len(),
            mode: self.skip.describe(),
            frame_depth: self.frames.len(),
        }
    }

    // Accessors

    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn memory(&self) -> &MemorySimulator {
        &self.memory
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn halted(&self) -> Option<&RuntimeError> {
        self.halted.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn skip_state(&self) -> &SkipState {
        &self.skip
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn snapshots(&self) -> Option<&SnapshotManager> {
        self.snapshots.as_ref()
    }

    /// Whether the remaining program is only the end marker left by a halt
    pub fn remaining_is_eof(&self) -> bool {
        self.frames.iter().all(|frame| {
            frame.tokens[frame.cursor.min(frame.tokens.len())..]
                .iter()
                .all(|t| t.is(TokenKind::Eof))
        })
    }
}

pub(crate) fn type_error(
    op: &'static str,
    expected: &str,
    got: &Value,
    token: &Token,
) -> RuntimeError {
    RuntimeError::TypeError {
        op,
        expected: expected.to_string(),
        got: got.type_name().to_string(),
        location: token.location.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn interpreter(source: &str) -> Interpreter {
        let tokens = tokenize(source, "t").unwrap().tokens;
        Interpreter::new(tokens, EngineConfig::default())
    }

    #[test]
    fn test_frames_unwind_after_calls() {
        let mut interp = interpreter("f :: proc true if 1 end end f call f call 2");
        interp.run().unwrap();
        assert_eq!(interp.stack().len(), 3);
        assert!(interp.conditionals.is_empty());
        assert_eq!(interp.call_depth, 0);
    }

    #[test]
    fn test_conditional_inside_procedure_does_not_leak() {
        // the `if` opened inside f is dropped with f's frame
        let mut interp = interpreter("f :: proc true if 1 return end end f call end");
        let err = interp.run().unwrap_err();
        assert!(matches!(err, RuntimeError::UnmatchedEnd { .. }));
    }

    #[test]
    fn test_halt_resets_nesting() {
        let mut interp = interpreter("m :: macro + end f :: proc m end f call");
        assert!(interp.run().is_err());
        assert_eq!(interp.frame_depth(), 1);
        assert_eq!((interp.call_depth, interp.macro_depth), (0, 0));
        assert!(interp.remaining_is_eof());
        assert_eq!(interp.steps(), 12);
    }
}
