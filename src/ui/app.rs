//! Inspector state and event loop

use super::panes::{self, SourceScrollState, SourceView, StatusView};
use crate::interpreter::Interpreter;
use crate::lexer::SourceLocation;
use crate::snapshot::{Snapshot, Timeline};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

const PLAY_INTERVAL: Duration = Duration::from_millis(400);
const SPACE_DEBOUNCE: Duration = Duration::from_millis(200);

/// Which pane has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Console,
    Stack,
    Namespaces,
    Memory,
}

impl FocusedPane {
    /// Clockwise: source, console, stack, namespaces, memory
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Console,
            FocusedPane::Console => FocusedPane::Stack,
            FocusedPane::Stack => FocusedPane::Namespaces,
            FocusedPane::Namespaces => FocusedPane::Memory,
            FocusedPane::Memory => FocusedPane::Source,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Memory,
            FocusedPane::Console => FocusedPane::Source,
            FocusedPane::Stack => FocusedPane::Console,
            FocusedPane::Namespaces => FocusedPane::Stack,
            FocusedPane::Memory => FocusedPane::Namespaces,
        }
    }
}

pub struct App {
    /// A finished interpreter; only its recorded history is read
    interpreter: Interpreter,
    source_code: String,
    /// File the source pane shows; tokens from included files do not move it
    main_file: Option<Arc<str>>,
    timeline: Timeline,

    pub focused_pane: FocusedPane,
    source_scroll: SourceScrollState,
    console_scroll: usize,
    stack_scroll: usize,
    namespaces_scroll: usize,
    memory_scroll: usize,

    pub should_quit: bool,
    pub status_message: String,
    pub is_playing: bool,
    last_play_time: Instant,
    last_space_press: Option<Instant>,
}

impl App {
    pub fn new(interpreter: Interpreter, source_code: String) -> Self {
        let (len, main_file) = match interpreter.snapshots() {
            Some(manager) => (
                manager.len(),
                manager.get(0).map(|s| s.location.file.clone()),
            ),
            None => (0, None),
        };
        let status_message = if len == 0 {
            "No snapshots were recorded".to_string()
        } else {
            "Ready".to_string()
        };

        App {
            interpreter,
            source_code,
            main_file,
            timeline: Timeline::new(len),
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            console_scroll: usize::MAX,
            stack_scroll: 0,
            namespaces_scroll: 0,
            memory_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: None,
        }
    }

    /// Hand the interpreter back for the post-run reports.
    pub fn into_interpreter(self) -> Interpreter {
        self.interpreter
    }

    pub fn position(&self) -> usize {
        self.timeline.position()
    }

    pub fn current_snapshot(&self) -> Option<&Snapshot> {
        self.interpreter
            .snapshots()
            .and_then(|manager| manager.get(self.timeline.position()))
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if self.timeline.step_forward(1) {
                    self.status_message = "Playing...".to_string();
                    self.console_scroll = usize::MAX;
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Line to highlight in the main file, and whether it is the halt site
    fn highlighted_line(&self, snapshot: &Snapshot) -> (Option<usize>, bool) {
        let in_main = |location: &SourceLocation| {
            self.main_file
                .as_ref()
                .is_some_and(|file| *file == location.file)
        };

        if self.timeline.at_end() {
            if let Some(error) = self.interpreter.halted() {
                let location = error.location();
                return (in_main(location).then_some(location.line), true);
            }
        }
        let location = &snapshot.location;
        (in_main(location).then_some(location.line), false)
    }

    fn render(&mut self, frame: &mut Frame) {
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(frame.area());

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[0]);

        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(35),
                Constraint::Percentage(25),
            ])
            .split(columns[1]);

        let Some(manager) = self.interpreter.snapshots() else {
            return;
        };
        let Some(snapshot) = manager.get(self.timeline.position()) else {
            return;
        };
        let (current_line, is_error) = self.highlighted_line(snapshot);
        let focused = self.focused_pane;

        panes::render_source_pane(
            frame,
            left_rows[0],
            SourceView {
                source: &self.source_code,
                current_line,
                is_error,
            },
            focused == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let console = self.interpreter.console().lines();
        panes::render_console_pane(
            frame,
            left_rows[1],
            &console[..snapshot.console_len.min(console.len())],
            focused == FocusedPane::Console,
            &mut self.console_scroll,
        );

        panes::render_stack_pane(
            frame,
            right_rows[0],
            &snapshot.stack,
            focused == FocusedPane::Stack,
            &mut self.stack_scroll,
        );

        panes::render_namespaces_pane(
            frame,
            right_rows[1],
            snapshot,
            focused == FocusedPane::Namespaces,
            &mut self.namespaces_scroll,
        );

        panes::render_memory_pane(
            frame,
            right_rows[2],
            &snapshot.memory,
            focused == FocusedPane::Memory,
            &mut self.memory_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            StatusView {
                message: &self.status_message,
                position: self.timeline.position(),
                total: self.timeline.len(),
                mode: &snapshot.mode,
                truncated: manager.is_truncated(),
                halted: is_error,
                is_playing: self.is_playing,
            },
        );
    }

    fn scroll_target(&mut self) -> Option<&mut usize> {
        match self.focused_pane {
            FocusedPane::Source => None,
            FocusedPane::Console => Some(&mut self.console_scroll),
            FocusedPane::Stack => Some(&mut self.stack_scroll),
            FocusedPane::Namespaces => Some(&mut self.namespaces_scroll),
            FocusedPane::Memory => Some(&mut self.memory_scroll),
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c as usize - '0' as usize;
                let before = self.timeline.position();
                self.timeline.step_forward(n);
                self.status_message = format!(
                    "Stepped forward {} step(s)",
                    self.timeline.position() - before
                );
                self.console_scroll = usize::MAX;
            }
            KeyCode::Tab => self.focused_pane = self.focused_pane.next(),
            KeyCode::BackTab => self.focused_pane = self.focused_pane.prev(),
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.timeline.step_forward(1) {
                    "Stepped forward".to_string()
                } else {
                    "Already at the end".to_string()
                };
                self.console_scroll = usize::MAX;
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.timeline.step_back(1) {
                    "Stepped backward".to_string()
                } else {
                    "Already at the start".to_string()
                };
                self.console_scroll = usize::MAX;
            }
            KeyCode::Up => {
                if self.focused_pane == FocusedPane::Source {
                    // Moving the pinned row down scrolls the text up
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                } else if let Some(offset) = self.scroll_target() {
                    *offset = (*offset).saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if self.focused_pane == FocusedPane::Source {
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                } else if let Some(offset) = self.scroll_target() {
                    *offset = (*offset).saturating_add(1);
                }
            }
            KeyCode::Char(' ') => {
                let debounced = self
                    .last_space_press
                    .is_some_and(|at| at.elapsed() < SPACE_DEBOUNCE);
                if !debounced {
                    self.last_space_press = Some(Instant::now());
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(PLAY_INTERVAL)
                            .unwrap_or_else(Instant::now);
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.timeline.to_end();
                self.status_message = match self.interpreter.halted() {
                    Some(error) => error.diagnostic(),
                    None => "Jumped to end".to_string(),
                };
                self.console_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.timeline.to_start();
                self.status_message = "Jumped to start".to_string();
                self.console_scroll = usize::MAX;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::lexer::tokenize;

    fn app(source: &str) -> App {
        let tokens = tokenize(source, "t.finn").unwrap().tokens;
        let config = EngineConfig::default().with_snapshots(1 << 20);
        let mut interpreter = Interpreter::new(tokens, config);
        let _ = interpreter.run();
        App::new(interpreter, source.to_string())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::from(code));
    }

    #[test]
    fn test_arrows_move_through_history() {
        let mut app = app("1 2 + print");
        assert_eq!(app.position(), 0);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.position(), 2);
        assert_eq!(app.current_snapshot().map(|s| s.stack.len()), Some(2));
        press(&mut app, KeyCode::Left);
        assert_eq!(app.position(), 1);
    }

    #[test]
    fn test_enter_and_backspace_jump() {
        let mut app = app("1 2 + print");
        press(&mut app, KeyCode::Enter);
        assert!(app.current_snapshot().is_some_and(|s| s.token.is_none()));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.position(), 0);
    }

    #[test]
    fn test_number_keys_step_n() {
        let mut app = app("1 2 3 4 5 6");
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.position(), 3);
        assert_eq!(app.status_message, "Stepped forward 3 step(s)");
    }

    #[test]
    fn test_halt_is_reported_at_the_end() {
        let mut app = app("1 print\n+");
        press(&mut app, KeyCode::Enter);
        assert!(app.status_message.starts_with("t.finn:2:1:"));
        let snapshot = app.current_snapshot().cloned();
        let (line, is_error) = app.highlighted_line(&snapshot.unwrap());
        assert_eq!(line, Some(2));
        assert!(is_error);
    }

    #[test]
    fn test_focus_cycles() {
        let mut app = app("1");
        for _ in 0..5 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.focused_pane, FocusedPane::Source);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focused_pane, FocusedPane::Memory);
    }
}
