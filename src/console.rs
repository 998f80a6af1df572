//! Captured program output
//!
//! Every `print` and every halt diagnostic goes through the [`Console`], which
//! keeps them in order so that the snapshot recorder and the inspector can
//! replay them. With echo on, each line is also written to standard output
//! the moment it is produced.

use crate::lexer::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Output,
    Diagnostic,
}

/// One write to the console
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleLine {
    pub kind: LineKind,
    pub text: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Default)]
pub struct Console {
    lines: Vec<ConsoleLine>,
    echo: bool,
}

impl Console {
    pub fn new(echo: bool) -> Self {
        Console {
            lines: Vec::new(),
            echo,
        }
    }

    /// Write a printed value; the newline is implied.
    pub fn print(&mut self, text: String, location: SourceLocation) {
        self.write(LineKind::Output, text, location);
    }

    pub fn diagnostic(&mut self, text: String, location: SourceLocation) {
        self.write(LineKind::Diagnostic, text, location);
    }

    fn write(&mut self, kind: LineKind, text: String, location: SourceLocation) {
        if self.echo {
            println!("{}", text);
        }
        self.lines.push(ConsoleLine {
            kind,
            text,
            location,
        });
    }

    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }

    /// Number of writes so far
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Printed output split into display lines, diagnostics excluded
    pub fn output(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Output)
            .flat_map(|line| line.text.split('\n').map(str::to_string))
            .collect()
    }

    /// Everything written, as standard output would have shown it
    pub fn transcript(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}\n", line.text))
            .collect()
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines
            .iter()
            .filter(|line| line.kind == LineKind::Diagnostic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn loc(line: usize) -> SourceLocation {
        SourceLocation::new(Arc::from("t"), line, 1)
    }

    #[test]
    fn test_output_excludes_diagnostics() {
        let mut console = Console::new(false);
        console.print("a\nb".to_string(), loc(1));
        console.diagnostic("t:2:1: boom".to_string(), loc(2));
        console.print("c".to_string(), loc(3));

        assert_eq!(console.output(), vec!["a", "b", "c"]);
        assert_eq!(console.diagnostics().count(), 1);
        assert_eq!(console.transcript(), "a\nb\nt:2:1: boom\nc\n");
        assert_eq!(console.len(), 3);
    }
}
