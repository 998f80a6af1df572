//! Source pane with finn syntax highlighting
//!
//! Highlighting works on the raw line text with a small word scanner rather
//! than the lexer, so lines that fail to lex still render.

use super::utils::pane_block;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

fn highlight_line(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut rest = line;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("//") {
            spans.push(Span::styled(rest, Style::default().fg(DEFAULT_THEME.comment)));
            break;
        }

        let len = if c == '"' {
            let end = string_end(rest);
            spans.push(Span::styled(
                &rest[..end],
                Style::default().fg(DEFAULT_THEME.string),
            ));
            end
        } else if c.is_alphanumeric() || c == '_' {
            let end = rest
                .find(|ch: char| !(ch.is_alphanumeric() || ch == '_' || ch == '.'))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            spans.push(Span::styled(word, word_style(word)));
            end
        } else {
            let end = c.len_utf8();
            let style = if c.is_whitespace() {
                Style::default()
            } else {
                Style::default().fg(DEFAULT_THEME.operator)
            };
            spans.push(Span::styled(&rest[..end], style));
            end
        };
        rest = &rest[len..];
    }

    Line::from(spans)
}

/// Byte length of the string literal at the start of `text`, quotes included
fn string_end(text: &str) -> usize {
    let mut escaped = false;
    for (i, c) in text.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    text.len()
}

fn word_style(word: &str) -> Style {
    match word {
        "proc" | "struct" | "macro" | "if" | "else" | "end" | "include" | "call" | "return"
        | "exit" | "pass" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "print" | "dup" | "drop" | "swap" | "and" | "or" | "not" | "sizeof" | "deref"
        | "free" => Style::default().fg(DEFAULT_THEME.primary),
        "int" | "float" | "str" | "bool" | "ptr" => Style::default().fg(DEFAULT_THEME.type_name),
        "true" | "false" => Style::default().fg(DEFAULT_THEME.number),
        _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
            Style::default().fg(DEFAULT_THEME.number)
        }
        _ => Style::default().fg(DEFAULT_THEME.name),
    }
}

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to; centered on first render
    pub target_line_row: Option<usize>,
}

/// What the source pane shows
pub struct SourceView<'a> {
    pub source: &'a str,
    /// 1-based line of the token about to run, if it is in this file
    pub current_line: Option<usize>,
    pub is_error: bool,
}

pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    view: SourceView<'_>,
    is_focused: bool,
    scroll: &mut SourceScrollState,
) {
    let block = pane_block(" Source ", is_focused);
    let lines: Vec<&str> = view.source.lines().collect();
    let total_lines = lines.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    let target_row = scroll
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height - 1);
    scroll.target_line_row = Some(target_row);

    if let Some(current) = view.current_line.filter(|&l| l > 0 && l <= total_lines) {
        scroll.offset = (current - 1).saturating_sub(target_row);
        scroll.offset = if total_lines > visible_height {
            scroll.offset.min(total_lines - visible_height)
        } else {
            0
        };
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(scroll.offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = view.current_line == Some(line_num);
            let mut content = highlight_line(line);

            let num_style = if is_current {
                let line_style = if view.is_error {
                    Style::default()
                        .bg(DEFAULT_THEME.error)
                        .fg(ratatui::style::Color::Black)
                } else {
                    Style::default().bg(DEFAULT_THEME.current_line_bg)
                };
                for span in &mut content.spans {
                    span.style = span.style.patch(line_style);
                }
                Style::default()
                    .fg(if view.is_error {
                        DEFAULT_THEME.error
                    } else {
                        DEFAULT_THEME.secondary
                    })
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let marker = if is_current { "▶" } else { " " };
            let mut spans = vec![Span::styled(format!("{}{:4} ", marker, line_num), num_style)];
            spans.extend(content.spans);
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(visible_lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<String> {
        highlight_line(line)
            .spans
            .iter()
            .map(|s| s.content.to_string())
            .collect()
    }

    #[test]
    fn test_words_strings_and_comments_split() {
        assert_eq!(
            texts("\"a b\" print // done"),
            vec!["\"a b\"", " ", "print", " ", "// done"]
        );
    }

    #[test]
    fn test_float_stays_one_word() {
        assert_eq!(texts("1.5 x ="), vec!["1.5", " ", "x", " ", "="]);
    }

    #[test]
    fn test_unterminated_string_takes_the_rest() {
        assert_eq!(string_end("\"abc"), 4);
        assert_eq!(string_end("\"a\\\"b\" x"), 6);
    }
}
