//! Status bar: position, engine mode and key hints

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusView<'a> {
    pub message: &'a str,
    pub position: usize,
    pub total: usize,
    /// Skip-mode description of the current snapshot
    pub mode: &'a str,
    pub truncated: bool,
    pub halted: bool,
    pub is_playing: bool,
}

fn badge(text: &str, bg: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", text),
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

pub fn render_status_bar(frame: &mut Frame, area: Rect, view: StatusView<'_>) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bar = Style::default().bg(DEFAULT_THEME.current_line_bg);
    let sep_style = bar.fg(DEFAULT_THEME.comment);

    let mut left_spans = vec![
        badge(
            &format!("Step {}/{}", view.position + 1, view.total),
            if view.halted {
                DEFAULT_THEME.error
            } else {
                DEFAULT_THEME.primary
            },
        ),
        Span::styled(" | ", sep_style),
        Span::styled(format!("{} ", view.mode), bar.fg(DEFAULT_THEME.secondary)),
        Span::styled("| ", sep_style),
        Span::styled(view.message.to_string(), bar.fg(DEFAULT_THEME.fg)),
    ];
    if view.truncated {
        left_spans.push(Span::styled(" | ", sep_style));
        left_spans.push(Span::styled(
            "history truncated",
            bar.fg(DEFAULT_THEME.error),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar.fg(DEFAULT_THEME.fg);
    let mut right_spans = Vec::new();
    for (key, desc) in [
        ("←/→", "step"),
        ("1-9", "jump"),
        ("⎵", "play"),
        ("↵/⌫", "end/start"),
        ("q", "quit"),
    ] {
        right_spans.push(Span::styled(format!(" {} ", key), key_style));
        right_spans.push(Span::styled(format!(" {} ", desc), desc_style));
    }

    let at_end = view.position + 1 >= view.total;
    if view.is_playing {
        right_spans.push(badge("▶ PLAYING", DEFAULT_THEME.secondary));
    } else if at_end {
        right_spans.push(badge("END", DEFAULT_THEME.error));
    } else if view.position == 0 {
        right_spans.push(badge("START", DEFAULT_THEME.success));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar)
            .alignment(Alignment::Right),
        layout[1],
    );
}
