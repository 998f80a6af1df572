//! Console pane: program output and halt diagnostics up to the current step

use super::utils::{clamp_scroll, pane_block};
use crate::console::{ConsoleLine, LineKind};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    lines: &[ConsoleLine],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Console ", is_focused);

    if lines.is_empty() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let offset = clamp_scroll(scroll_offset, lines.len(), visible_height);

    let items: Vec<ListItem> = lines
        .iter()
        .skip(offset)
        .take(visible_height)
        .map(|line| {
            let color = match line.kind {
                LineKind::Output => DEFAULT_THEME.fg,
                LineKind::Diagnostic => DEFAULT_THEME.error,
            };
            ListItem::new(line.text.as_str()).style(Style::default().fg(color))
        })
        .collect();

    let list = List::new(items).block(block.padding(Padding::new(1, 0, 0, 0)));
    frame.render_widget(list, area);
}
