//! Simulated memory pane

use super::utils::{clamp_scroll, dim, pane_block};
use crate::memory::MemoryUsage;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    usage: &MemoryUsage,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Memory ({} / {} bytes) ", usage.used, usage.capacity);
    let block = pane_block(&title, is_focused);

    let mut rows: Vec<Line> = usage
        .blocks
        .iter()
        .map(|entry| {
            let mut spans = vec![
                dim(format!("0x{:05x} ", entry.address)),
                Span::styled(
                    format!("{:>6} bytes", entry.size),
                    Style::default().fg(DEFAULT_THEME.number),
                ),
            ];
            if !entry.names.is_empty() {
                spans.push(dim("  <- "));
                spans.push(Span::styled(
                    entry.names.join(", "),
                    Style::default().fg(DEFAULT_THEME.name),
                ));
            }
            Line::from(spans)
        })
        .collect();
    if rows.is_empty() {
        rows.push(Line::from(dim("(nothing allocated)")));
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    let offset = clamp_scroll(scroll_offset, rows.len(), visible_height);
    let items: Vec<ListItem> = rows
        .into_iter()
        .skip(offset)
        .take(visible_height)
        .map(ListItem::new)
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}
