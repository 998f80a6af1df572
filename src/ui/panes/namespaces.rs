//! Variables and defined names at the current step

use super::utils::{clamp_scroll, dim, pane_block, value_span};
use crate::snapshot::Snapshot;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD),
    ))
}

fn name_rows(rows: &mut Vec<Line<'static>>, title: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    rows.push(section(title));
    rows.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(names.join(", "), Style::default().fg(DEFAULT_THEME.name)),
    ]));
}

pub fn render_namespaces_pane(
    frame: &mut Frame,
    area: Rect,
    snapshot: &Snapshot,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Namespaces ", is_focused);
    let mut rows = Vec::new();

    rows.push(section("Variables"));
    if snapshot.variables.is_empty() {
        rows.push(Line::from(vec![Span::raw("  "), dim("(none)")]));
    }
    for (name, value) in &snapshot.variables {
        rows.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(name.clone(), Style::default().fg(DEFAULT_THEME.fg)),
            dim(" = "),
            value_span(value),
        ]));
    }

    name_rows(&mut rows, "Procedures", &snapshot.procedures);
    name_rows(&mut rows, "Structs", &snapshot.structs);
    name_rows(&mut rows, "Macros", &snapshot.macros);

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
