//! Operand stack pane
//!
//! The top of the stack is drawn first. Struct instances expand to one row
//! per field.

use super::utils::{clamp_scroll, dim, pane_block, value_span};
use crate::memory::Value;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

fn stack_rows(stack: &[Value]) -> Vec<Line<'static>> {
    let mut rows = Vec::new();

    for (depth, value) in stack.iter().rev().enumerate() {
        let marker = if depth == 0 {
            Span::styled(
                "top ",
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            dim(format!("{:>3} ", depth))
        };

        match value {
            Value::Struct(instance) => {
                rows.push(Line::from(vec![
                    marker,
                    Span::styled(
                        format!("{} ", instance.name),
                        Style::default().fg(DEFAULT_THEME.type_name),
                    ),
                    dim("{"),
                ]));
                for field in &instance.fields {
                    let mut spans = vec![
                        Span::raw("      "),
                        Span::styled(field.name.clone(), Style::default().fg(DEFAULT_THEME.fg)),
                        dim(format!(": {} = ", field.tag)),
                    ];
                    spans.push(match &field.value {
                        Some(value) => value_span(value),
                        None => dim("<unset>"),
                    });
                    rows.push(Line::from(spans));
                }
                rows.push(Line::from(vec![Span::raw("    "), dim("}")]));
            }
            other => rows.push(Line::from(vec![
                marker,
                value_span(other),
                dim(format!("  {}", other.type_name())),
            ])),
        }
    }

    rows
}

pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &[Value],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let title = format!(" Stack ({}) ", stack.len());
    let block = pane_block(&title, is_focused);

    if stack.is_empty() {
        let paragraph = Paragraph::new("(empty)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = stack_rows(stack);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{StructDef, TypeTag};

    #[test]
    fn test_struct_expands_per_field() {
        let def = StructDef {
            name: "P".to_string(),
            fields: vec![
                ("x".to_string(), TypeTag::Int),
                ("y".to_string(), TypeTag::Int),
            ],
        };
        let stack = vec![Value::Int(1), Value::Struct(def.instantiate())];
        let rows = stack_rows(&stack);
        // header, two fields, closing brace, then the int below
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].spans[1].content, "1");
    }
}
