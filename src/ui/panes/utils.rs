use crate::memory::Value;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders},
};

/// Bordered, titled block; the border lights up when the pane has focus.
pub(crate) fn pane_block(title: &str, is_focused: bool) -> Block<'_> {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

/// Clamp a scroll offset so the last page stays full, and return it.
pub(crate) fn clamp_scroll(offset: &mut usize, total: usize, visible: usize) -> usize {
    if total > visible {
        *offset = (*offset).min(total - visible);
    } else {
        *offset = 0;
    }
    *offset
}

/// Value text colored by variant
pub(crate) fn value_span(value: &Value) -> Span<'static> {
    let color = match value {
        Value::Int(_) | Value::Float(_) => DEFAULT_THEME.number,
        Value::Str(_) => DEFAULT_THEME.string,
        Value::Bool(_) => DEFAULT_THEME.keyword,
        Value::Proc(_) => DEFAULT_THEME.name,
        Value::Struct(_) => DEFAULT_THEME.type_name,
    };
    Span::styled(value.repr(), Style::default().fg(color))
}

/// Dim label such as a variant name or an address
pub(crate) fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(DEFAULT_THEME.comment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_scroll() {
        let mut offset = usize::MAX;
        assert_eq!(clamp_scroll(&mut offset, 10, 4), 6);
        assert_eq!(clamp_scroll(&mut offset, 3, 4), 0);
    }

    #[test]
    fn test_strings_are_quoted() {
        assert_eq!(value_span(&Value::Str("x".into())).content, "\"x\"");
        assert_eq!(value_span(&Value::Int(3)).content, "3");
    }
}
