//! Form controls: labeled text inputs and the module selector

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::form::{CourseModule, Field};
use super::{accent, danger, inactive, text, text_dim};

/// Bordered input with the field label as title. Secret values are masked
/// and an empty value shows the placeholder.
pub fn text_input(f: &mut Frame, area: Rect, field: Field, value: &str, focused: bool, has_error: bool) {
    let border = if has_error {
        danger()
    } else if focused {
        accent()
    } else {
        inactive()
    };

    let cursor = if focused { "_" } else { "" };
    let line = if value.is_empty() && !focused {
        Line::from(Span::styled(field.placeholder(), Style::default().fg(text_dim())))
    } else {
        let shown = if field.is_secret() {
            "•".repeat(value.chars().count())
        } else {
            value.to_string()
        };
        Line::from(vec![
            Span::styled(shown, Style::default().fg(text())),
            Span::styled(cursor, Style::default().fg(accent())),
        ])
    };

    let input = Paragraph::new(line).block(
        Block::default()
            .title(label_span(field, focused))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, area);
}

/// One-line selector cycling through the four course modules
pub fn module_select(f: &mut Frame, area: Rect, selected: Option<CourseModule>, focused: bool, has_error: bool) {
    let border = if has_error {
        danger()
    } else if focused {
        accent()
    } else {
        inactive()
    };
    let arrow_style = Style::default().fg(if focused { accent() } else { text_dim() });

    let line = match selected {
        Some(module) => Line::from(vec![
            Span::styled("◀ ", arrow_style),
            Span::styled(module.label(), Style::default().fg(text()).add_modifier(Modifier::BOLD)),
            Span::styled(" ▶  ", arrow_style),
            Span::styled(module.value(), Style::default().fg(text_dim())),
        ]),
        None => Line::from(vec![
            Span::styled("◀ ", arrow_style),
            Span::styled("No module selected", Style::default().fg(text_dim())),
            Span::styled(" ▶", arrow_style),
        ]),
    };

    let select = Paragraph::new(line).block(
        Block::default()
            .title(label_span(Field::CourseModule, focused))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(select, area);
}

/// Inline error text under a control
pub fn error_line(f: &mut Frame, area: Rect, message: Option<&str>) {
    if let Some(message) = message {
        let line = Paragraph::new(Line::from(Span::styled(
            format!(" {}", message),
            Style::default().fg(danger()),
        )));
        f.render_widget(line, area);
    }
}

fn label_span(field: Field, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(text_dim())
    };
    Span::styled(format!(" {} ", field.label()), style)
}
