//! Shared rendering helpers: the form widget used by every entry tab
//! and small layout utilities.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::forms::{FieldKind, Form};

use super::styles;

/// Render a form as labelled rows plus a submit button, with inline
/// errors next to the offending field.
pub fn render_form(
    frame: &mut Frame,
    area: Rect,
    form: &Form,
    title: &str,
    focused: bool,
    submit_label: &str,
) {
    let mut lines = Vec::new();

    for (i, field) in form.fields.iter().enumerate() {
        let field_focused = focused && form.focus == i;
        let value_style = if field_focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        let display = match field.kind {
            FieldKind::Password => "*".repeat(field.value.chars().count().min(24)),
            FieldKind::Select(_) => format!("< {} >", field.value),
            _ => field.value.clone(),
        };
        let cursor = if field_focused && !matches!(field.kind, FieldKind::Select(_)) {
            "▌"
        } else {
            ""
        };

        let mut spans = vec![
            Span::raw(" "),
            Span::styled(format!("{:<16}", field.label), styles::muted_style()),
            Span::styled("[", styles::muted_style()),
            Span::styled(format!("{:<24}{}", display, cursor), value_style),
            Span::styled("]", styles::muted_style()),
        ];

        if let Some(ref error) = field.error {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(error.clone(), styles::error_style()));
        }

        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let button_focused = focused && form.on_button();
    let button = if button_focused {
        format!(" ▶ {} ◀ ", submit_label)
    } else {
        format!("   {}   ", submit_label)
    };
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("   ["),
        Span::styled(button, button_style),
        Span::raw("]"),
    ]));

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Height needed to show a form inside its bordered block.
pub fn form_height(form: &Form) -> u16 {
    form.fields.len() as u16 + 4
}

/// A muted "Label: value" line for detail panes.
pub fn kv_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), styles::muted_style()),
        Span::raw(value),
    ])
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
