use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::ui::widgets::{form_height, render_form};
use crate::utils::{format_date, format_weight, truncate};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(&app.intake_form)),
            Constraint::Min(5),
        ])
        .split(area);

    render_form(
        frame,
        chunks[0],
        &app.intake_form,
        "New waste intake",
        matches!(app.focus, Focus::Form),
        "Submit",
    );
    render_intake_list(frame, app, chunks[1]);
}

fn render_intake_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Date"),
        Cell::from("Vehicle"),
        Cell::from("Weight"),
        Cell::from("Notes"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .intakes
        .iter()
        .map(|intake| {
            Row::new(vec![
                Cell::from(format_date(&intake.date)),
                Cell::from(intake.vehicle_id.clone()),
                Cell::from(format_weight(intake.weight)),
                Cell::from(truncate(intake.notes.as_deref().unwrap_or("-"), 48)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(18),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(" Recent intakes ({}) ", app.intakes.len()))
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.intake_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
