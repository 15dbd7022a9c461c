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
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(area);

    render_intake_picker(frame, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(&app.sorting_form)),
            Constraint::Min(5),
        ])
        .split(chunks[1]);

    let form_title = match app.sorting_intake() {
        Some(intake) => format!("Sort intake {} ({})", intake.vehicle_id, format_date(&intake.date)),
        None => "Sort intake (select one on the left)".to_string(),
    };
    render_form(
        frame,
        right[0],
        &app.sorting_form,
        &form_title,
        matches!(app.focus, Focus::Form),
        "Submit",
    );
    render_sorted_list(frame, app, right[1]);
}

fn render_intake_picker(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([Cell::from("Date"), Cell::from("Vehicle"), Cell::from("Weight")])
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
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Fill(1),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(" Intakes ")
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.sorting_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_sorted_list(frame: &mut Frame, app: &App, area: Rect) {
    let sorted = app.sorted_for_selection();

    let header = Row::new([
        Cell::from("Category"),
        Cell::from("Weight"),
        Cell::from("Date"),
        Cell::from("Notes"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = sorted
        .iter()
        .map(|record| {
            Row::new(vec![
                Cell::from(record.category.clone()),
                Cell::from(format_weight(record.weight)),
                Cell::from(format_date(&record.date)),
                Cell::from(truncate(record.notes.as_deref().unwrap_or("-"), 24)),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let sorted_total: f64 = sorted.iter().map(|s| s.weight).sum();
    let title = format!(
        " Sorted so far: {} ({} records) ",
        format_weight(sorted_total),
        sorted.len()
    );

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}
