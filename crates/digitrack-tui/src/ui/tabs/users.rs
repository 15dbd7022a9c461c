use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::ui::widgets::{form_height, render_form};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(&app.user_form)),
            Constraint::Min(5),
        ])
        .split(area);

    render_form(
        frame,
        chunks[0],
        &app.user_form,
        "New user (managers only)",
        matches!(app.focus, Focus::Form),
        "Create",
    );
    render_user_list(frame, app, chunks[1]);
}

fn render_user_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Role"),
        Cell::from("MRF"),
        Cell::from("Active"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .users
        .iter()
        .map(|user| {
            Row::new(vec![
                Cell::from(user.full_name.clone()),
                Cell::from(user.email.clone()),
                Cell::from(user.role.to_string()),
                Cell::from(user.mrf_id.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(if user.is_active { "yes" } else { "no" }),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Percentage(28),
        Constraint::Percentage(32),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let title = if app.users.is_empty() {
        " Users (list is available to managers) ".to_string()
    } else {
        format!(" Users ({}) ", app.users.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.user_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
