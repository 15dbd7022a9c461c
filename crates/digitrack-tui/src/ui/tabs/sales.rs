use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::ui::widgets::{form_height, render_form};
use crate::utils::{format_amount, format_date, format_weight};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(&app.sale_form)),
            Constraint::Min(5),
        ])
        .split(area);

    render_form(
        frame,
        chunks[0],
        &app.sale_form,
        "New sale",
        matches!(app.focus, Focus::Form),
        "Submit",
    );
    render_sales_list(frame, app, chunks[1]);
}

fn render_sales_list(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Date"),
        Cell::from("Category"),
        Cell::from("Weight"),
        Cell::from("Unit price"),
        Cell::from("Total"),
        Cell::from("Buyer"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .sales
        .iter()
        .map(|sale| {
            Row::new(vec![
                Cell::from(format_date(&sale.date)),
                Cell::from(sale.category.clone()),
                Cell::from(format_weight(sale.weight)),
                Cell::from(format_amount(sale.unit_price)),
                Cell::from(format_amount(sale.total_amount)),
                Cell::from(sale.buyer_name.clone()),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let title = match app.sales_summary {
        Some(ref summary) => format!(
            " Sales ({}) - {} / {} total ",
            app.sales.len(),
            format_weight(summary.overall.total_weight),
            format_amount(summary.overall.total_amount),
        ),
        None => format!(" Sales ({}) ", app.sales.len()),
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
    state.select(Some(app.sale_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
