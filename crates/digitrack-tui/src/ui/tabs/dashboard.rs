use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_amount, format_weight};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    render_totals(frame, app, chunks[0]);
    render_category_breakdown(frame, app, chunks[1]);
}

fn render_totals(frame: &mut Frame, app: &App, area: Rect) {
    let (received, processed, sold) = app.dashboard_totals();

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    render_card(frame, cards[0], "Total Waste Received", received);
    render_card(frame, cards[1], "Total Waste Processed", processed);
    render_card(frame, cards[2], "Total Waste Sold", sold);
}

fn render_card(frame: &mut Frame, area: Rect, label: &str, kg: f64) {
    let lines = vec![
        Line::from(Span::styled(label.to_string(), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(format_weight(kg), styles::title_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block).centered(), area);
}

fn render_category_breakdown(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("Category"),
        Cell::from("Sold"),
        Cell::from("Amount"),
        Cell::from("Sales"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = match app.sales_summary {
        Some(ref summary) => summary
            .category_wise
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(c.category.clone()),
                    Cell::from(format_weight(c.total_weight)),
                    Cell::from(format_amount(c.total_amount)),
                    Cell::from(c.count.to_string()),
                ])
                .style(styles::list_item_style())
            })
            .collect(),
        None => Vec::new(),
    };

    let widths = [
        Constraint::Percentage(40),
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Fill(1),
    ];

    let title = if rows.is_empty() {
        " Sales by category (no data yet - press [u] to refresh) ".to_string()
    } else {
        " Sales by category ".to_string()
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false)),
    );

    frame.render_widget(table, area);
}
