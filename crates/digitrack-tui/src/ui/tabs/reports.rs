use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use digitrack_core::models::{DailyReport, MonthlyReport, PanchayatReport};

use crate::app::{App, Focus, ReportView};
use crate::ui::styles;
use crate::ui::widgets::{form_height, kv_line, render_form};
use crate::utils::{format_amount, format_weight};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(form_height(&app.report_form)),
            Constraint::Min(5),
        ])
        .split(area);

    render_form(
        frame,
        chunks[0],
        &app.report_form,
        "Run report ('To' applies to panchayat only)",
        matches!(app.focus, Focus::Form),
        "Run",
    );

    let lines = match app.report_view() {
        ReportView::Daily => match app.daily_report {
            Some(ref report) => daily_lines(report),
            None => placeholder(),
        },
        ReportView::Monthly => match app.monthly_report {
            Some(ref report) => monthly_lines(report),
            None => placeholder(),
        },
        ReportView::Panchayat => match app.panchayat_report {
            Some(ref report) => panchayat_lines(report),
            None => placeholder(),
        },
    };

    let block = Block::default()
        .title(" Report ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}

fn placeholder() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Pick a report and a date, then Run.",
            styles::muted_style(),
        )),
    ]
}

fn daily_lines(report: &DailyReport) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Daily report - {}", report.date),
            styles::title_style(),
        )),
        Line::from(""),
        kv_line("Received", format_weight(report.waste_intake.total_weight)),
        kv_line("Loads", report.waste_intake.count.to_string()),
        Line::from(""),
        Line::from(Span::styled("Sorted", styles::highlight_style())),
    ];

    if report.sorted_waste.is_empty() {
        lines.push(Line::from(Span::styled("  none", styles::muted_style())));
    }
    for entry in &report.sorted_waste {
        lines.push(kv_line(&entry.category, format_weight(entry.total_weight)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Sales", styles::highlight_style())));
    if report.sales.is_empty() {
        lines.push(Line::from(Span::styled("  none", styles::muted_style())));
    }
    for entry in &report.sales {
        lines.push(kv_line(
            &entry.category,
            format!(
                "{} for {} ({} sales)",
                format_weight(entry.total_weight),
                format_amount(entry.total_amount),
                entry.count
            ),
        ));
    }

    lines
}

fn monthly_lines(report: &MonthlyReport) -> Vec<Line<'static>> {
    let totals = &report.monthly_totals;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Monthly report - {}-{:02}", report.year, report.month),
            styles::title_style(),
        )),
        Line::from(""),
        kv_line("Received", format_weight(totals.total_intake_weight)),
        kv_line("Loads", totals.total_intake_count.to_string()),
        kv_line("Sold", format_weight(totals.total_sales_weight)),
        kv_line("Revenue", format_amount(totals.total_sales_amount)),
        Line::from(""),
        Line::from(Span::styled("Active days", styles::highlight_style())),
    ];

    for day in report
        .daily_summaries
        .iter()
        .filter(|d| d.waste_intake.count > 0 || !d.sales.is_empty())
    {
        let sold: f64 = day.sales.iter().map(|s| s.total_amount).sum();
        lines.push(kv_line(
            &day.date.to_string(),
            format!(
                "in {} / sold {}",
                format_weight(day.waste_intake.total_weight),
                format_amount(sold)
            ),
        ));
    }

    lines
}

fn panchayat_lines(report: &PanchayatReport) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "Panchayat report - {} to {}",
                report.start_date.format("%Y-%m-%d"),
                report.end_date.format("%Y-%m-%d")
            ),
            styles::title_style(),
        )),
        Line::from(""),
    ];

    if report.mrf_summary.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No activity in this window",
            styles::muted_style(),
        )));
    }

    let mut facilities: Vec<_> = report.mrf_summary.iter().collect();
    facilities.sort_by(|a, b| a.0.cmp(b.0));
    for (mrf, summary) in facilities {
        lines.push(kv_line(
            mrf,
            format!(
                "in {} ({} loads) / sold {} for {}",
                format_weight(summary.total_intake_weight),
                summary.intake_count,
                format_weight(summary.total_sales_weight),
                format_amount(summary.total_sales_amount)
            ),
        ));
    }

    lines
}
