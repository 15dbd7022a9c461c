use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, AuthScreen, AuthState, Tab};

use super::styles;
use super::tabs::{dashboard, intake, reports, sales, sorting, users};
use super::widgets::{centered_rect_fixed, form_height, render_form};

/// Top-level render. The auth guard is applied here: until the session
/// check resolves only the interstitial draws, and without a session the
/// login/register screen is the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    match app.auth_state {
        AuthState::Loading => render_loading(frame),
        AuthState::Unauthenticated => render_auth_screen(frame, app),
        AuthState::Authenticated => {
            render_shell(frame, app);

            if matches!(app.state, AppState::ShowingHelp) {
                render_help_overlay(frame);
            }
            if matches!(app.state, AppState::ConfirmingQuit) {
                render_quit_overlay(frame);
            }
        }
    }
}

fn render_loading(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 5, frame.area());
    let lines = vec![
        Line::from(Span::styled("MRF DigiTrack", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled("Checking session...", styles::muted_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block).centered(), area);
}

fn render_auth_screen(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Banner
            Constraint::Min(10),   // Form
            Constraint::Length(1), // Hints
        ])
        .split(frame.area());

    let banner = vec![
        Line::from(""),
        Line::from(Span::styled("  MRF DigiTrack", styles::title_style())),
        Line::from(Span::styled(
            "  Track intake, sorting and sales for your facility",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(banner), chunks[0]);

    let (form, title, submit) = match app.auth_screen {
        AuthScreen::Login => (&app.login_form, "Log in", "Login"),
        AuthScreen::Register => (&app.register_form, "Create account", "Sign up"),
    };

    let width = 64.min(chunks[1].width);
    let height = (form_height(form) + 3).min(chunks[1].height);
    let area = centered_rect_fixed(width, height, chunks[1]);
    render_form(frame, area, form, title, true, submit);

    // Page-level notice: a single line under the form box
    let message_area = Rect::new(
        area.x,
        (area.y + area.height).min(chunks[1].bottom().saturating_sub(1)),
        area.width,
        1,
    );
    if let Some(ref error) = app.login_error {
        frame.render_widget(
            Paragraph::new(Span::styled(error.clone(), styles::error_style())),
            message_area,
        );
    } else if let Some(ref notice) = app.auth_notice {
        frame.render_widget(
            Paragraph::new(Span::styled(notice.clone(), styles::success_style())),
            message_area,
        );
    }

    let hint = match app.auth_screen {
        AuthScreen::Login => " [Enter] submit | [F2] create account | [Esc] quit",
        AuthScreen::Register => " [Enter] submit | [F2] back to login | [Esc] quit",
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, styles::muted_style())),
        chunks[2],
    );
}

fn render_shell(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  MRF DigiTrack";
    let user = app
        .session
        .user()
        .map(|u| format!("{} ({})  [?] Help ", u.full_name, u.role))
        .unwrap_or_else(|| "[?] Help ".to_string());

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + user.len() + 1),
        )),
        Span::styled(user, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [
        Tab::Dashboard,
        Tab::Intake,
        Tab::Sorting,
        Tab::Sales,
        Tab::Reports,
        Tab::Users,
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Intake => intake::render(frame, app, area),
        Tab::Sorting => sorting::render(frame, app, area),
        Tab::Sales => sales::render(frame, app, area),
        Tab::Reports => reports::render(frame, app, area),
        Tab::Users => users::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[Tab] focus | [u]pdate | [L]ogout | [q]uit";

    let left_text = if app.submitting {
        " Submitting... ".to_string()
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" Updated {} ", app.cache_ages.last_updated())
    };
    let right_text = format!(" {} ", shortcuts);

    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let left_style = if left_text.starts_with(" Error") {
        styles::error_style()
    } else {
        styles::muted_style()
    };

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 20, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  MRF DigiTrack", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-6       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ←/→       ", styles::help_key_style()),
            Span::styled("Prev/next tab (list focus)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", styles::help_key_style()),
            Span::styled("Switch focus (form ↔ list)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", styles::help_key_style()),
            Span::styled("Next field / move in list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Next field, submit on the button", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  u         ", styles::help_key_style()),
            Span::styled("Update data from the server", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  L         ", styles::help_key_style()),
            Span::styled("Log out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(44, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled("  MRF DigiTrack", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            "  Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::{backend::TestBackend, Terminal};

    use digitrack_core::api::ApiClient;
    use digitrack_core::auth::SessionStore;
    use digitrack_core::cache::CacheManager;
    use digitrack_core::config::Config;
    use digitrack_core::models::User;

    fn test_app(dir: &std::path::Path) -> App {
        let session = Arc::new(SessionStore::new(dir.to_path_buf()));
        let api = ApiClient::new("http://127.0.0.1:9", Arc::clone(&session)).unwrap();
        let cache = CacheManager::new(dir.join("cache")).unwrap();
        App::new(Config::default(), session, api, cache)
    }

    fn seed_session(dir: &std::path::Path) {
        let store = SessionStore::new(dir.to_path_buf());
        let user: User = serde_json::from_str(
            r#"{"_id": "u1", "email": "asha@mrf.example", "full_name": "Asha Nair",
                "role": "operator", "mrf_id": "MRF-KL-014"}"#,
        )
        .unwrap();
        store.set_session("tok-seed".into(), user).unwrap();
    }

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn loading_never_renders_protected_content() {
        let dir = tempfile::tempdir().unwrap();
        // Even with a perfectly valid persisted session on disk, nothing
        // protected may draw before the session check resolves.
        seed_session(dir.path());
        let app = test_app(dir.path());

        let screen = draw(&app);
        assert!(screen.contains("Checking session"));
        assert!(!screen.contains("Dashboard"));
        assert!(!screen.contains("Total Waste Received"));
    }

    #[tokio::test]
    async fn unauthenticated_renders_login_screen_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.bootstrap();

        let screen = draw(&app);
        assert!(screen.contains("Log in"));
        assert!(screen.contains("create account"));
        assert!(!screen.contains("Total Waste Received"));
    }

    #[tokio::test]
    async fn authenticated_renders_the_shell() {
        let dir = tempfile::tempdir().unwrap();
        seed_session(dir.path());
        let mut app = test_app(dir.path());
        app.bootstrap();

        let screen = draw(&app);
        assert!(screen.contains("Dashboard"));
        assert!(screen.contains("Asha Nair"));
        assert!(!screen.contains("Log in"));
    }

    #[tokio::test]
    async fn logout_drops_back_to_the_login_screen() {
        let dir = tempfile::tempdir().unwrap();
        seed_session(dir.path());
        let mut app = test_app(dir.path());
        app.bootstrap();
        app.logout();

        let screen = draw(&app);
        assert!(screen.contains("Log in"));
        assert!(!screen.contains("Total Waste Received"));
    }

    #[tokio::test]
    async fn login_error_is_shown_on_the_login_screen() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.bootstrap();
        app.login_error = Some("Invalid email or password".to_string());

        let screen = draw(&app);
        assert!(screen.contains("Invalid email or password"));
    }
}
