//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Input is gated by the auth guard: until
//! the session check resolves nothing is accepted, and without a session
//! only the login/register screens receive keys.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, AuthScreen, AuthState, Focus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.auth_state {
        AuthState::Loading => Ok(false),
        AuthState::Unauthenticated => handle_auth_input(app, key).await,
        AuthState::Authenticated => handle_shell_input(app, key).await,
    }
}

async fn handle_auth_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit from the login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::F(2) => {
            app.auth_screen = match app.auth_screen {
                AuthScreen::Login => AuthScreen::Register,
                AuthScreen::Register => AuthScreen::Login,
            };
            app.login_error = None;
            app.auth_notice = None;
        }
        _ => {
            let submitted = match app.auth_screen {
                AuthScreen::Login => form_key(&mut app.login_form, key),
                AuthScreen::Register => form_key(&mut app.register_form, key),
            };
            if submitted {
                match app.auth_screen {
                    AuthScreen::Login => app.attempt_login().await,
                    AuthScreen::Register => app.attempt_register().await,
                }
            }
        }
    }
    Ok(false)
}

async fn handle_shell_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Keys that apply regardless of focus
    match key.code {
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Form => Focus::List,
                Focus::List => Focus::Form,
            };
            return Ok(false);
        }
        KeyCode::F(5) => {
            app.refresh_all_background();
            return Ok(false);
        }
        _ => {}
    }

    match app.focus {
        Focus::Form => handle_form_input(app, key),
        Focus::List => handle_list_input(app, key),
    }

    Ok(false)
}

/// Keys while a tab's entry form has focus: edit the focused field,
/// submit from the button.
fn handle_form_input(app: &mut App, key: KeyEvent) {
    // Tabs without a form (Dashboard) behave like list focus
    if app.current_tab == Tab::Dashboard {
        handle_list_input(app, key);
        return;
    }

    let submitted = match app.current_form_mut() {
        Some(form) => form_key(form, key),
        None => false,
    };
    if submitted {
        app.submit_current_form();
    }
}

/// Keys while the record list has focus: navigate, switch tabs, global
/// shortcuts.
fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('u') => app.refresh_all_background(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('1') => switch_tab(app, Tab::Dashboard),
        KeyCode::Char('2') => switch_tab(app, Tab::Intake),
        KeyCode::Char('3') => switch_tab(app, Tab::Sorting),
        KeyCode::Char('4') => switch_tab(app, Tab::Sales),
        KeyCode::Char('5') => switch_tab(app, Tab::Reports),
        KeyCode::Char('6') => switch_tab(app, Tab::Users),
        KeyCode::Left => switch_tab(app, app.current_tab.prev()),
        KeyCode::Right => switch_tab(app, app.current_tab.next()),
        KeyCode::Up => app.move_selection(-1),
        KeyCode::Down => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        _ => {}
    }
}

fn switch_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    // Dashboard has no form to focus
    app.focus = if tab == Tab::Dashboard {
        Focus::List
    } else {
        Focus::Form
    };
    if tab == Tab::Sorting {
        app.ensure_sorted_loaded();
    }
}

/// Shared field-editing keys for any form. Returns true when the submit
/// button was activated.
fn form_key(form: &mut crate::forms::Form, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Down => form.next(),
        KeyCode::Up | KeyCode::BackTab => form.prev(),
        KeyCode::Enter => {
            if form.on_button() {
                return true;
            }
            form.next();
        }
        KeyCode::Left => {
            if let Some(field) = form.focused_field() {
                field.cycle(-1);
            }
        }
        KeyCode::Right => {
            if let Some(field) = form.focused_field() {
                field.cycle(1);
            }
        }
        KeyCode::Backspace => {
            if let Some(field) = form.focused_field() {
                field.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(field) = form.focused_field() {
                field.insert(c);
            }
        }
        _ => {}
    }
    false
}
