use crate::app::state::{App, AppScreen};
use crossterm::event::KeyCode;

/// `?` only opens help where it cannot be part of a typed mine name.
fn opens_help(app: &App, key: KeyCode) -> bool {
    match key {
        KeyCode::F(1) => true,
        KeyCode::Char('?') => app.screen == AppScreen::Overview,
        _ => false,
    }
}

/// Returns `true` when the key was consumed by the help overlay.
pub fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if app.show_help {
        if matches!(
            key,
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?' | 'q')
        ) {
            app.show_help = false;
        }
        return true;
    }

    if opens_help(app, key) {
        app.show_help = true;
        return true;
    }

    false
}
