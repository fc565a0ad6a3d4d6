use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::Stdout;
use std::time::Duration;
use tracing::{debug, info};

use crate::app::{handle_input, App};
use crate::ui;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

fn is_quit_chord(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Routes one terminal event to the app. Returns `false` once the app should stop.
pub fn handle_terminal_event(app: &mut App, event: &Event) -> bool {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if is_quit_chord(key) {
                app.running = false;
            } else {
                handle_input(app, key.code);
            }
        }
        Event::Key(_)
        | Event::Resize(_, _)
        | Event::Mouse(_)
        | Event::FocusGained
        | Event::FocusLost
        | Event::Paste(_) => {}
    }
    app.running
}

/// Runs the interactive loop until the user quits.
pub async fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    info!("starting interactive dashboard");
    app.refresh();

    while app.running {
        app.update();

        terminal
            .draw(|f| ui::ui(app, f))
            .map_err(|e| eyre!("Terminal draw error: {e}"))?;

        if matches!(event::poll(EVENT_POLL_TIMEOUT), Ok(true)) {
            match event::read() {
                Ok(event) => {
                    handle_terminal_event(app, &event);
                }
                Err(e) => debug!("failed to read terminal event: {e}"),
            }
        }

        // Let spawned requests make progress between frames.
        tokio::task::yield_now().await;
    }

    info!("interactive dashboard stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{StubGeocoder, StubTransport};
    use crate::app::{AppScreen, Services};
    use crossterm::event::KeyEventState;
    use std::sync::Arc;

    fn app() -> App {
        let services = Services {
            api: Arc::new(StubTransport::new()),
            geocoder: Arc::new(StubGeocoder::failing()),
        };
        App::with_services(services, 10)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[tokio::test]
    async fn ctrl_c_stops_from_any_screen() {
        let mut app = app();
        app.forward();
        let keep_going = handle_terminal_event(
            &mut app,
            &key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press),
        );
        assert!(!keep_going);
    }

    #[tokio::test]
    async fn key_releases_are_ignored() {
        let mut app = app();
        handle_terminal_event(
            &mut app,
            &key(KeyCode::Char('m'), KeyModifiers::NONE, KeyEventKind::Release),
        );
        assert_eq!(app.screen, AppScreen::Overview);

        handle_terminal_event(
            &mut app,
            &key(KeyCode::Char('m'), KeyModifiers::NONE, KeyEventKind::Press),
        );
        assert_eq!(app.screen, AppScreen::MineOffset);
    }
}
