use crate::app::state::App;
use crate::map::CURSOR_STEP;
use crossterm::event::KeyCode;

pub fn handle_overview_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('q') => {
            app.running = false;
        }
        KeyCode::Char('r') => {
            app.status_message = "Refreshing...".to_string();
            app.refresh();
        }
        KeyCode::Char('m') => app.forward(),
        KeyCode::Char('u') => app.begin_upload(),
        KeyCode::Up => app.map.move_cursor(CURSOR_STEP, 0.0),
        KeyCode::Down => app.map.move_cursor(-CURSOR_STEP, 0.0),
        KeyCode::Left => app.map.move_cursor(0.0, -CURSOR_STEP),
        KeyCode::Right => app.map.move_cursor(0.0, CURSOR_STEP),
        KeyCode::Enter => app.click_map(),
        KeyCode::Tab => {
            if !app.map.cycle_hotspot(true) {
                app.status_message = "No hotspots on the map".to_string();
            }
        }
        KeyCode::BackTab => {
            if !app.map.cycle_hotspot(false) {
                app.status_message = "No hotspots on the map".to_string();
            }
        }
        KeyCode::Esc => {
            app.map.reset();
            app.status_message.clear();
        }
        _ => {}
    }
}
