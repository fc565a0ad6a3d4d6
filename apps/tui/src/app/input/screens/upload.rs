use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_upload_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.cancel_upload(),
        KeyCode::Enter => app.submit_upload(),
        KeyCode::Backspace => {
            app.upload_input.pop();
        }
        KeyCode::Char(ch) => app.upload_input.push(ch),
        _ => {}
    }
}
