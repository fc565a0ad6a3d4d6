use crate::app::state::{App, AppScreen, InputMode};
use crossterm::event::KeyCode;

mod help;
mod mine_offset;
mod overview;
mod upload;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if app.input_mode == InputMode::UploadPath {
        upload::handle_upload_input(app, key);
        return;
    }

    if help::handle_help_toggle(app, key) {
        return;
    }

    match app.screen {
        AppScreen::Overview => overview::handle_overview_input(app, key),
        AppScreen::MineOffset => mine_offset::handle_mine_offset_input(app, key),
    }
}
