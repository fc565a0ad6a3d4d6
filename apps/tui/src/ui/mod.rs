pub mod screens;
pub mod widgets;

use crate::app::{App, AppScreen};
use ratatui::Frame;
use tachyonfx::EffectRenderer;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    match app.screen {
        AppScreen::Overview => screens::overview::render_overview(app, f),
        AppScreen::MineOffset => screens::mine_offset::render_mine_offset(app, f),
    }

    if let Ok(mut effect) = app.transition_fx.lock() {
        if let Some(effect) = effect.as_mut() {
            let area = f.area();
            f.buffer_mut().render_effect(effect, area, app.last_tick);
        }
    }

    if app.show_help {
        let area = f.area();
        widgets::status::render_help_popup(f, area);
    }
}
