use crate::app::input::helpers::cycle_index;
use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_mine_offset_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc => app.back(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.mine_offset.query.pop();
        }
        KeyCode::Tab => select_suggestion(app, true),
        KeyCode::BackTab => select_suggestion(app, false),
        KeyCode::Char(ch) => app.mine_offset.query.push(ch),
        _ => {}
    }
}

fn select_suggestion(app: &mut App, forward: bool) {
    let state = &mut app.mine_offset;
    let Some(next) = cycle_index(state.suggestion_index, state.suggestions.len(), forward) else {
        return;
    };
    state.suggestion_index = Some(next);
    if let Some(name) = state.suggestions.get(next) {
        state.query.clone_from(name);
    }
}
