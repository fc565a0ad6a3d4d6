// Application state and the actions that drive it

pub mod actions;
pub mod input;
pub mod state;
pub mod upload;

pub use actions::{AppActions, AppEvent, Services};
pub use input::handle_input;
pub use state::{App, AppScreen, InputMode};
pub use upload::UploadStatus;
