use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout, Write};
use tracing::{debug, warn};

/// Raw mode plus the alternate screen, unwinding whatever succeeded on failure.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
    debug!("terminal size {width}x{height}");

    enable_raw_mode().map_err(|e| eyre!("Failed to enable raw mode: {e}"))?;

    let mut stdout = stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(eyre!("Failed to enter alternate screen: {e}"));
    }

    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(e) => {
            cleanup_terminal_state(true, true);
            return Err(eyre!("Failed to create terminal: {e}"));
        }
    };

    if let Err(e) = terminal.clear() {
        warn!("failed to clear terminal: {e}");
    }
    if let Err(e) = execute!(std::io::stdout(), cursor::Hide) {
        warn!("failed to hide cursor: {e}");
    }

    debug!("terminal ready");
    Ok(terminal)
}

/// Restores the terminal. Each step is attempted even if an earlier one failed.
pub fn cleanup_terminal_state(raw_mode: bool, alternate_screen: bool) {
    let mut stdout_handle = stdout();

    if let Err(e) = execute!(stdout_handle, cursor::Show) {
        warn!("failed to show cursor: {e}");
    }

    if alternate_screen {
        if let Err(e) = execute!(stdout_handle, LeaveAlternateScreen) {
            warn!("failed to leave alternate screen: {e}");
        }
    }

    if raw_mode {
        if let Err(e) = disable_raw_mode() {
            warn!("failed to disable raw mode: {e}");
        }
    }

    let _ = execute!(stdout_handle, cursor::MoveToNextLine(1));
    let _ = stdout_handle.flush();
    debug!("terminal restored");
}
