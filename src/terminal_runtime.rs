use std::io;
use std::panic;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Terminal the event loop draws every frame into.
pub type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Full-screen takeover for the lifetime of `main`: raw key input, the
/// alternate screen and a hidden cursor.
///
/// Dropping it hands the shell back its normal screen, also when the event
/// loop returns early with an I/O error.
pub struct TerminalSession {
    terminal: AppTerminal,
}

impl TerminalSession {
    /// Switches the terminal into game mode.
    ///
    /// A failure half way through undoes whatever was already switched.
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;

        let terminal = execute!(io::stdout(), EnterAlternateScreen, Hide)
            .and_then(|()| Terminal::new(CrosstermBackend::new(io::stdout())));

        match terminal {
            Ok(terminal) => Ok(Self { terminal }),
            Err(error) => {
                let _ = restore_terminal();
                Err(error)
            }
        }
    }

    pub fn terminal_mut(&mut self) -> &mut AppTerminal {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

/// Makes a panic print onto the normal screen instead of the game board.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        default_hook(panic_info);
    }));
}

/// Leaves raw mode and the alternate screen. Safe to call more than once.
fn restore_terminal() -> io::Result<()> {
    let raw_mode = disable_raw_mode();
    execute!(io::stdout(), Show, LeaveAlternateScreen)?;
    raw_mode
}
