//! Raw-mode terminal lifecycle.
//!
//! The fatal session error is printed to stderr after the UI exits, so the
//! screen must come back even when the draw loop unwinds. The guard owns
//! the terminal and restores it on drop; an explicit [`TerminalGuard::release`]
//! reports restore failures on the normal path.

use std::io::{Stdout, stdout};
use std::ops::{Deref, DerefMut};

use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::error::{AppError, Result};

pub type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Alternate-screen terminal that puts the screen back when dropped.
pub struct TerminalGuard {
    terminal: AppTerminal,
    active: bool,
}

impl TerminalGuard {
    /// Enters raw mode and the alternate screen.
    pub fn acquire() -> Result<Self> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut out = stdout();
        if let Err(err) = crossterm::execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(terminal_error(err));
        }
        let terminal = Terminal::new(CrosstermBackend::new(out)).map_err(terminal_error)?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    /// Leaves the alternate screen and raw mode.
    ///
    /// Idempotent; once released, drop does nothing.
    pub fn release(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode().map_err(terminal_error)?;
        crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(terminal_error)?;
        self.terminal.show_cursor().map_err(terminal_error)?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

impl Deref for TerminalGuard {
    type Target = AppTerminal;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for TerminalGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

fn terminal_error(err: impl std::fmt::Display) -> AppError {
    AppError::Terminal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_surface_as_terminal_errors() {
        let err = terminal_error(std::io::Error::other("boom"));
        assert!(matches!(err, AppError::Terminal(msg) if msg.contains("boom")));
    }
}
