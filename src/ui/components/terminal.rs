use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::{execute, terminal};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use crate::error::{Context, Result};

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// How long one loop turn waits for a key before the session ticks again.
/// Background calls and notice timers advance at this cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Owns raw mode and the alternate screen for the records UI.
///
/// A panic hook is installed on creation so a crash inside a screen still
/// leaves the user's shell usable.
pub struct TerminalGuard {
    terminal: TuiTerminal,
    restored: bool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = std::io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen)
            .context("Failed to enter the alternate screen")?;
        install_panic_hook();
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Waits up to `timeout` for a key press. Repeats, releases and
    /// non-key events come back as `None`.
    pub fn next_key(&self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(pressed_key(event::read()?))
    }

    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        self.terminal.show_cursor()?;
        leave_screen()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn leave_screen() -> Result<()> {
    execute!(std::io::stdout(), terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    Ok(())
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = leave_screen();
        previous(info);
    }));
}

fn pressed_key(event: Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    fn key(kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent {
            code: KeyCode::Char('g'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_presses_reach_the_controller() {
        let pressed = pressed_key(key(KeyEventKind::Press)).unwrap();
        assert_eq!(pressed.code, KeyCode::Char('g'));
        assert!(pressed_key(key(KeyEventKind::Release)).is_none());
        assert!(pressed_key(key(KeyEventKind::Repeat)).is_none());
        assert!(pressed_key(Event::FocusGained).is_none());
        assert!(pressed_key(Event::Resize(80, 24)).is_none());
    }
}
