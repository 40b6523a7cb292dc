pub mod app;
pub mod input;
pub mod ui;

use std::io;
use std::panic;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};
use zentask_core::{KeyValueStore, TaskStore};

use crate::tui::app::App;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub fn run<S: KeyValueStore>(store: TaskStore<S>) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store);
    info!("tui started");
    let res = run_app(&mut terminal, &mut app);

    if let Err(err) = &res {
        error!("tui event loop failed: {}", err);
    }
    res.map_err(Into::into)
}

/// Raw mode and the alternate screen for as long as it lives. The terminal
/// is restored on drop, and also from the panic hook before the panic
/// message is printed.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;

        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            previous(info);
        }));
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = restore_terminal() {
            error!("failed to restore terminal: {}", err);
        }
    }
}

fn restore_terminal() -> io::Result<()> {
    run_all(&[
        &disable_raw_mode,
        &|| execute!(io::stdout(), LeaveAlternateScreen),
        &|| execute!(io::stdout(), Show),
    ])
}

/// Runs every step even if an earlier one fails; the first error wins.
fn run_all(steps: &[&dyn Fn() -> io::Result<()>]) -> io::Result<()> {
    let mut first_err = None;
    for step in steps {
        if let Err(err) = step() {
            first_err.get_or_insert(err);
        }
    }
    first_err.map_or(Ok(()), Err)
}

fn run_app<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    while !app.should_quit {
        app.tick();
        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                app.on_key(key);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_run_all_keeps_going_after_a_failure() {
        let ran = Cell::new(0);
        let fail = || -> io::Result<()> {
            ran.set(ran.get() + 1);
            Err(io::Error::other("raw mode"))
        };
        let ok = || -> io::Result<()> {
            ran.set(ran.get() + 1);
            Ok(())
        };
        let fail_late = || -> io::Result<()> {
            ran.set(ran.get() + 1);
            Err(io::Error::other("cursor"))
        };

        let err = run_all(&[&fail, &ok, &fail_late]).unwrap_err();

        assert_eq!(ran.get(), 3);
        assert_eq!(err.to_string(), "raw mode");
    }

    #[test]
    fn test_run_all_succeeds_when_every_step_does() {
        let ok = || -> io::Result<()> { Ok(()) };
        assert!(run_all(&[&ok, &ok]).is_ok());
        assert!(run_all(&[]).is_ok());
    }
}
