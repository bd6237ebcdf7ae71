use std::io::{Stdout, stdout};
use std::sync::Once;

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::prelude::CrosstermBackend;

use crate::app::App;
use crate::event::{AppEvent, EventHandler};
use crate::handler;
use crate::ui;

const TICK_RATE_MS: u64 = 250;

static PANIC_HOOK: Once = Once::new();

/// Leave raw mode and the alternate screen. Safe to call more than once.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Full-screen session. Dropping it restores the terminal.
struct Session {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Session {
    fn start() -> Result<Self> {
        // Installed before raw mode so a panic still leaves a usable shell
        PANIC_HOOK.call_once(|| {
            let original_hook = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                let _ = restore_terminal();
                original_hook(info);
            }));
        });

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        enable_raw_mode()?;
        if let Err(e) = stdout().execute(EnterAlternateScreen) {
            disable_raw_mode()?;
            return Err(e.into());
        }
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    fn draw(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = restore_terminal();
        let _ = self.terminal.show_cursor();
    }
}

/// Run the host picker until the user quits or chooses a host.
/// Returns the chosen entry index. The terminal is back in cooked mode on
/// return, so ssh can take it over.
pub fn run(app: &mut App) -> Result<Option<usize>> {
    let mut session = Session::start()?;
    let events = EventHandler::new(TICK_RATE_MS);

    while app.running {
        session.draw(app)?;
        match events.next()? {
            AppEvent::Key(key) => handler::handle_key_event(app, key),
            AppEvent::Tick => app.tick_status(),
        }
    }

    // Input thread first, so nothing reads the terminal once ssh owns it
    drop(events);
    drop(session);
    Ok(app.pending_connect.take())
}
