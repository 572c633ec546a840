//! Interactive terminal interface.
//!
//! Uses ratatui for rendering and crossterm for input handling. The loop
//! polls input with a short timeout, yields so the ticker task can run, then
//! hands queued ticks and the key to [`App::process`].

pub mod app;
pub mod ui;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::db::KeyValueStore;
use crate::store::SessionStore;
use crate::timer::{tick_channel, TickReceiver};
use app::{App, AppResult};

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Run the home/counter interface until the user quits.
pub async fn run<S: KeyValueStore>(store: SessionStore<S>, haptics: bool) -> Result<()> {
    let (ticks_tx, mut ticks_rx) = tick_channel();
    let mut app = App::new(store, haptics).with_ticks(ticks_tx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &mut ticks_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B, S>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    ticks: &mut TickReceiver,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
    S: KeyValueStore,
{
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        let mut key = None;
        if event::poll(INPUT_POLL)? {
            if let Event::Key(pressed) = event::read()? {
                if pressed.kind == KeyEventKind::Press {
                    if pressed.modifiers.contains(KeyModifiers::CONTROL)
                        && pressed.code == KeyCode::Char('c')
                    {
                        return Ok(());
                    }
                    key = Some(pressed.code);
                }
            }
        }

        // crossterm's poll blocks without yielding to the runtime
        tokio::task::yield_now().await;

        if app.process(ticks, key) == AppResult::Quit {
            return Ok(());
        }

        let pulses = app.take_pulses();
        if pulses > 0 {
            pulse()?;
        }
    }
}

/// Terminal stand-in for a short vibration.
fn pulse() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x07")?;
    stdout.flush()
}
