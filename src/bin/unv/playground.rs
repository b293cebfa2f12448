//! Terminal playground
//!
//! An editor pane on the left, the generated code and the run log on the right. Every
//! edit is submitted to a [`LiveSession`], so the right-hand panes always show the
//! newest document that finished running.
//!
//! Keys: arrows move, Tab inserts four spaces, Enter keeps the indentation (and adds a
//! level after a block header), Ctrl+S saves, Esc or Ctrl+C quits.
#[path = "playground/app.rs"]
mod app;
#[path = "playground/theme.rs"]
mod theme;
#[path = "playground/ui.rs"]
mod ui;

use app::{Action, App};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use unv::unv::config::UnvConfig;
use unv::unv::pipeline::NodeExecutor;
use unv::unv::session::{LiveSession, Session};

/// Run the playground until the user quits.
pub fn run_playground(
    config: UnvConfig,
    executor: NodeExecutor,
    document: String,
    path: Option<PathBuf>,
) -> io::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let session = Arc::new(Session::new(&config, executor));
    let mut live = {
        let _guard = runtime.enter();
        LiveSession::spawn(session)
    };

    let mut app = App::new(&document, path);
    live.submit(app.text());

    // Setup terminal
    enable_raw_mode()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &mut live);

    // Restore terminal
    disable_raw_mode()?;
    terminal.clear()?;
    terminal.show_cursor()?;

    runtime.block_on(live.shutdown());
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    live: &mut LiveSession,
) -> io::Result<()> {
    loop {
        if let Some(report) = live.try_next_report() {
            app.show_report(report);
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match app.handle_key(key) {
                Action::Quit => return Ok(()),
                Action::Edited => live.submit(app.text()),
                Action::Save => app.save(),
                Action::None => {}
            }
        }
    }
}
