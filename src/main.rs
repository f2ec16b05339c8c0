//! reelscroll binary: parse args, load settings, set up the terminal and run
//! the event loop.  See the library docs for the module map.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;
use tracing::info;

use reelscroll::analytics::{AppwriteSearchLog, MemorySearchLog, SearchLog};
use reelscroll::app::App;
use reelscroll::catalog::{MovieCatalog, TmdbClient};
use reelscroll::config::Settings;
use reelscroll::{input, logging, ui};

#[derive(Debug, Parser)]
#[command(name = "reelscroll", version, about = "Browse and search movies in the terminal")]
struct Cli {
    /// Settings file (defaults to ./reelscroll.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start on the search screen with this query
    #[arg(short, long)]
    query: Option<String>,

    /// Keep trending counts in memory even if a backend is configured
    #[arg(long)]
    offline_trending: bool,
}

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Owns raw mode and the alternate screen for as long as it lives.  Drop
/// restores the terminal, including during unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

fn search_log(settings: &Settings, offline: bool) -> Result<Arc<dyn SearchLog>> {
    let backend = settings.backend.resolve()?;
    match backend {
        Some(config) if !offline => {
            let log = AppwriteSearchLog::from_config(config, settings.request_timeout())?;
            Ok(Arc::new(log))
        }
        _ => Ok(Arc::new(MemorySearchLog::new())),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // -- settings and logging ------------------------------------------------
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    logging::init(settings.log_file.as_deref())?;

    // -- remote clients ------------------------------------------------------
    let catalog: Arc<dyn MovieCatalog> = Arc::new(TmdbClient::from_settings(&settings.catalog)?);
    let search_log = search_log(&settings, cli.offline_trending)?;
    info!(
        catalog = catalog.name(),
        search_log = search_log.name(),
        "starting"
    );

    install_panic_hook();

    // -- terminal setup (Drop restores on exit or panic) ---------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(catalog, search_log, &settings.ui);
    if let Some(query) = cli.query {
        app.enter_search();
        app.set_query(query);
    }

    // -- main event loop -----------------------------------------------------
    // ~10 fps.  Each iteration:
    //   1. Apply events from background tasks.
    //   2. Render from controller snapshots.
    //   3. Wait for a key or the next tick, whichever comes first.
    let mut keys = EventStream::new();
    let mut ticks = tokio::time::interval(Duration::from_millis(100));
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        app.drain_events();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        tokio::select! {
            _ = ticks.tick() => {}
            event = keys.next() => match event {
                Some(Ok(Event::Key(key))) => input::handle_key_event(&mut app, key),
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => break,
            },
        }

        if app.quit {
            break;
        }
    }

    info!("shutting down");
    Ok(())
}
