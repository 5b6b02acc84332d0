//! macdscope TUI — terminal dashboard for one symbol's market data and backtest.
//!
//! Usage: `macdscope-tui [settings.toml]`
//!
//! Panels:
//! 1. Price — candles, trend line, entry/exit markers
//! 2. Oscillator — histogram, value/signal lines, crossover markers
//! 3. Trades — trade tape
//! 4. Performance — classified readings
//! 5. Help — keyboard shortcuts

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use log::info;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use macdscope_client::Settings;
use macdscope_tui::{handle_key, ui, AppState, Theme};

const LOG_FILE: &str = "macdscope-tui.log";

fn main() -> Result<()> {
    // Log to a file; anything on stderr would corrupt the alternate screen.
    let log_file = File::create(LOG_FILE).with_context(|| format!("cannot create {LOG_FILE}"))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load_or_default(config_path.as_deref())
        .context("failed to load settings")?;
    let transport = settings
        .backend
        .transport()
        .with_context(|| format!("bad backend URL {}", settings.backend.base_url))?;
    info!("backend {}", settings.backend.base_url);

    let mut app = AppState::new(settings, Arc::new(transport));
    app.startup();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Stop a live stream we started before leaving.
    if app.snapshot().live_trading {
        app.toggle_stream();
        app.dispatcher.settle(&mut app.store, Duration::from_secs(2));
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let theme = Theme::default();
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app, &theme))?;

        // 2. Apply finished requests (non-blocking)
        app.tick();

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
