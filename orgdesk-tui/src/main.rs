//! Orgdesk admin console.
//!
//! Terminal front-end for the division and employee API: sign in, browse
//! the paginated lists and manage employee records without leaving the
//! shell.

mod app;
mod config;
mod net;
mod paths;
mod session;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing_appender::rolling;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use app::App;
use config::AppConfig;
use net::AppEvent;
use paths::AppPaths;
use session::SessionStore;

/// Terminal admin console for the Orgdesk backend
#[derive(Parser)]
#[command(name = "orgdesk")]
#[command(about = "Manage divisions and employees from the terminal")]
#[command(version)]
struct Args {
    /// Backend API base URL, e.g. http://127.0.0.1:8000/api
    #[arg(long, env = "ORGDESK_API_URL")]
    api_url: Option<String>,

    /// Directory for config, session and log files
    #[arg(long, env = "ORGDESK_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let paths = AppPaths::new(args.data_dir.unwrap_or_else(paths::default_base));
    paths
        .ensure_dirs()
        .context("failed to create the data directory")?;

    // Logs go to a daily file and the in-app log pane; stdout belongs to
    // the TUI.
    let file_appender = rolling::daily(paths.logs_dir(), "orgdesk.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = if let Ok(from_env) = EnvFilter::try_from_default_env() {
        from_env
    } else if cfg!(debug_assertions) {
        EnvFilter::new("info,orgdesk_tui=debug,orgdesk_client=debug")
    } else {
        EnvFilter::new("info,hyper_util=warn,reqwest=warn")
    };

    let file_layer = fmt::layer()
        .with_timer(LocalTimer)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_writer(non_blocking_file);

    tracing_subscriber::registry()
        .with(tui_logger::tracing_subscriber_layer())
        .with(env_filter)
        .with(file_layer)
        .init();

    // Also init log crate adapter in case dependencies use the log crate
    tui_logger::init_logger(log::LevelFilter::Info).ok();
    tui_logger::set_default_level(log::LevelFilter::Info);

    // A panic must give the terminal back before anything is printed
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let msg = info.to_string();
        tracing::error!(target: "panic", message = %msg, "panic occurred");
        default_hook(info);
    }));

    let config = load_config(&paths, args.api_url);
    tracing::info!(api_url = %config.api_url, data_dir = %paths.base().display(), "Starting orgdesk");

    let store = SessionStore::new(paths.session_file());
    let stored = match store.load() {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("Ignoring unreadable session file: {}", e);
            None
        }
    };

    let (tx, mut rx) = mpsc::channel(32);
    let mut app = App::new(&config.api_url, store, tx).context("failed to build the API client")?;
    if let Some(stored) = stored {
        app.restore_session(stored);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &mut rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err);
    }

    Ok(())
}

/// Loads the config file, applying the CLI/env override on top.
///
/// The file is written on first run so there is something to edit.
fn load_config(paths: &AppPaths, override_url: Option<String>) -> AppConfig {
    let config_file = paths.config_file();
    let mut config = match AppConfig::load(&config_file) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Falling back to default config: {}", e);
            AppConfig::default()
        }
    };
    if !config_file.exists() {
        if let Err(e) = config.save(&config_file) {
            tracing::warn!("Failed to write default config: {}", e);
        }
    }
    if let Some(url) = override_url {
        config.api_url = url;
    }
    config
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    app.on_key(key);
                }
            }
        }

        // Fold in finished background requests
        while let Ok(event) = rx.try_recv() {
            app.on_event(event);
        }

        app.on_tick(Instant::now());
    }
}
