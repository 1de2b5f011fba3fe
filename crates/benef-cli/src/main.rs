//! `benef`: terminal UI for managing health-plan beneficiaries.
//!
//! # Usage
//!
//! ```
//! benef --url http://localhost:5000
//! benef --config ~/.config/benef/benef.toml --download-dir ~/Downloads
//! ```
//!
//! Logs go to a file (`benef.log` by default) since the terminal is taken by
//! the UI. Set `RUST_LOG=debug` to trace every request.

mod app;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::PathBuf,
  sync::{Arc, Mutex},
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use benef_client::ApiClient;
use clap::Parser;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "benef", version, about = "Terminal UI for health-plan beneficiaries")]
pub struct Args {
  /// Path to a TOML config file (url, per_page, download_dir, log_file,
  /// timeout_secs).
  #[arg(short, long, value_name = "FILE", default_value = "benef.toml")]
  config: PathBuf,

  /// Base URL of the beneficiary server (default: http://localhost:5000).
  #[arg(long, env = "BENEF_URL")]
  url: Option<String>,

  /// Records per list page.
  #[arg(long, env = "BENEF_PER_PAGE")]
  per_page: Option<u32>,

  /// Directory exports are saved to.
  #[arg(long, value_name = "DIR", env = "BENEF_DOWNLOAD_DIR")]
  download_dir: Option<PathBuf>,

  /// Log file path.
  #[arg(long, value_name = "FILE", env = "BENEF_LOG_FILE")]
  log_file: Option<PathBuf>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let settings = Settings::load(&args)?;

  let log = OpenOptions::new()
    .create(true)
    .append(true)
    .open(&settings.log_file)
    .with_context(|| format!("opening log file {}", settings.log_file.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(log))
    .with_ansi(false)
    .init();

  info!(url = %settings.url, per_page = settings.per_page, "starting");

  let client = ApiClient::new(settings.api_config())?;
  let mut app = App::new(Arc::new(client), settings.url.clone(), settings.per_page);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Initial data loads behind the first frame; failures are shown in the
  // UI, not fatal.
  app.start();

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // The frame above shows the in-flight state; now do the work.
    if app.pending.is_some() {
      app.run_pending().await;
      continue;
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }

    // Return to the list once a saved form has shown its banner long enough.
    app.tick(Instant::now());
  }

  info!("exiting");
  Ok(())
}
