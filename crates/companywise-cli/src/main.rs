//! `companywise` — browse interview questions per employer and track what
//! you have solved.
//!
//! # Usage
//!
//! ```
//! companywise --source https://example.github.io/companywise
//! companywise --source ./public --period six-months
//! companywise --config ~/.config/companywise/config.toml
//! companywise index ./public/data
//! companywise stats
//! ```

mod app;
mod index;
mod loader;
mod source;
mod ui;

use std::{
  fs::{self, OpenOptions},
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context, Result};
use app::App;
use chrono::Local;
use clap::{Parser, Subcommand};
use companywise_core::{period::PeriodId, tracker::SolvedTracker};
use companywise_store_sqlite::SqliteStore;
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use source::Source;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_SOURCE: &str = ".";
const DEFAULT_DB: &str = "~/.companywise/progress.db";
const DEFAULT_LOG: &str = "~/.companywise/companywise.log";
const DEFAULT_PERIOD: PeriodId = PeriodId::ThirtyDays;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "companywise", version, about = "Interview questions by employer")]
struct Args {
  /// Path to a TOML config file (source, db, log_file, period).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL or directory holding companies.json and data/ (default: .).
  #[arg(long, env = "COMPANYWISE_SOURCE")]
  source: Option<String>,

  /// SQLite file for solved progress (default: ~/.companywise/progress.db).
  #[arg(long, env = "COMPANYWISE_DB", value_name = "FILE")]
  db: Option<PathBuf>,

  /// Log file for the TUI (default: ~/.companywise/companywise.log).
  #[arg(long, env = "COMPANYWISE_LOG", value_name = "FILE")]
  log_file: Option<PathBuf>,

  /// Period to start on, e.g. thirty-days or all.
  #[arg(long, value_name = "PERIOD")]
  period: Option<PeriodId>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Write companies.json for a directory of {employer}/{period}.csv files.
  Index {
    /// Directory with one sub-directory per employer.
    data_dir: PathBuf,

    /// Output path (default: companies.json next to DATA_DIR).
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,
  },
  /// Print solved statistics as JSON.
  Stats,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  source:   Option<String>,
  #[serde(default)]
  db:       Option<PathBuf>,
  #[serde(default)]
  log_file: Option<PathBuf>,
  #[serde(default)]
  period:   Option<PeriodId>,
}

/// Effective settings after merging flags, environment and file.
struct Settings {
  source:   String,
  db:       PathBuf,
  log_file: PathBuf,
  period:   PeriodId,
}

impl Settings {
  /// CLI flags (and their env vars) override the config file, which
  /// overrides defaults.
  fn resolve(args: &Args, file: ConfigFile) -> Self {
    Self {
      source:   args
        .source
        .clone()
        .or(file.source)
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
      db:       expand_tilde(
        &args.db.clone().or(file.db).unwrap_or_else(|| DEFAULT_DB.into()),
      ),
      log_file: expand_tilde(
        &args
          .log_file
          .clone()
          .or(file.log_file)
          .unwrap_or_else(|| DEFAULT_LOG.into()),
      ),
      period:   args.period.or(file.period).unwrap_or(DEFAULT_PERIOD),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };
  let settings = Settings::resolve(&args, file_cfg);

  match args.command {
    Some(Command::Index { data_dir, out }) => {
      init_logging(None)?;
      let written = index::run(&data_dir, out, Local::now().date_naive())?;
      println!("{}", written.display());
      Ok(())
    }
    Some(Command::Stats) => {
      init_logging(None)?;
      let tracker = SolvedTracker::load(open_store(&settings.db).await?).await;
      let json = serde_json::to_string_pretty(&tracker.stats())
        .context("serialising stats")?;
      println!("{json}");
      Ok(())
    }
    None => run_tui(settings).await,
  }
}

async fn run_tui(settings: Settings) -> Result<()> {
  // The terminal belongs to the UI, so logs go to a file.
  init_logging(Some(&settings.log_file))?;

  let source = Source::from_location(&settings.source)
    .with_context(|| format!("opening source {}", settings.source))?;
  let tracker = SolvedTracker::load(open_store(&settings.db).await?).await;
  tracing::info!(source = %source.describe(), db = %settings.db.display(), "starting");

  let mut app = App::new(source, tracker, settings.period);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // A failed manifest load is shown in the status bar, not fatal.
  app.load_manifest().await;

  // Run the event loop; restore terminal even on error.
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
    app.poll_loads().await;
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key).await
    {
      break;
    }
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

async fn open_store(path: &Path) -> Result<SqliteStore> {
  create_parent(path)?;
  SqliteStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match log_file {
    Some(path) => {
      create_parent(path)?;
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    }
  }
  Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)
      .with_context(|| format!("creating {}", parent.display()))?;
  }
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_file_which_overrides_defaults() {
    let args = Args::parse_from(["companywise", "--source", "https://example.com"]);
    let file: ConfigFile = toml::from_str(
      r#"
        source = "./public"
        db = "/tmp/cw.db"
        period = "six-months"
      "#,
    )
    .unwrap();

    let settings = Settings::resolve(&args, file);
    assert_eq!(settings.source, "https://example.com");
    assert_eq!(settings.db, PathBuf::from("/tmp/cw.db"));
    assert_eq!(settings.period, PeriodId::SixMonths);
    assert!(settings.log_file.ends_with(".companywise/companywise.log"));
  }

  #[test]
  fn defaults_apply_without_flags_or_file() {
    let args = Args::parse_from(["companywise"]);
    let settings = Settings::resolve(&args, ConfigFile::default());
    assert_eq!(settings.period, PeriodId::ThirtyDays);
    assert!(settings.db.ends_with(".companywise/progress.db"));
  }

  #[test]
  fn period_flag_parses_stems() {
    let args = Args::parse_from(["companywise", "--period", "all"]);
    assert_eq!(args.period, Some(PeriodId::All));
    assert!(Args::try_parse_from(["companywise", "--period", "weekly"]).is_err());
  }

  #[test]
  fn index_subcommand_parses() {
    let args = Args::parse_from(["companywise", "index", "public/data", "-o", "out.json"]);
    assert!(matches!(
      args.command,
      Some(Command::Index { ref data_dir, out: Some(_) }) if data_dir == Path::new("public/data")
    ));
  }

  #[test]
  fn tilde_expands_to_home() {
    let home = std::env::var("HOME").unwrap();
    assert_eq!(
      expand_tilde(Path::new("~/x.db")),
      PathBuf::from(home).join("x.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs")), PathBuf::from("/abs"));
  }
}
