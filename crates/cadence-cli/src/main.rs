//! `cadence`: command-line front end for the Cadence study tracker.
//!
//! # Usage
//!
//! ```text
//! cadence topic add "Direito Constitucional" --area Direito --start 05/02/2026
//! cadence today
//! cadence missed 14
//! cadence session 3 25m
//! ```

mod commands;
mod format;
mod import;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use cadence_engine::Scheduler;
use cadence_store_sqlite::SqliteStore;
use clap::{Args, Parser, Subcommand};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "cadence", version, about = "Spaced-repetition study tracker")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "cadence.toml")]
  config: PathBuf,

  /// Database file; overrides `database_path` from the config.
  #[arg(long, env = "CADENCE_DB")]
  db: Option<PathBuf>,

  /// Print results as JSON.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage areas.
  #[command(subcommand)]
  Area(LabelCommand),
  /// Manage tags.
  #[command(subcommand)]
  Tag(LabelCommand),
  /// Manage topics.
  #[command(subcommand)]
  Topic(TopicCommand),
  /// Revisions scheduled for a day (default: today) and its study summary.
  Today {
    #[arg(long)]
    date: Option<String>,
  },
  /// Revisions of the Monday-to-Sunday week containing a day (default: today).
  Week {
    #[arg(long)]
    date: Option<String>,
  },
  /// Revisions of one month, grouped by day.
  Calendar {
    /// `YYYY-MM`; defaults to the current month.
    #[arg(long)]
    month: Option<String>,
  },
  /// Mark a revision as studied.
  Studied { revision: i64 },
  /// Mark a studied revision as pending again.
  Undo { revision: i64 },
  /// Record a missed revision, shifting the rest of its schedule by a day.
  Missed { revision: i64 },
  /// Log a finished study session, e.g. `25m` or `1h30m`.
  Session { topic: i64, duration: String },
  /// Study time for a day and in total.
  Stats {
    #[arg(long)]
    date: Option<String>,
  },
  /// Delete all data. Requires `--yes` and typing `reset` at the prompt.
  Reset {
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum LabelCommand {
  Add {
    name:  String,
    #[arg(long)]
    color: Option<String>,
  },
  List,
  Edit {
    id:    i64,
    #[arg(long)]
    name:  Option<String>,
    #[arg(long, conflicts_with = "clear_color")]
    color: Option<String>,
    #[arg(long)]
    clear_color: bool,
  },
  Rm { id: i64 },
}

#[derive(Args, Debug, Default)]
pub struct TopicFields {
  /// Area name.
  #[arg(long)]
  pub area:        Option<String>,
  /// Comma-separated free-text tags.
  #[arg(long)]
  pub tags:        Option<String>,
  #[arg(long)]
  pub color:       Option<String>,
  #[arg(long)]
  pub description: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum TopicCommand {
  /// Create a topic and its revision schedule.
  Add {
    title:  String,
    /// Start date; defaults to today.
    #[arg(long)]
    start:  Option<String>,
    #[command(flatten)]
    fields: TopicFields,
  },
  List {
    /// Match titles ignoring case and accents.
    #[arg(long)]
    search: Option<String>,
    /// Only topics in this area.
    #[arg(long)]
    area:   Option<String>,
  },
  /// Create many topics from a file, one `title;start;area;tags;description`
  /// line each. Nothing is created unless every line is valid.
  Import { file: PathBuf },
  /// A topic with its full schedule.
  Show { id: i64 },
  Edit {
    id:         i64,
    #[arg(long)]
    title:      Option<String>,
    #[command(flatten)]
    fields:     TopicFields,
    /// Remove the topic from its area.
    #[arg(long, conflicts_with = "area")]
    no_area:    bool,
    #[arg(long, conflicts_with = "color")]
    clear_color: bool,
  },
  Rm { id: i64 },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let default_level = settings
    .log_level
    .as_deref()
    .and_then(|l| l.parse::<LevelFilter>().ok())
    .unwrap_or(LevelFilter::WARN);
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();

  let db_path = cli
    .db
    .as_deref()
    .map(settings::expand_tilde)
    .unwrap_or(settings.database_path);
  if let Some(parent) = db_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  let store = SqliteStore::open(&db_path)
    .with_context(|| format!("failed to open store at {db_path:?}"))?;
  tracing::debug!(path = %db_path.display(), "store opened");

  let scheduler = Scheduler::new(store);
  commands::run(&scheduler, cli.command, cli.json)
}
