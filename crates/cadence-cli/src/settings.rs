//! Runtime configuration, layered from an optional TOML file and
//! `CADENCE_`-prefixed environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Deserialised from `cadence.toml` (or the `--config` path).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
  /// SQLite database file; a leading `~/` is expanded.
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
  /// Default `tracing` directive when `RUST_LOG` is unset, e.g. `"info"`.
  #[serde(default)]
  pub log_level:     Option<String>,
}

fn default_database_path() -> PathBuf {
  PathBuf::from("~/.local/share/cadence/cadence.db")
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("CADENCE"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut settings: Settings =
      raw.try_deserialize().context("failed to deserialise Settings")?;
    settings.database_path = expand_tilde(&settings.database_path);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
