//! Layered settings: built-in defaults, then the TOML file, then
//! `THOUGHTLOG_*` environment variables. Command-line flags are applied on
//! top by the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use thoughtlog_core::{chart::Dimension, period::PeriodKind};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub database_path:     PathBuf,
  /// Lifetime of cached aggregation reads; 0 disables the cache.
  pub cache_ttl_secs:    u64,
  pub default_period:    PeriodKind,
  pub default_dimension: Dimension,
}

impl Settings {
  /// Load settings; a missing file is fine, a malformed one is not.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .set_default("database_path", "thoughtlog.db")?
      .set_default("cache_ttl_secs", 180)?
      .set_default("default_period", PeriodKind::default().to_string())?
      .set_default("default_dimension", Dimension::default().to_string())?
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("THOUGHTLOG").try_parsing(true))
      .build()
      .with_context(|| format!("failed to read config from {}", file.display()))?;

    let mut settings: Self = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;
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
