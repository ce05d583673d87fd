use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;

pub const DEFAULT_METRICS_PATH: &str = "metrics/pr_size_scores.jsonl";
pub const DEFAULT_DATA_PATH: &str = "data/pr_size_scores.jsonl";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

fn default_metrics_path() -> String {
  DEFAULT_METRICS_PATH.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
  #[serde(default)]
  pub repositories: Vec<String>,
  /// Location of the metrics file inside each source repository.
  #[serde(default = "default_metrics_path")]
  pub metrics_path: String,
  pub data_path: Option<String>,
  pub timezone: Option<String>,
  pub score_target: Option<f64>,
  pub fetch_timeout_secs: Option<u64>,
  // Directory the config was read from; relative data_path resolves against it.
  #[serde(skip)]
  pub base_dir: Option<PathBuf>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      repositories: Vec::new(),
      metrics_path: default_metrics_path(),
      data_path: None,
      timezone: None,
      score_target: None,
      fetch_timeout_secs: None,
      base_dir: None,
    }
  }
}

impl AppConfig {
  pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let config_str =
      std::fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Self =
      serde_yaml::from_str(&config_str).with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.base_dir = path.parent().map(Path::to_path_buf);
    debug!(path = %path.display(), repositories = config.repositories.len(), "loaded config");
    Ok(config)
  }

  /// Like `load_from_path`, but a missing file yields defaults (reporting works without sources).
  pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      debug!(path = %path.display(), "config not found; using defaults");
      return Ok(Self::default());
    }
    Self::load_from_path(path)
  }

  /// Dataset location, with a relative `data_path` anchored at the config directory.
  pub fn resolved_data_path(&self) -> PathBuf {
    let raw = PathBuf::from(self.data_path.as_deref().unwrap_or(DEFAULT_DATA_PATH));
    match &self.base_dir {
      Some(base) if raw.is_relative() => base.join(raw),
      _ => raw,
    }
  }

  /// Fail fast on an empty or ill-formed source list.
  pub fn validate_sources(&self) -> Result<(), PipelineError> {
    static RE_SOURCE: Lazy<regex::Regex> =
      Lazy::new(|| regex::Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("source pattern"));

    if self.repositories.is_empty() {
      return Err(PipelineError::NoSources);
    }
    match self.repositories.iter().find(|s| !RE_SOURCE.is_match(s.trim())) {
      Some(bad) => Err(PipelineError::InvalidSource(bad.clone())),
      None => Ok(()),
    }
  }
}
