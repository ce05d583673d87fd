use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::aggregate::{Filter, SCORE_TARGET};
use crate::config::{AppConfig, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::fetchers::FetcherKind;
use crate::window::{DEFAULT_TZ, parse_now_override, parse_tz};

#[derive(Parser, Debug)]
#[command(
    name = "pr-size-dashboard",
    version,
    about = "Merge per-repository PR size scores and report trends as JSON",
    long_about = None
)]
pub struct Cli {
  /// YAML config listing the source repositories
  #[arg(long, default_value = "config.yaml")]
  pub config: PathBuf,

  /// Dataset file (overrides `data_path` from the config)
  #[arg(long)]
  pub data: Option<PathBuf>,

  /// Fetch every configured repository and rebuild the dataset before reporting
  #[arg(long)]
  pub fetch: bool,

  /// Fetch and rebuild the dataset, print the cycle report, and stop
  #[arg(long)]
  pub fetch_only: bool,

  /// Transport used to read metrics files
  #[arg(long, value_enum, default_value_t = FetcherKind::Gh)]
  pub fetcher: FetcherKind,

  /// Only include pull requests from this repository (owner/repo)
  #[arg(long)]
  pub repo: Option<String>,

  /// Only include pull requests by this author
  #[arg(long)]
  pub author: Option<String>,

  /// Reporting time zone (IANA name); overrides `timezone` from the config
  #[arg(long)]
  pub tz: Option<String>,

  /// Size score at or under which a PR counts as small
  #[arg(long)]
  pub target: Option<f64>,

  /// Report destination: file path, or "-" for stdout
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Verbose logging (debug) on stderr
  #[arg(short, long)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant used for rolling windows (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub sources: Vec<String>,
  pub metrics_path: String,
  pub data_path: PathBuf,
  pub fetch: bool,
  pub fetch_only: bool,
  pub fetcher: FetcherKind,
  pub fetch_timeout: Duration,
  pub filter: Filter,
  pub tz: Tz,
  pub target: f64,
  pub out: String,
  pub now: Option<DateTime<Utc>>,
}

fn non_empty(v: Option<String>) -> Option<String> {
  v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn normalize(cli: Cli, app: AppConfig) -> Result<EffectiveConfig> {
  let fetch = cli.fetch || cli.fetch_only;
  if fetch {
    app
      .validate_sources()
      .with_context(|| format!("config {}", cli.config.display()))?;
  }

  let tz = match cli.tz.as_deref().or(app.timezone.as_deref()) {
    Some(name) => parse_tz(name)?,
    None => DEFAULT_TZ,
  };

  let target = cli.target.or(app.score_target).unwrap_or(SCORE_TARGET);
  if !target.is_finite() {
    bail!("--target must be a finite number");
  }

  let now = match cli.now_override.as_deref() {
    Some(raw) => match parse_now_override(Some(raw), tz) {
      Some(at) => Some(at),
      None => bail!("cannot parse --now-override {:?}", raw),
    },
    None => None,
  };

  let data_path = cli.data.clone().unwrap_or_else(|| app.resolved_data_path());

  Ok(EffectiveConfig {
    sources: app.repositories.iter().map(|s| s.trim().to_string()).collect(),
    metrics_path: app.metrics_path.clone(),
    data_path,
    fetch,
    fetch_only: cli.fetch_only,
    fetcher: cli.fetcher,
    fetch_timeout: Duration::from_secs(app.fetch_timeout_secs.unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)),
    filter: Filter {
      repo: non_empty(cli.repo),
      author: non_empty(cli.author),
    },
    tz,
    target,
    out: cli.out,
    now,
  })
}
