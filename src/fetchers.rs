// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Retrieve the raw metrics text of one source repository (gh CLI, HTTPS, or env fixture)
// role: fetch/transport
// inputs: source identifier "owner/repo"; metrics file path inside the repo; env GITHUB_TOKEN/GH_TOKEN; optional `gh` CLI
// outputs: FetchOutcome per source (Found text, NotFound, Failed detail)
// side_effects: Network calls to api.github.com; spawns `gh` subprocesses
// invariants:
// - Never panic; every transport failure becomes FetchOutcome::Failed
// - "file does not exist" (HTTP 404) is NotFound, distinct from Failed
// - Env fixture wins whenever PRSD_TEST_METRICS_JSON is set
// errors: Reported in-band through FetchOutcome; the orchestrator decides severity
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::time::Duration;

use clap::ValueEnum;
use tracing::debug;

use crate::util::run_gh;

pub const ENV_FIXTURE_VAR: &str = "PRSD_TEST_METRICS_JSON";

const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const USER_AGENT: &str = "pr-size-dashboard";
const GITHUB_API: &str = "https://api.github.com";

/// Result of asking one source for its metrics file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  Found(String),
  NotFound,
  Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FetcherKind {
  /// Use the authenticated `gh` CLI.
  Gh,
  /// Call the GitHub REST API directly.
  Http,
}

// --- Trait seam for metrics retrieval ---
pub trait MetricsFetcher {
  fn fetch_raw(&self, source: &str) -> FetchOutcome;
}

fn contents_path(source: &str, metrics_path: &str) -> String {
  format!("repos/{}/contents/{}", source.trim(), metrics_path.trim_start_matches('/'))
}

pub struct GhCliFetcher {
  metrics_path: String,
}

impl GhCliFetcher {
  pub fn new(metrics_path: &str) -> Self {
    Self {
      metrics_path: metrics_path.to_string(),
    }
  }
}

impl MetricsFetcher for GhCliFetcher {
  fn fetch_raw(&self, source: &str) -> FetchOutcome {
    let endpoint = contents_path(source, &self.metrics_path);
    let accept = format!("Accept: {}", RAW_MEDIA_TYPE);

    let out = match run_gh(&["api", "-H", accept.as_str(), endpoint.as_str()]) {
      Ok(o) => o,
      Err(e) => return FetchOutcome::Failed(format!("{:#}", e)),
    };

    if out.status.success() {
      return match String::from_utf8(out.stdout) {
        Ok(text) => FetchOutcome::Found(text),
        Err(e) => FetchOutcome::Failed(format!("metrics file is not valid UTF-8: {}", e)),
      };
    }

    let stderr = String::from_utf8_lossy(&out.stderr);
    if is_not_found(&stderr) {
      debug!(source, "gh reported missing metrics file");
      FetchOutcome::NotFound
    } else {
      FetchOutcome::Failed(stderr.trim().to_string())
    }
  }
}

fn is_not_found(stderr: &str) -> bool {
  stderr.contains("HTTP 404") || stderr.contains("Not Found")
}

pub struct HttpFetcher {
  agent: ureq::Agent,
  token: Option<String>,
  metrics_path: String,
  api_base: String,
}

impl HttpFetcher {
  pub fn new(metrics_path: &str, token: Option<String>, timeout: Duration) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .timeout_global(Some(timeout))
      .http_status_as_error(false)
      .build()
      .into();

    Self::with_agent(agent, metrics_path, token, GITHUB_API)
  }

  pub(crate) fn with_agent(agent: ureq::Agent, metrics_path: &str, token: Option<String>, api_base: &str) -> Self {
    Self {
      agent,
      token,
      metrics_path: metrics_path.to_string(),
      api_base: api_base.trim_end_matches('/').to_string(),
    }
  }
}

impl MetricsFetcher for HttpFetcher {
  fn fetch_raw(&self, source: &str) -> FetchOutcome {
    let url = format!("{}/{}", self.api_base, contents_path(source, &self.metrics_path));

    let mut req = self
      .agent
      .get(&url)
      .header("Accept", RAW_MEDIA_TYPE)
      .header("User-Agent", USER_AGENT);
    if let Some(t) = &self.token {
      req = req.header("Authorization", &format!("Bearer {}", t));
    }

    match req.call() {
      Ok(mut resp) => match resp.status().as_u16() {
        200 => match resp.body_mut().read_to_string() {
          Ok(text) => FetchOutcome::Found(text),
          Err(e) => FetchOutcome::Failed(format!("reading body: {}", e)),
        },
        404 => FetchOutcome::NotFound,
        code => FetchOutcome::Failed(format!("HTTP {}", code)),
      },
      Err(e) => FetchOutcome::Failed(e.to_string()),
    }
  }
}

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t);
      }
    }
  }

  match run_gh(&["auth", "token"]) {
    Ok(out) if out.status.success() => {
      let t = String::from_utf8_lossy(&out.stdout).trim().to_string();
      (!t.is_empty()).then_some(t)
    }
    _ => None,
  }
}

/// Fixture transport for tests: `PRSD_TEST_METRICS_JSON` holds a JSON object
/// mapping each source to its raw text, to `{"error": "..."}`, or to null.
/// Sources absent from the map are NotFound.
pub struct EnvFetcher;

impl MetricsFetcher for EnvFetcher {
  fn fetch_raw(&self, source: &str) -> FetchOutcome {
    let Ok(s) = std::env::var(ENV_FIXTURE_VAR) else {
      return FetchOutcome::NotFound;
    };
    let map: serde_json::Value = match serde_json::from_str(&s) {
      Ok(v) => v,
      Err(e) => return FetchOutcome::Failed(format!("bad {}: {}", ENV_FIXTURE_VAR, e)),
    };

    match map.get(source) {
      Some(serde_json::Value::String(text)) => FetchOutcome::Found(text.clone()),
      Some(serde_json::Value::Object(o)) => {
        let detail = o.get("error").and_then(|v| v.as_str()).unwrap_or("fixture error");
        FetchOutcome::Failed(detail.to_string())
      }
      _ => FetchOutcome::NotFound,
    }
  }
}

fn env_wants_mock() -> bool {
  std::env::var(ENV_FIXTURE_VAR).is_ok()
}

pub fn build_fetcher(kind: FetcherKind, metrics_path: &str, timeout: Duration) -> Box<dyn MetricsFetcher> {
  if env_wants_mock() {
    debug!("using env fixture fetcher");
    return Box::new(EnvFetcher);
  }

  match kind {
    FetcherKind::Gh => Box::new(GhCliFetcher::new(metrics_path)),
    FetcherKind::Http => Box::new(HttpFetcher::new(metrics_path, get_github_token(), timeout)),
  }
}
