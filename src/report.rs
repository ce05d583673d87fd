// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assemble the dashboard JSON (summary, rolling comparison, breakdowns, PR list) from the stored dataset
// role: rendering/report
// inputs: dataset records; filter; reporting zone; now; score target
// outputs: DashboardReport (serializable)
// invariants:
// - filters apply before every aggregate; choices are computed on the unfiltered dataset
// - by_repo is empty while a repo filter is active
// - pull_requests are newest first, undated last
// - an empty dataset still renders, with zero values and a notice
// errors: None; aggregation never fails
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::aggregate::{self, Filter};
use crate::merge::sort_by_merged_at;
use crate::model::{AuthorStat, DailyRepoScore, PrSizeRecord, RepoStat, Summary, WeeklyScore, WindowMetric};
use crate::util::iso_in_tz;

pub const EMPTY_NOTICE: &str = "No data yet. Run with --fetch to collect metrics from the configured repositories.";

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Choices {
  pub repos: Vec<String>,
  pub authors: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct DashboardReport {
  pub generated_at: String,
  pub timezone: String,
  pub filter: Filter,
  pub choices: Choices,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notice: Option<String>,
  pub summary: Summary,
  pub rolling: Vec<WindowMetric>,
  pub by_repo: Vec<RepoStat>,
  pub by_author: Vec<AuthorStat>,
  pub daily_by_repo: Vec<DailyRepoScore>,
  pub weekly: Vec<WeeklyScore>,
  pub pull_requests: Vec<PrSizeRecord>,
}

#[derive(Debug, Clone)]
pub struct ReportParams {
  pub filter: Filter,
  pub tz: Tz,
  pub now: DateTime<Utc>,
  pub target: f64,
}

pub fn build_report(dataset: &[PrSizeRecord], params: &ReportParams) -> DashboardReport {
  let (repos, authors) = aggregate::choices(dataset);
  let rows = params.filter.apply(dataset);

  let by_repo = if params.filter.repo.is_some() {
    Vec::new()
  } else {
    aggregate::by_repo(&rows)
  };

  let mut pull_requests = rows.clone();
  sort_by_merged_at(&mut pull_requests);
  pull_requests.reverse();

  DashboardReport {
    generated_at: iso_in_tz(params.now, params.tz),
    timezone: params.tz.name().to_string(),
    filter: params.filter.clone(),
    choices: Choices { repos, authors },
    notice: dataset.is_empty().then(|| EMPTY_NOTICE.to_string()),
    summary: aggregate::summary(&rows, params.target),
    rolling: aggregate::rolling_comparison(&rows, params.now, params.tz, params.target),
    by_repo,
    by_author: aggregate::by_author(&rows),
    daily_by_repo: aggregate::daily_by_repo(&rows, params.tz),
    weekly: aggregate::weekly(&rows, params.tz),
    pull_requests,
  }
}
