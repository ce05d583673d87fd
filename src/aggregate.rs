// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive summary, rolling-window, and grouped statistics from an in-memory record set
// role: analytics/aggregation
// inputs: &[PrSizeRecord] (full or filtered), reporting zone, "now", small-PR target
// outputs: Summary, WindowMetric rows, RepoStat/AuthorStat/DailyRepoScore/WeeklyScore tables
// invariants:
// - empty input yields zero/neutral values, never NaN or a panic
// - window deltas are present only when the previous window has records
// - grouping is exact field equality; group order is deterministic
// - records without a parseable merged_at are left out of time-bucketed tables
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::model::{
  AuthorStat, DailyRepoScore, PrSizeRecord, RepoStat, Summary, WeeklyScore, WindowMetric, WindowMetricKind,
};
use crate::window::{RollingWindows, Span, iso_week_label, local_date};

/// PRs scoring at or under this count as "small".
pub const SCORE_TARGET: f64 = 10.0;

/// Equality predicates applied before aggregation; `None` matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
  pub repo: Option<String>,
  pub author: Option<String>,
}

impl Filter {
  pub fn matches(&self, r: &PrSizeRecord) -> bool {
    self.repo.as_deref().map_or(true, |x| r.repo == x) && self.author.as_deref().map_or(true, |x| r.author == x)
  }

  pub fn apply(&self, records: &[PrSizeRecord]) -> Vec<PrSizeRecord> {
    records.iter().filter(|r| self.matches(r)).cloned().collect()
  }
}

/// Distinct repositories and authors, sorted, for filter pickers.
pub fn choices(records: &[PrSizeRecord]) -> (Vec<String>, Vec<String>) {
  let repos: BTreeSet<&str> = records.iter().map(|r| r.repo.as_str()).collect();
  let authors: BTreeSet<&str> = records.iter().map(|r| r.author.as_str()).collect();
  (
    repos.into_iter().map(String::from).collect(),
    authors.into_iter().map(String::from).collect(),
  )
}

fn finite_or_zero(v: f64) -> f64 {
  if v.is_finite() { v } else { 0.0 }
}

fn mean<I: IntoIterator<Item = f64>>(values: I) -> f64 {
  let (sum, n) = values.into_iter().fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
  if n == 0 { 0.0 } else { finite_or_zero(sum / n as f64) }
}

fn median(mut values: Vec<f64>) -> f64 {
  if values.is_empty() {
    return 0.0;
  }
  values.sort_by(f64::total_cmp);
  let mid = values.len() / 2;
  let m = if values.len() % 2 == 0 {
    (values[mid - 1] + values[mid]) / 2.0
  } else {
    values[mid]
  };
  finite_or_zero(m)
}

fn small_pr_ratio<'a, I>(records: I, target: f64) -> f64
where
  I: IntoIterator<Item = &'a PrSizeRecord>,
{
  let (small, n) = records.into_iter().fold((0usize, 0usize), |(s, n), r| {
    (if r.size_score <= target { s + 1 } else { s }, n + 1)
  });
  if n == 0 { 0.0 } else { small as f64 / n as f64 * 100.0 }
}

pub fn summary(records: &[PrSizeRecord], target: f64) -> Summary {
  Summary {
    count: records.len(),
    avg_score: mean(records.iter().map(|r| r.size_score)),
    avg_loc: mean(records.iter().map(|r| r.loc)),
    small_pr_ratio: small_pr_ratio(records, target),
    target,
  }
}

struct WindowStats {
  count: usize,
  score_sum: f64,
  avg_loc: f64,
  small_pr_ratio: f64,
}

impl WindowStats {
  fn over(records: &[PrSizeRecord], span: Span, target: f64) -> Self {
    let inside: Vec<&PrSizeRecord> = records
      .iter()
      .filter(|r| r.merged_instant().is_some_and(|at| span.contains(at)))
      .collect();

    Self {
      count: inside.len(),
      score_sum: finite_or_zero(inside.iter().map(|r| r.size_score).sum()),
      avg_loc: mean(inside.iter().map(|r| r.loc)),
      small_pr_ratio: small_pr_ratio(inside.iter().copied(), target),
    }
  }

  fn value(&self, kind: WindowMetricKind) -> f64 {
    match kind {
      WindowMetricKind::Count => self.count as f64,
      WindowMetricKind::ScoreSum => self.score_sum,
      WindowMetricKind::AvgLoc => self.avg_loc,
      WindowMetricKind::SmallPrRatio => self.small_pr_ratio,
    }
  }
}

/// Compare the last 7 full days against the 7 days before them.
pub fn rolling_comparison(records: &[PrSizeRecord], now: DateTime<Utc>, tz: Tz, target: f64) -> Vec<WindowMetric> {
  let windows = RollingWindows::ending_at(now, tz);
  let current = WindowStats::over(records, windows.current, target);
  let previous = WindowStats::over(records, windows.previous, target);
  let label = windows.label();

  [
    WindowMetricKind::Count,
    WindowMetricKind::ScoreSum,
    WindowMetricKind::AvgLoc,
    WindowMetricKind::SmallPrRatio,
  ]
  .into_iter()
  .map(|kind| {
    let value = current.value(kind);
    WindowMetric {
      window: label.clone(),
      metric: kind,
      value,
      delta: (previous.count > 0).then(|| value - previous.value(kind)),
    }
  })
  .collect()
}

fn group_by<'a, K, F>(records: &'a [PrSizeRecord], key: F) -> BTreeMap<K, Vec<&'a PrSizeRecord>>
where
  K: Ord,
  F: Fn(&'a PrSizeRecord) -> K,
{
  let mut groups: BTreeMap<K, Vec<&PrSizeRecord>> = BTreeMap::new();
  for r in records {
    groups.entry(key(r)).or_default().push(r);
  }
  groups
}

/// Per-repository mean/median score, count, and mean LOC; ordered by repo.
pub fn by_repo(records: &[PrSizeRecord]) -> Vec<RepoStat> {
  group_by(records, |r| r.repo.as_str())
    .into_iter()
    .map(|(repo, rows)| RepoStat {
      repo: repo.to_string(),
      avg_score: mean(rows.iter().map(|r| r.size_score)),
      median_score: median(rows.iter().map(|r| r.size_score).collect()),
      pr_count: rows.len(),
      avg_loc: mean(rows.iter().map(|r| r.loc)),
    })
    .collect()
}

/// Per-author mean score, count, and mean LOC; ascending by mean score.
pub fn by_author(records: &[PrSizeRecord]) -> Vec<AuthorStat> {
  let mut out: Vec<AuthorStat> = group_by(records, |r| r.author.as_str())
    .into_iter()
    .map(|(author, rows)| AuthorStat {
      author: author.to_string(),
      avg_score: mean(rows.iter().map(|r| r.size_score)),
      pr_count: rows.len(),
      avg_loc: mean(rows.iter().map(|r| r.loc)),
    })
    .collect();
  // Stable: equal means stay in author-name order.
  out.sort_by(|a, b| a.avg_score.total_cmp(&b.avg_score));
  out
}

/// Sum of scores per (local calendar day, repo).
pub fn daily_by_repo(records: &[PrSizeRecord], tz: Tz) -> Vec<DailyRepoScore> {
  let mut sums: BTreeMap<(NaiveDate, &str), f64> = BTreeMap::new();
  for r in records {
    if let Some(at) = r.merged_instant() {
      *sums.entry((local_date(at, tz), r.repo.as_str())).or_insert(0.0) += r.size_score;
    }
  }

  sums
    .into_iter()
    .map(|((date, repo), sum)| DailyRepoScore {
      date: date.format("%Y-%m-%d").to_string(),
      repo: repo.to_string(),
      score_sum: finite_or_zero(sum),
    })
    .collect()
}

/// Mean score and count per ISO week, chronological.
pub fn weekly(records: &[PrSizeRecord], tz: Tz) -> Vec<WeeklyScore> {
  let dated: Vec<(NaiveDate, &PrSizeRecord)> = records
    .iter()
    .filter_map(|r| r.merged_instant().map(|at| (local_date(at, tz), r)))
    .collect();

  let mut weeks: BTreeMap<(i32, u32), (String, Vec<f64>)> = BTreeMap::new();
  for (date, r) in dated {
    let iso = date.iso_week();
    let key = (iso.year(), iso.week());
    weeks
      .entry(key)
      .or_insert_with(|| (iso_week_label(date), Vec::new()))
      .1
      .push(r.size_score);
  }

  weeks
    .into_values()
    .map(|(week, scores)| WeeklyScore {
      week,
      pr_count: scores.len(),
      avg_score: mean(scores),
    })
    .collect()
}
