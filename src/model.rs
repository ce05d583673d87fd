// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the JSON model (PR size records, fetch outcomes, aggregate rows) shared by the pipeline and the report
// role: model/types
// outputs: Serializable structs with stable field names; one explicit row type per aggregate kind
// invariants: (repo, pr_number) is the record identity; unknown source keys survive a read/write cycle; merged_at text is kept verbatim
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// Known fields are coerced, never rejected; only the identity keys can fail a record.

/// Any scalar as text; null becomes empty, containers keep their JSON text.
fn lenient_string<'de, D>(de: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(de)? {
    Value::Null => String::new(),
    Value::String(s) => s,
    other => other.to_string(),
  })
}

/// Numbers and numeric strings; anything else (or a non-finite value) is 0.
fn lenient_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  let v = match Value::deserialize(de)? {
    Value::Number(n) => n.as_f64().unwrap_or_default(),
    Value::String(s) => s.trim().parse::<f64>().unwrap_or_default(),
    _ => 0.0,
  };
  Ok(if v.is_finite() { v } else { 0.0 })
}

/// Integer counts; floats are truncated toward zero.
fn lenient_i64<'de, D>(de: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(de)? {
    Value::Number(n) => n.as_i64().unwrap_or_else(|| float_to_i64(n.as_f64().unwrap_or_default())),
    Value::String(s) => {
      let t = s.trim();
      t.parse::<i64>()
        .unwrap_or_else(|_| float_to_i64(t.parse::<f64>().unwrap_or_default()))
    }
    _ => 0,
  })
}

fn float_to_i64(v: f64) -> i64 {
  // `as` saturates and maps NaN to 0.
  v.trunc() as i64
}

/// PR numbers: integers, integral floats, or numeric strings. Part of the
/// record identity, so an unusable value is an error rather than 0.
fn pr_number<'de, D>(de: D) -> Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let v = Value::deserialize(de)?;
  let parsed = match &v {
    Value::Number(n) => n
      .as_u64()
      .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64)),
    Value::String(s) => s.trim().parse::<u64>().ok(),
    _ => None,
  };
  parsed.ok_or_else(|| serde::de::Error::custom(format!("unusable pr_number {}", v)))
}

/// One observation of a merged pull request, as written by a source repository.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PrSizeRecord {
  #[serde(deserialize_with = "lenient_string")]
  pub repo: String,
  #[serde(deserialize_with = "pr_number")]
  pub pr_number: u64,
  #[serde(deserialize_with = "lenient_string")]
  pub merged_at: String,
  #[serde(default, deserialize_with = "lenient_string")]
  pub author: String,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub additions: i64,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub deletions: i64,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub loc: f64,
  #[serde(default, deserialize_with = "lenient_i64")]
  pub changed_files: i64,
  #[serde(default, deserialize_with = "lenient_f64")]
  pub size_score: f64,
  // Keys we do not model (e.g. title, labels) ride along untouched.
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PrSizeRecord {
  /// Identity key used for deduplication: `"{repo}:{pr_number}"`.
  pub fn identity_key(&self) -> String {
    format!("{}:{}", self.repo, self.pr_number)
  }

  /// Parsed merge instant; `None` when `merged_at` is empty or not RFC 3339.
  pub fn merged_instant(&self) -> Option<DateTime<Utc>> {
    let raw = self.merged_at.trim();
    if raw.is_empty() {
      return None;
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
  Ok,
  Empty,
  Error,
}

/// Per-source outcome of one fetch-and-merge cycle (not persisted).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FetchResult {
  pub source: String,
  pub status: FetchStatus,
  pub record_count: usize,
  pub malformed_lines: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error_detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CycleReport {
  pub total: usize,
  pub data_path: String,
  pub sources: Vec<FetchResult>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Summary {
  pub count: usize,
  pub avg_score: f64,
  pub avg_loc: f64,
  pub small_pr_ratio: f64,
  pub target: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WindowMetricKind {
  Count,
  ScoreSum,
  AvgLoc,
  SmallPrRatio,
}

/// One (window, metric, value, delta?) row of the rolling comparison.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WindowMetric {
  pub window: String,
  pub metric: WindowMetricKind,
  pub value: f64,
  // Absent when the previous window had no records: "no prior data", not "no change".
  pub delta: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RepoStat {
  pub repo: String,
  pub avg_score: f64,
  pub median_score: f64,
  pub pr_count: usize,
  pub avg_loc: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthorStat {
  pub author: String,
  pub avg_score: f64,
  pub pr_count: usize,
  pub avg_loc: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyRepoScore {
  pub date: String,
  pub repo: String,
  pub score_sum: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeeklyScore {
  pub week: String,
  pub avg_score: f64,
  pub pr_count: usize,
}
