// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run one fetch-and-merge cycle across all configured sources and persist the result
// role: orchestration/fetch-cycle
// inputs: ordered source identifiers; a MetricsFetcher; the dataset store; the caller's dataset cache
// outputs: CycleReport (total records, dataset path, one FetchResult per source in configured order)
// side_effects: Fetcher I/O per source; one full rewrite of the dataset file; clears the cache
// invariants:
// - an empty source list fails before any fetch is attempted
// - one source failing never aborts the others
// - the store is written exactly once, after every source has been attempted
// - the cache is cleared after a successful write so the next read sees fresh data
// errors: NoSources and store write failures propagate; per-source failures are reported in-band
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use tracing::{info, warn};

use crate::cache::DatasetCache;
use crate::error::PipelineError;
use crate::fetchers::{FetchOutcome, MetricsFetcher};
use crate::merge::merge_sources;
use crate::model::{CycleReport, FetchResult, FetchStatus};
use crate::store::JsonlStore;
use crate::util::canonicalize_lossy;

pub fn run_cycle(
  sources: &[String],
  fetcher: &dyn MetricsFetcher,
  store: &JsonlStore,
  cache: &mut DatasetCache,
) -> Result<CycleReport> {
  if sources.is_empty() {
    return Err(PipelineError::NoSources.into());
  }

  let mut results: Vec<FetchResult> = Vec::with_capacity(sources.len());
  // (index into results, source, text) for every source that returned a file.
  let mut found: Vec<(usize, &str, String)> = Vec::new();

  for source in sources {
    info!(source = %source, "fetching metrics");
    let mut result = FetchResult {
      source: source.clone(),
      status: FetchStatus::Empty,
      record_count: 0,
      malformed_lines: 0,
      error_detail: None,
    };

    match fetcher.fetch_raw(source) {
      FetchOutcome::Found(text) => {
        result.status = FetchStatus::Ok;
        found.push((results.len(), source.as_str(), text));
      }
      FetchOutcome::NotFound => {
        info!("{}", PipelineError::SourceUnavailable { source_id: source.clone() });
      }
      FetchOutcome::Failed(detail) => {
        warn!(
          "{}",
          PipelineError::SourceFetchError {
            source_id: source.clone(),
            detail: detail.clone(),
          }
        );
        result.status = FetchStatus::Error;
        result.error_detail = Some(detail);
      }
    }
    results.push(result);
  }

  let texts: Vec<(&str, &str)> = found.iter().map(|(_, s, t)| (*s, t.as_str())).collect();
  let (records, tallies) = merge_sources(&texts);
  for ((idx, _, _), tally) in found.iter().zip(tallies) {
    results[*idx].record_count = tally.records;
    results[*idx].malformed_lines = tally.malformed;
  }

  store.write(&records)?;
  cache.invalidate();

  info!(total = records.len(), path = %store.path().display(), "dataset written");

  Ok(CycleReport {
    total: records.len(),
    data_path: canonicalize_lossy(store.path()),
    sources: results,
  })
}
