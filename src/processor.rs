// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Drive one invocation: optional fetch cycle, dataset load, dashboard build, output
// role: orchestration/run
// inputs: EffectiveConfig; a fetcher factory result; the caller's DatasetCache
// outputs: Cycle report (stderr, or stdout with --fetch-only); dashboard JSON (stdout or --out file)
// side_effects: Network/subprocess I/O through the fetcher; dataset rewrite; report file write
// invariants:
// - --fetch-only never builds or writes a dashboard
// - the dashboard always reads the dataset through the cache
// errors: Propagates configuration, store, and output errors with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use tracing::debug;

use crate::cache::DatasetCache;
use crate::cli::EffectiveConfig;
use crate::fetch::run_cycle;
use crate::fetchers::{MetricsFetcher, build_fetcher};
use crate::model::CycleReport;
use crate::report::{DashboardReport, ReportParams, build_report};
use crate::store::JsonlStore;
use crate::util;
use crate::window::effective_now;

pub fn refresh_dataset(
  cfg: &EffectiveConfig,
  fetcher: &dyn MetricsFetcher,
  store: &JsonlStore,
  cache: &mut DatasetCache,
) -> Result<CycleReport> {
  debug!(sources = cfg.sources.len(), fetcher = ?cfg.fetcher, "starting fetch cycle");
  run_cycle(&cfg.sources, fetcher, store, cache)
}

pub fn generate_dashboard(cfg: &EffectiveConfig, store: &JsonlStore, cache: &mut DatasetCache) -> Result<DashboardReport> {
  if !store.exists() {
    debug!(path = %store.path().display(), "no dataset yet");
  }
  let dataset = cache.get_or_load(store)?;
  let params = ReportParams {
    filter: cfg.filter.clone(),
    tz: cfg.tz,
    now: effective_now(cfg.now),
    target: cfg.target,
  };
  Ok(build_report(&dataset, &params))
}

pub fn process(cfg: &EffectiveConfig) -> Result<()> {
  let store = JsonlStore::new(&cfg.data_path);
  let mut cache = DatasetCache::new();

  if cfg.fetch {
    let fetcher = build_fetcher(cfg.fetcher, &cfg.metrics_path, cfg.fetch_timeout);
    let cycle = refresh_dataset(cfg, fetcher.as_ref(), &store, &mut cache)?;
    if cfg.fetch_only {
      return util::write_json_out("-", &cycle);
    }
    eprintln!("{}", serde_json::to_string_pretty(&cycle)?);
  }

  let report = generate_dashboard(cfg, &store, &mut cache)?;
  util::write_json_out(&cfg.out, &report)
}
