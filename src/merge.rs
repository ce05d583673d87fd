// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Combine records from many sources into one identity-unique, merged_at-ordered dataset
// role: processing/merge
// inputs: (source, raw text) pairs in configured order, or already-parsed records
// outputs: Vec<PrSizeRecord> sorted ascending by merged_at; per-source tallies
// invariants:
// - identity is "{repo}:{pr_number}"; a later source or later line replaces an earlier one (last write wins)
// - a replaced record keeps the slot of its first appearance, so equal timestamps order deterministically
// - empty or unparseable merged_at sorts before every dated record; the sort is stable
// - merging the same content twice yields the same dataset as merging it once
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::PrSizeRecord;
use crate::record::parse_text;

/// What one source contributed before deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceTally {
  pub records: usize,
  pub malformed: usize,
}

#[derive(Debug, Default)]
pub struct Merger {
  slots: Vec<PrSizeRecord>,
  index: HashMap<String, usize>,
}

impl Merger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert or replace by identity.
  pub fn insert(&mut self, record: PrSizeRecord) {
    let key = record.identity_key();
    match self.index.get(&key) {
      Some(&slot) => {
        debug!(key = %key, "replacing record");
        self.slots[slot] = record;
      }
      None => {
        self.index.insert(key, self.slots.len());
        self.slots.push(record);
      }
    }
  }

  /// Parse a source's raw text and fold every valid line in.
  pub fn ingest_text(&mut self, source: &str, text: &str) -> SourceTally {
    let parsed = parse_text(text);

    for e in &parsed.malformed {
      warn!(source = %source, error = %e, "skipping malformed line");
    }

    let tally = SourceTally {
      records: parsed.records.len(),
      malformed: parsed.malformed.len(),
    };
    for rec in parsed.records {
      self.insert(rec);
    }

    tally
  }

  /// Consume the merger, yielding the dataset in canonical order.
  pub fn finish(self) -> Vec<PrSizeRecord> {
    let mut out = self.slots;
    sort_by_merged_at(&mut out);
    out
  }
}

/// Stable ascending sort by merge instant; undated records first.
pub fn sort_by_merged_at(records: &mut [PrSizeRecord]) {
  // Option orders None before Some, which puts undated records first.
  records.sort_by_cached_key(|r| r.merged_instant());
}

/// Merge (source, text) pairs in order; returns the dataset and one tally per source.
pub fn merge_sources<S, T>(sources: &[(S, T)]) -> (Vec<PrSizeRecord>, Vec<SourceTally>)
where
  S: AsRef<str>,
  T: AsRef<str>,
{
  let mut merger = Merger::new();
  let tallies = sources
    .iter()
    .map(|(s, t)| merger.ingest_text(s.as_ref(), t.as_ref()))
    .collect();

  (merger.finish(), tallies)
}
