// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed error taxonomy for record parsing, source fetching, store reads, and configuration
// role: errors/taxonomy
// outputs: PipelineError enum; line/source-scoped variants are reported, never propagated out of a cycle
// invariants: Only configuration variants are meant to abort a run; everything else is isolated per line or per source
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("malformed record{}: {reason}", line_suffix(.line))]
  MalformedRecord { line: Option<usize>, reason: String },

  #[error("{source_id}: no metrics file")]
  SourceUnavailable { source_id: String },

  #[error("{source_id}: fetch failed ({detail})")]
  SourceFetchError { source_id: String, detail: String },

  #[error("unreadable line {line} in {}: {reason}", .path.display())]
  StoreUnreadable { path: PathBuf, line: usize, reason: String },

  #[error("no repositories configured")]
  NoSources,

  #[error("invalid repository identifier {0:?} (expected owner/repo)")]
  InvalidSource(String),
}

fn line_suffix(line: &Option<usize>) -> String {
  match line {
    Some(n) => format!(" at line {}", n),
    None => String::new(),
  }
}

impl PipelineError {
  /// Attach a 1-based line number to a `MalformedRecord` produced without one.
  pub fn at_line(self, n: usize) -> Self {
    match self {
      PipelineError::MalformedRecord { reason, .. } => PipelineError::MalformedRecord { line: Some(n), reason },
      other => other,
    }
  }
}
