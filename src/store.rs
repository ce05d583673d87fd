// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Persist and load the canonical merged dataset as a JSON Lines file
// role: persistence/store
// inputs: Ordered Vec<PrSizeRecord> on write; file path
// outputs: One JSON object per line (UTF-8, non-ASCII literal); Vec<PrSizeRecord> on read
// side_effects: Creates parent directories; overwrites the dataset file wholesale
// invariants:
// - write is a full replace, never an append
// - a missing file reads as an empty dataset
// - unreadable lines are skipped with a warning, never fatal
// - read(write(R)) == R for well-formed R
// errors: IO errors (other than not-found on read) bubble with path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::model::PrSizeRecord;
use crate::record::parse_line;

#[derive(Debug, Clone)]
pub struct JsonlStore {
  path: PathBuf,
}

impl JsonlStore {
  pub fn new<P: Into<PathBuf>>(path: P) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn exists(&self) -> bool {
    self.path.is_file()
  }

  pub fn write(&self, records: &[PrSizeRecord]) -> Result<()> {
    if let Some(parent) = self.path.parent() {
      if !parent.as_os_str().is_empty() {
        std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
      }
    }

    let mut buf = String::new();
    for r in records {
      // serde_json leaves non-ASCII text unescaped.
      buf.push_str(&serde_json::to_string(r)?);
      buf.push('\n');
    }

    std::fs::write(&self.path, buf).with_context(|| format!("writing {}", self.path.display()))?;
    debug!(path = %self.path.display(), count = records.len(), "dataset written");

    Ok(())
  }

  pub fn read(&self) -> Result<Vec<PrSizeRecord>> {
    let text = match std::fs::read_to_string(&self.path) {
      Ok(t) => t,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %self.path.display(), "dataset missing; treating as empty");
        return Ok(Vec::new());
      }
      Err(e) => return Err(e).with_context(|| format!("reading {}", self.path.display())),
    };

    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
      match parse_line(line) {
        Ok(Some(rec)) => out.push(rec),
        Ok(None) => {}
        Err(e) => {
          let err = PipelineError::StoreUnreadable {
            path: self.path.clone(),
            line: idx + 1,
            reason: e.to_string(),
          };
          warn!(error = %err, "skipping dataset line");
        }
      }
    }

    debug!(path = %self.path.display(), count = out.len(), "dataset read");
    Ok(out)
  }
}
