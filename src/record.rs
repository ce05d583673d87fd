// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Parse JSON Lines text into PrSizeRecord values, isolating malformed lines
// role: parsing/validation
// inputs: One raw line, or a whole decoded metrics document
// outputs: PrSizeRecord per non-blank valid line; MalformedRecord errors for the rest
// invariants:
// - blank/whitespace-only lines are skipped, never errors
// - repo, pr_number, merged_at keys are required; value ranges are not validated
// - other known fields are coerced (numbers from numeric strings or floats, author from any scalar), never rejected
// - a bad line never prevents later lines from parsing
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::error::PipelineError;
use crate::model::PrSizeRecord;

/// Parse one line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<PrSizeRecord>, PipelineError> {
  let trimmed = line.trim();
  if trimmed.is_empty() {
    return Ok(None);
  }

  serde_json::from_str::<PrSizeRecord>(trimmed)
    .map(Some)
    .map_err(|e| PipelineError::MalformedRecord { line: None, reason: e.to_string() })
}

/// Records and per-line failures from one document, in document order.
#[derive(Debug, Default)]
pub struct ParsedText {
  pub records: Vec<PrSizeRecord>,
  pub malformed: Vec<PipelineError>,
}

/// Parse a whole JSON Lines document; line numbers in errors are 1-based.
pub fn parse_text(text: &str) -> ParsedText {
  let mut out = ParsedText::default();

  for (idx, line) in text.lines().enumerate() {
    match parse_line(line) {
      Ok(Some(rec)) => out.records.push(rec),
      Ok(None) => {}
      Err(e) => out.malformed.push(e.at_line(idx + 1)),
    }
  }

  out
}
