// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, timestamp formatting, `gh` subprocesses, JSON output, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Canonicalized paths, formatted timestamps, process output, written JSON, man page text
// side_effects: run_gh invokes subprocesses; write_json_out creates directories and files
// invariants:
// - write_json_out with "-" prints to stdout and touches no files
// - iso_in_tz output is RFC3339 with seconds precision
// errors: run_gh surfaces spawn failures with command context; IO errors bubble with path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use clap::CommandFactory;
use serde::Serialize;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

/// Run `gh` with `args`. A non-zero exit is returned as-is so callers can inspect stderr;
/// only a failure to spawn is an error.
pub fn run_gh(args: &[&str]) -> Result<Output> {
  Command::new("gh")
    .args(args)
    .output()
    .with_context(|| format!("spawning gh {:?}", args))
}

/// Formats a UTC instant as RFC3339 in the given zone.
pub fn iso_in_tz(at: DateTime<Utc>, tz: Tz) -> String {
  at.with_timezone(&tz).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Pretty-print `value` as JSON to stdout ("-") or to the file at `out`.
pub fn write_json_out<T: Serialize>(out: &str, value: &T) -> Result<()> {
  let body = serde_json::to_string_pretty(value)?;
  if out == "-" {
    println!("{}", body);
    return Ok(());
  }

  let out_path = Path::new(out);
  if let Some(parent) = out_path.parent() {
    std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
  }
  std::fs::write(out_path, body + "\n").with_context(|| format!("writing {}", out_path.display()))?;

  Ok(())
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
