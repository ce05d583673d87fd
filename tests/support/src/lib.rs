//! test-support: helpers for robust, nextest-friendly tests.
//!
//! Add as a dev-dependency in your top-level `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test_support = { path = "tests/support" }
//! ```
//!
//! Then in tests:
//! ```rust,ignore
//! use test_support::{init_tracing, Workspace};
//!
//! #[test]
//! fn example() {
//!     init_tracing();
//!     let ws = Workspace::new(&["acme/api"]);
//!     let _cmd = ws.cmd();
//! }
//! ```

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

pub const BIN: &str = "pr-size-dashboard";
pub const FIXTURE_VAR: &str = "PRSD_TEST_METRICS_JSON";
pub const NOW: &str = "2025-08-15T12:00:00Z";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
///
/// Safe to call from multiple tests; only the first call configures the global subscriber.
pub fn init_tracing() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("warn,test=info"))
            .unwrap();
        // with_test_writer() causes logs to appear alongside failing tests only (cargo/nextest)
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    });
    Lazy::force(&INIT);
}

/// Return the path to the repository's `tests/fixtures` directory.
///
/// Anchored at this crate's manifest (`tests/support`), so it's stable regardless
/// of the runner's working directory (cargo vs nextest).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join("fixtures")
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
    let path = fixtures_dir().join(rel_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// Create a temp directory that deletes on drop.
pub fn tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("create tempdir")
}

/// Run a binary target with `assert_cmd`, returning the ready-to-run `Command`.
pub fn cmd_bin(bin: &str) -> assert_cmd::Command {
    init_tracing();
    assert_cmd::Command::cargo_bin(bin).expect("binary target not found")
}

/// Build the `PRSD_TEST_METRICS_JSON` payload: each source maps to raw
/// metrics text (`Some`) or is explicitly missing (`None`).
pub fn metrics_fixture(entries: &[(&str, Option<&str>)]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(k, v)| {
            let val = match v {
                Some(text) => serde_json::Value::String(text.to_string()),
                None => serde_json::Value::Null,
            };
            (k.to_string(), val)
        })
        .collect();
    serde_json::Value::Object(map).to_string()
}

/// One JSON Lines record in the shape source repositories publish.
pub fn metrics_line(repo: &str, pr: u64, author: &str, merged_at: &str, loc: u64, score: f64) -> String {
    serde_json::json!({
        "repo": repo,
        "pr_number": pr,
        "merged_at": merged_at,
        "author": author,
        "additions": loc,
        "deletions": 0,
        "loc": loc,
        "changed_files": 1,
        "size_score": score,
    })
    .to_string()
}

/// Scratch directory holding a `config.yaml`; the dataset lands under `data/`.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new(repositories: &[&str]) -> Self {
        let dir = tempdir();
        let mut yaml = String::from("repositories:");
        if repositories.is_empty() {
            yaml.push_str(" []");
        }
        yaml.push('\n');
        for r in repositories {
            yaml.push_str(&format!("  - {}\n", r));
        }
        yaml.push_str("timezone: UTC\n");
        std::fs::write(dir.path().join("config.yaml"), yaml).expect("write config");
        Self { dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.yaml")
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.path().join("data").join("pr_size_scores.jsonl")
    }

    /// Binary command preloaded with `--config` and a pinned `--now-override`.
    pub fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = cmd_bin(BIN);
        cmd.env_remove(FIXTURE_VAR)
            .arg("--config")
            .arg(self.config_path())
            .args(["--now-override", NOW]);
        cmd
    }
}
