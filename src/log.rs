use std::io::IsTerminal;

use tracing_subscriber::{EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

// RUST_LOG, when set and valid, is the whole filter; otherwise -v picks the app level.
fn build_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
  if let Some(directives) = rust_log {
    if let Ok(filter) = EnvFilter::try_new(directives) {
      return filter;
    }
  }
  let level = if verbose { "debug" } else { "warn" };
  EnvFilter::new(format!("warn,pr_size_dashboard={}", level))
}

// Logs go to stderr; stdout carries the JSON output.
pub fn init_logging(verbose: bool) {
  let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
  let filter = build_filter(verbose, rust_log.as_deref());

  let _ = tracing_subscriber::registry()
    .with(
      fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time(),
    )
    .with(filter)
    .try_init();
}
