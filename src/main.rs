use anyhow::Result;
use clap::Parser;

mod aggregate;
mod cache;
mod cli;
mod config;
mod error;
mod fetch;
mod fetchers;
mod log;
mod merge;
mod model;
mod processor;
mod record;
mod report;
mod store;
mod util;
mod window;

use crate::cli::{Cli, normalize};
use crate::config::AppConfig;

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  log::init_logging(cli.verbose);

  // Phase 1: config file, then CLI overrides
  let app = AppConfig::load_or_default(&cli.config)?;
  let cfg = normalize(cli, app)?;

  // Phase 2: fetch (optional) and report
  crate::processor::process(&cfg)
}
