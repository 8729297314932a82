use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use groupxml::groupxml::GroupXmlEngine;
use groupxml::sink::{DiscardSink, Table};

use super::Config;

/// Parse Group-XML files without writing any table
pub fn run(inputs: Vec<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config.as_deref())?;

    info!("Group-XML Check");
    info!("===============");

    let mut sink = DiscardSink::new();
    let mut engine = GroupXmlEngine::with_config(config.engine_config());
    let run = engine
        .process_files(&inputs, &mut sink)
        .context("Check failed")?;

    println!("{}", run.format_colored());
    for table in Table::ALL {
        info!("  {} rows: {}", table, sink.row_count(table));
    }

    // Exit with error code if any file could not be processed
    if run.failed() > 0 || run.unopened() > 0 {
        std::process::exit(1);
    }

    Ok(())
}
