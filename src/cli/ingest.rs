use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use groupxml::groupxml::{GroupXmlEngine, RunSummary};
use groupxml::sink::{DelimitedSink, RowSink, Table};

use super::Config;

/// Ingest Group-XML files into delimited table files
pub fn run(
    inputs: Vec<PathBuf>,
    output: PathBuf,
    config: Option<PathBuf>,
    missing_marker: Option<String>,
    delimiter: Option<char>,
    summary_json: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let sink_config = config.sink_config(missing_marker, delimiter)?;
    let engine_config = config.engine_config();

    info!("Group-XML Ingest");
    info!("================");
    info!("Inputs: {} files", inputs.len());
    info!("Output: {}", output.display());
    info!("Missing marker: {:?}", sink_config.missing_marker);
    info!("Cancel check interval: {}", engine_config.cancel_check_interval);
    if !engine_config.reset_indexes {
        info!("Cross-reference maps are kept across files");
    }

    let mut sink = DelimitedSink::create(&output, sink_config)
        .with_context(|| format!("Failed to create tables in {}", output.display()))?;
    let mut engine = GroupXmlEngine::with_config(engine_config);

    let run = engine
        .process_files(&inputs, &mut sink)
        .context("Ingest failed")?;
    sink.flush().context("Failed to flush tables")?;

    println!("{}", run.format_colored());
    for table in Table::ALL {
        info!("  {}: {}", table, sink.path(table).display());
    }

    if let Some(path) = summary_json {
        write_summary(&run, &path)?;
        info!("Run summary written to {}", path.display());
    }

    Ok(())
}

fn write_summary(run: &RunSummary, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create summary file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), run)
        .context("Failed to write run summary")?;
    Ok(())
}
