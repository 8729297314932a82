//! # groupxml
//!
//! A command-line tool for ingesting ProteinPilot Group-XML exports into
//! peptide, protein and quantitation tables.
//!
//! ## Usage
//!
//! ```bash
//! # Ingest two exports into tab separated tables under ./tables
//! groupxml ingest run1.group.xml run2.group.xml --output tables
//!
//! # Parse without writing anything
//! groupxml check run1.group.xml
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(&cli);
    cli::dispatch(cli)
}
