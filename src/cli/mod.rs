use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod config;
mod ingest;

pub use config::Config;

/// groupxml - ProteinPilot Group-XML to row table ingestion
#[derive(Parser)]
#[command(name = "groupxml")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest Group-XML files into peptide, protein and quantitation tables
    Ingest {
        /// Input Group-XML files, processed in order
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for the table files
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Text written for missing values (default: ?)
        #[arg(short = 'm', long)]
        missing_marker: Option<String>,

        /// Column delimiter (default: tab)
        #[arg(short = 'd', long)]
        delimiter: Option<char>,

        /// Write the run summary as JSON to this file
        #[arg(long, value_name = "FILE")]
        summary_json: Option<PathBuf>,
    },

    /// Parse Group-XML files and report what would be ingested, writing nothing
    Check {
        /// Input Group-XML files
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Load settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

pub fn init_logging(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest {
            inputs,
            output,
            config,
            missing_marker,
            delimiter,
            summary_json,
        } => ingest::run(
            inputs,
            output,
            config,
            missing_marker,
            delimiter,
            summary_json,
        ),
        Commands::Check { inputs, config } => check::run(inputs, config),
    }
}
