//! # groupxml - Streaming ProteinPilot Group-XML Ingestion
//!
//! `groupxml` turns ProteinPilot Group-XML exports into three relational row
//! streams in a single forward pass, without loading the document into memory.
//!
//! ## Key Features
//!
//! - **Scope-Aware Dispatch**: A stack of open element matchers mirrors the
//!   nesting of registered elements; children read or update the element
//!   still open around them.
//!
//! - **Cross-References by Row Id**: Peptide identifications are indexed by
//!   match id as they are emitted, so peptides and quantitation peaks closing
//!   later refer to them by row id.
//!
//! - **Lenient Values, Strict Nesting**: An unparseable attribute becomes a
//!   missing cell; a broken element nesting aborts only the current file.
//!
//! - **Pluggable Output**: Rows go to any [`sink::RowSink`]: in memory,
//!   delimited text files, or nowhere (dry runs).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use groupxml::groupxml::GroupXmlEngine;
//! use groupxml::sink::{DelimitedSink, SinkConfig};
//!
//! let mut sink = DelimitedSink::create("tables", SinkConfig::default())?;
//! let mut engine = GroupXmlEngine::new();
//!
//! let run = engine.process_files(&["sample1.group.xml", "sample2.group.xml"], &mut sink)?;
//! println!("{}", run);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Output Tables
//!
//! | Table | One row per | Links |
//! |-------|-------------|-------|
//! | `peptides` | `MATCH` with its `SPECTRUM` context | - |
//! | `proteins` | `PROTEIN`, coverage from nested `COVERAGE` | - |
//! | `quantitation` | reporter peak of an `ITRAQPEAKS` | peptide row ids of the same spectrum |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod groupxml;
pub mod sink;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::groupxml::{
        CancellationToken, ElementKind, EngineConfig, FileOutcome, FileStatus, GroupXmlEngine,
        IngestError, ParseError, ProcessingSummary, RunSummary, Token, TokenSource,
        XmlTokenSource,
    };
    pub use crate::sink::{
        Cell, DelimitedSink, DiscardSink, MemorySink, Row, RowId, RowSink, SinkConfig, SinkError,
        Table,
    };
}
