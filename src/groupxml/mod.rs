//! # Group-XML Ingestion Module
//!
//! This module provides streaming ingestion of ProteinPilot Group-XML exports
//! into row tables linked by row-id foreign keys.
//!
//! ## Design Goals
//!
//! - **Streaming**: One forward pass; memory is bounded by nesting depth and
//!   the cross-reference maps, not by document size
//! - **Closure order**: Rows are emitted when elements close, so later elements
//!   resolve ids recorded by earlier ones
//! - **Lenient values**: Unparseable attribute values become missing cells;
//!   only broken nesting aborts a document
//!
//! ## Group-XML Structure
//!
//! ```text
//! RESULTS (unregistered wrapper)
//! ├── SPECTRUM* (id, precursormass, elution)
//! │   ├── MATCH* (id, charge, confidence, mz, seq, ...)
//! │   │   └── PROTEIN2MATCH*
//! │   ├── MSMSPEAKS
//! │   └── ITRAQPEAKS (reporter "mz intensity" pairs)
//! ├── PEPTIDE* (id="PEPTIDE:n", matches)
//! └── PROTEIN* (id, name, unused, total, sequence)
//!     └── COVERAGE* (coverage, threshold)
//! ```
//!
//! Elements outside the registered set are transparent: they neither open a
//! scope nor receive text, and their registered children see the nearest
//! registered ancestor as their parent.

mod attributes;
mod context;
mod engine;
mod error;
mod index;
mod matchers;
mod scope;
mod summary;
mod tokens;

pub use attributes::{coerce_value, Attributes};
pub use context::DocumentContext;
pub use engine::{
    CancellationToken, EngineConfig, FileOutcome, FileReport, FileStatus, GroupXmlEngine,
    IngestError, RunSummary,
};
pub use error::{FieldCoercionError, Malformation, MatchError, ParseError};
pub use index::{
    strip_peptide_prefix, CrossReferences, PeptideIndex, ProteinIndex, SpectrumMatchIndex,
    PEPTIDE_ID_PREFIX,
};
pub use matchers::{
    CoverageMatcher, ElementKind, ItraqMatcher, Matcher, PassThroughMatcher, PeptideMatcher,
    ProteinMatcher, PsmMatcher, SaveOutcome, SpectrumContext, SpectrumMatcher,
    COVERAGE_THRESHOLDS,
};
pub use scope::{MatcherPool, Scope};
pub use summary::{DocumentCounters, KindCounters, KindSummary, ProcessingSummary, TableCounts};
pub use tokens::{Token, TokenSource, XmlTokenSource, DEFAULT_INPUT_BUFFER_SIZE};
