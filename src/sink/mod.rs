//! # Row Sinks
//!
//! Append-only output targets for the three tables produced by the Group-XML
//! engine. Every appended row receives a [`RowId`] that later rows use as a
//! foreign key; rows are never mutated once appended.
//!
//! ## Tables
//!
//! ```text
//! peptides      spectrum_id, elution, precursor_mass, match_id, charge, ...
//! proteins      protein_id, name, unused, total, sequence, coverage@0%, ...
//! quantitation  spectrum_id, peptide_rows, reporter_mz, reporter_intensity
//! ```
//!
//! Implementations:
//!
//! - [`MemorySink`]: keeps rows in memory, useful for library callers and tests
//! - [`DelimitedSink`]: one delimited text file per table
//! - [`DiscardSink`]: assigns ids and counts rows without storing them

use std::fmt;

use serde::Serialize;

pub use delimited::{DelimitedSink, SinkConfig};
pub use memory::{MemorySink, StoredRow};

mod delimited;
mod memory;

/// Errors that can occur while appending rows
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// I/O error while writing a table
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV writer
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Row width does not match the table's column list
    #[error("{table} rows have {expected} columns, got {found}")]
    ColumnCount {
        /// Target table
        table: Table,
        /// Number of columns declared by the table
        expected: usize,
        /// Number of cells in the rejected row
        found: usize,
    },

    /// The missing marker is empty and could not be told apart from an empty value
    #[error("missing marker must not be empty")]
    EmptyMissingMarker,
}

/// Output tables produced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    /// Peptide-to-spectrum identifications
    Peptides,
    /// Protein summaries
    Proteins,
    /// iTRAQ reporter ion peaks
    Quantitation,
}

impl Table {
    /// All tables, in output order
    pub const ALL: [Table; 3] = [Table::Peptides, Table::Proteins, Table::Quantitation];

    /// Fixed column order of this table
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Peptides => &[
                "spectrum_id",
                "elution",
                "precursor_mass",
                "match_id",
                "charge",
                "confidence",
                "mz",
                "sequence",
                "ht",
                "eval",
                "da_delta",
                "score",
                "type",
            ],
            Table::Proteins => &[
                "protein_id",
                "name",
                "unused",
                "total",
                "sequence",
                "coverage@0%",
                "coverage@50%",
                "coverage@95%",
            ],
            Table::Quantitation => &[
                "spectrum_id",
                "peptide_rows",
                "reporter_mz",
                "reporter_intensity",
            ],
        }
    }

    /// Position of a named column, if the table has it
    pub fn column_index(self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| *c == name)
    }

    /// File stem used by file-backed sinks
    pub fn name(self) -> &'static str {
        match self {
            Table::Peptides => "peptides",
            Table::Proteins => "proteins",
            Table::Quantitation => "quantitation",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Table::Peptides => 0,
            Table::Proteins => 1,
            Table::Quantitation => 2,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque identifier of an appended row, unique across all tables of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RowId(u64);

impl RowId {
    /// Create a row id from its raw value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value of the id
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Row{}", self.0)
    }
}

/// Join row ids into the comma separated form used for foreign-key lists
pub fn join_row_ids(ids: &[RowId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// A single table cell
///
/// `Missing` is distinct from an empty string and from zero. Numeric cells
/// keep the attribute text they were read from and render it unchanged; the
/// parsed value only decides whether the cell is present.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Absent or unparseable value
    Missing,
    /// Verbatim string value
    Text(String),
    /// Integer value
    Int {
        /// Parsed value
        value: i64,
        /// Source text
        raw: String,
    },
    /// Floating point value
    Float {
        /// Parsed value
        value: f64,
        /// Source text
        raw: String,
    },
}

impl Cell {
    /// Text cell from an optional value; `None` becomes [`Cell::Missing`]
    pub fn text<S: Into<String>>(value: Option<S>) -> Self {
        value.map_or(Cell::Missing, |v| Cell::Text(v.into()))
    }

    /// Integer cell read from `raw`
    pub fn int<S: Into<String>>(value: i64, raw: S) -> Self {
        Cell::Int {
            value,
            raw: raw.into(),
        }
    }

    /// Float cell read from `raw`
    pub fn float<S: Into<String>>(value: f64, raw: S) -> Self {
        Cell::Float {
            value,
            raw: raw.into(),
        }
    }

    /// Whether the cell carries the missing marker
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric value of the cell, if any
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int { value, .. } => Some(*value as f64),
            Cell::Float { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Render the cell, using `missing` for [`Cell::Missing`]
    pub fn render(&self, missing: &str) -> String {
        match self {
            Cell::Missing => missing.to_string(),
            Cell::Text(s) | Cell::Int { raw: s, .. } | Cell::Float { raw: s, .. } => s.clone(),
        }
    }
}

/// An ordered, fixed-width list of cells
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row(Vec<Cell>);

impl Row {
    /// Create a row from its cells
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    /// Cells of the row
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell at `index`
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.0.get(index)
    }

    /// Check the row width against the table's column list
    pub fn check_width(&self, table: Table) -> Result<(), SinkError> {
        let expected = table.columns().len();
        if self.0.len() != expected {
            return Err(SinkError::ColumnCount {
                table,
                expected,
                found: self.0.len(),
            });
        }
        Ok(())
    }
}

/// Append-only output target keyed by table
pub trait RowSink {
    /// Append a row and return its id
    fn append(&mut self, table: Table, row: Row) -> Result<RowId, SinkError>;

    /// Bring the sink into a consistent on-disk state
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn append(&mut self, table: Table, row: Row) -> Result<RowId, SinkError> {
        (**self).append(table, row)
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        (**self).flush()
    }
}

/// Sink that assigns ids and counts rows per table, storing nothing
#[derive(Debug, Default)]
pub struct DiscardSink {
    next_id: u64,
    counts: [usize; 3],
}

impl DiscardSink {
    /// Create an empty discarding sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows appended to `table`
    pub fn row_count(&self, table: Table) -> usize {
        self.counts[table.index()]
    }
}

impl RowSink for DiscardSink {
    fn append(&mut self, table: Table, row: Row) -> Result<RowId, SinkError> {
        row.check_width(table)?;
        let id = RowId(self.next_id);
        self.next_id += 1;
        self.counts[table.index()] += 1;
        Ok(id)
    }
}
