//! Per-document counters and the summary reported after each file.

use std::fmt;

use log::info;
use serde::Serialize;

use super::matchers::{ElementKind, SaveOutcome};
use crate::sink::Table;

/// Counters for one element kind within one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounters {
    /// `process_element` calls
    pub opened: usize,
    /// `save` calls
    pub closed: usize,
    /// Elements that emitted at least one row
    pub emitted: usize,
    /// Elements that updated a cross-reference map or an enclosing element
    pub recorded: usize,
    /// Elements without the minimal data needed to be saved
    pub rejected: usize,
}

/// Rows appended per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    /// Peptide rows
    pub peptides: usize,
    /// Protein rows
    pub proteins: usize,
    /// Quantitation rows
    pub quantitation: usize,
}

impl TableCounts {
    /// Count one appended row
    pub fn add(&mut self, table: Table) {
        match table {
            Table::Peptides => self.peptides += 1,
            Table::Proteins => self.proteins += 1,
            Table::Quantitation => self.quantitation += 1,
        }
    }

    /// Rows appended to `table`
    pub fn get(&self, table: Table) -> usize {
        match table {
            Table::Peptides => self.peptides,
            Table::Proteins => self.proteins,
            Table::Quantitation => self.quantitation,
        }
    }

    /// Rows across all tables
    pub fn total(&self) -> usize {
        self.peptides + self.proteins + self.quantitation
    }
}

/// Mutable counters of the document being processed
#[derive(Debug, Default)]
pub struct DocumentCounters {
    kinds: [KindCounters; ElementKind::COUNT],
    /// Rows appended per table
    pub rows: TableCounts,
    /// Elements outside the registered set
    pub unregistered_elements: usize,
    /// Attribute values replaced by the missing marker
    pub coercion_failures: usize,
    /// Elements nested under the wrong parent kind
    pub scope_violations: usize,
    /// Match ids seen more than once
    pub duplicate_ids: usize,
    /// References to ids that were never recorded
    pub unresolved_references: usize,
}

impl DocumentCounters {
    /// Counters of one kind
    pub fn kind(&self, kind: ElementKind) -> &KindCounters {
        &self.kinds[kind.index()]
    }

    pub(crate) fn record_open(&mut self, kind: ElementKind) {
        self.kinds[kind.index()].opened += 1;
    }

    pub(crate) fn record_save(&mut self, kind: ElementKind, outcome: SaveOutcome) {
        let counters = &mut self.kinds[kind.index()];
        counters.closed += 1;
        match outcome {
            SaveOutcome::Emitted => counters.emitted += 1,
            SaveOutcome::Recorded => counters.recorded += 1,
            SaveOutcome::Rejected => counters.rejected += 1,
            SaveOutcome::Consumed => {}
        }
    }

    /// Snapshot the counters into a summary
    pub fn summary(&self) -> ProcessingSummary {
        ProcessingSummary {
            kinds: ElementKind::ALL
                .iter()
                .map(|&kind| KindSummary {
                    kind,
                    counters: *self.kind(kind),
                })
                .collect(),
            rows: self.rows,
            unregistered_elements: self.unregistered_elements,
            coercion_failures: self.coercion_failures,
            scope_violations: self.scope_violations,
            duplicate_ids: self.duplicate_ids,
            unresolved_references: self.unresolved_references,
        }
    }
}

/// Counters of one element kind in a [`ProcessingSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    /// Element kind
    pub kind: ElementKind,
    /// Its counters
    #[serde(flatten)]
    pub counters: KindCounters,
}

/// Outcome counts of processing one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingSummary {
    /// Per-kind counters, in registration order
    pub kinds: Vec<KindSummary>,
    /// Rows appended per table
    pub rows: TableCounts,
    /// Elements outside the registered set
    pub unregistered_elements: usize,
    /// Attribute values replaced by the missing marker
    pub coercion_failures: usize,
    /// Elements nested under the wrong parent kind
    pub scope_violations: usize,
    /// Match ids seen more than once
    pub duplicate_ids: usize,
    /// References to ids that were never recorded
    pub unresolved_references: usize,
}

impl ProcessingSummary {
    /// Counters of one kind
    pub fn kind(&self, kind: ElementKind) -> KindCounters {
        self.kinds
            .iter()
            .find(|k| k.kind == kind)
            .map(|k| k.counters)
            .unwrap_or_default()
    }

    /// Log one line per element kind that occurred in the document
    pub fn log(&self, label: &str) {
        info!("{}: {}", label, self);
        for entry in self.kinds.iter().filter(|k| k.counters.opened > 0) {
            info!("  {}", entry.kind.summary(&entry.counters));
        }
    }
}

impl fmt::Display for ProcessingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} peptide, {} protein and {} quantitation rows",
            self.rows.peptides, self.rows.proteins, self.rows.quantitation
        )?;
        let rejected: usize = self.kinds.iter().map(|k| k.counters.rejected).sum();
        if rejected > 0 {
            write!(f, ", {} elements rejected", rejected)?;
        }
        if self.scope_violations > 0 {
            write!(f, ", {} scope violations", self.scope_violations)?;
        }
        Ok(())
    }
}
