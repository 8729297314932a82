use log::debug;

use super::SaveOutcome;
use crate::groupxml::attributes::Attributes;
use crate::groupxml::context::DocumentContext;
use crate::sink::{Cell, Row, RowSink, SinkError, Table};

const ATTRIBUTES: &[&str] = &["id", "name", "unused", "total", "sequence"];

/// Coverage thresholds (in percent confidence) that have a protein column
pub const COVERAGE_THRESHOLDS: [f64; 3] = [0.0, 50.0, 95.0];

/// `<PROTEIN>`: emits a protein row and indexes the sequence
///
/// Nested `<COVERAGE>` elements fill the coverage columns through
/// [`ProteinMatcher::set_coverage`] while the protein is still open.
#[derive(Debug)]
pub struct ProteinMatcher {
    attributes: Attributes,
    text: String,
    coverage: [Cell; 3],
}

impl Default for ProteinMatcher {
    fn default() -> Self {
        Self {
            attributes: Attributes::new(),
            text: String::new(),
            coverage: [Cell::Missing, Cell::Missing, Cell::Missing],
        }
    }
}

impl ProteinMatcher {
    pub(crate) fn process_element(&mut self, attributes: Attributes) {
        self.attributes.absorb(attributes, ATTRIBUTES);
        self.text.clear();
        self.coverage = [Cell::Missing, Cell::Missing, Cell::Missing];
    }

    pub(crate) fn process_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Protein id
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id")
    }

    /// The `sequence` attribute, or else the element text without whitespace
    pub fn sequence(&self) -> Option<String> {
        if let Some(sequence) = self.attributes.get("sequence") {
            return Some(sequence.to_string());
        }
        let sequence: String = self.text.chars().filter(|c| !c.is_whitespace()).collect();
        (!sequence.is_empty()).then_some(sequence)
    }

    /// Store the coverage at `threshold`
    ///
    /// Returns false when the threshold has no column.
    pub fn set_coverage(&mut self, threshold: f64, coverage: Cell) -> bool {
        match COVERAGE_THRESHOLDS.iter().position(|t| (t - threshold).abs() < 1e-9) {
            Some(i) => {
                self.coverage[i] = coverage;
                true
            }
            None => {
                debug!(
                    "Dropping coverage at threshold {} for protein {:?}",
                    threshold,
                    self.id()
                );
                false
            }
        }
    }

    /// Coverage cells in [`COVERAGE_THRESHOLDS`] order
    pub fn coverage(&self) -> &[Cell] {
        &self.coverage
    }

    /// The id is present
    pub fn has_minimal_match_data(&self) -> bool {
        self.attributes.contains("id")
    }

    pub(crate) fn save<S: RowSink + ?Sized>(
        &self,
        ctx: &mut DocumentContext,
        sink: &mut S,
    ) -> Result<SaveOutcome, SinkError> {
        let Some(id) = self.id() else {
            return Ok(SaveOutcome::Rejected);
        };
        let sequence = self.sequence();

        let attrs = &self.attributes;
        let mut cells = vec![
            Cell::Text(id.to_string()),
            Cell::text(attrs.get("name")),
            ctx.float(attrs, "unused"),
            ctx.float(attrs, "total"),
            Cell::text(sequence.clone()),
        ];
        cells.extend(self.coverage.iter().cloned());
        ctx.append(sink, Table::Proteins, Row::new(cells))?;

        if let Some(sequence) = sequence {
            ctx.indexes.proteins.insert(id.to_string(), sequence);
        }
        Ok(SaveOutcome::Emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_set_coverage() {
        let mut protein = ProteinMatcher::default();
        protein.process_element(Attributes::from_iter([("id", "P1")]));
        assert!(protein.set_coverage(95.0, Cell::float(42.0, "42.0")));
        assert!(!protein.set_coverage(99.0, Cell::float(10.0, "10")));
        assert_eq!(
            protein.coverage(),
            [Cell::Missing, Cell::Missing, Cell::float(42.0, "42.0")]
        );

        protein.process_element(Attributes::from_iter([("id", "P2")]));
        assert!(protein.coverage().iter().all(Cell::is_missing));
    }

    #[test]
    fn test_sequence_from_text() {
        let mut protein = ProteinMatcher::default();
        protein.process_element(Attributes::from_iter([("id", "P1")]));
        protein.process_text("MKV LLA\n");
        protein.process_text("GG");
        assert_eq!(protein.sequence().as_deref(), Some("MKVLLAGG"));

        protein.process_element(Attributes::from_iter([("id", "P1"), ("sequence", "MA")]));
        assert_eq!(protein.sequence().as_deref(), Some("MA"));
    }

    #[test]
    fn test_save_emits_row_and_indexes_sequence() {
        let mut protein = ProteinMatcher::default();
        protein.process_element(Attributes::from_iter([
            ("id", "P1"),
            ("name", "Albumin"),
            ("unused", "12.5"),
            ("sequence", "MKV"),
        ]));
        protein.set_coverage(0.0, Cell::float(60.0, "60"));

        let mut ctx = DocumentContext::default();
        let mut sink = MemorySink::new();
        assert_eq!(protein.save(&mut ctx, &mut sink).unwrap(), SaveOutcome::Emitted);

        let rows = sink.rows(Table::Proteins);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.column(Table::Proteins, "name"), Some(&Cell::Text("Albumin".to_string())));
        assert_eq!(row.column(Table::Proteins, "unused"), Some(&Cell::float(12.5, "12.5")));
        assert_eq!(row.column(Table::Proteins, "total"), Some(&Cell::Missing));
        assert_eq!(row.column(Table::Proteins, "coverage@0%"), Some(&Cell::float(60.0, "60")));
        assert_eq!(ctx.indexes.proteins.get("P1"), Some("MKV"));
        assert_eq!(ctx.counters.rows.proteins, 1);
    }
}
