use log::debug;

use super::{Matcher, SaveOutcome};
use crate::groupxml::context::DocumentContext;
use crate::groupxml::scope::Scope;
use crate::sink::{join_row_ids, Cell, Row, RowId, RowSink, SinkError, Table};

/// `<ITRAQPEAKS>`: reporter ion peaks of the enclosing spectrum
///
/// The text holds whitespace separated `mz intensity` pairs. Each pair becomes
/// one quantitation row linked to the peptide rows of the matches already
/// closed in the same spectrum.
#[derive(Debug, Default)]
pub struct ItraqMatcher {
    spectrum_id: Option<String>,
    text: String,
}

impl ItraqMatcher {
    pub(crate) fn process_element(&mut self, scope: &Scope) {
        self.text.clear();
        self.spectrum_id = scope
            .peek()
            .and_then(Matcher::as_spectrum)
            .and_then(|s| s.id())
            .map(str::to_string);
    }

    pub(crate) fn process_text(&mut self, text: &str) {
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }

    /// Nested in a spectrum with an id, and carries peak text
    pub fn has_minimal_match_data(&self) -> bool {
        self.spectrum_id.is_some() && !self.text.trim().is_empty()
    }

    pub(crate) fn save<S: RowSink + ?Sized>(
        &self,
        scope: &mut Scope,
        ctx: &mut DocumentContext,
        sink: &mut S,
    ) -> Result<SaveOutcome, SinkError> {
        if !self.has_minimal_match_data() {
            return Ok(SaveOutcome::Rejected);
        }
        let Some(spectrum_id) = self.spectrum_id.as_deref() else {
            return Ok(SaveOutcome::Rejected);
        };

        let rows: Vec<RowId> = scope
            .peek()
            .and_then(Matcher::as_spectrum)
            .map(|spectrum| {
                spectrum
                    .match_ids()
                    .iter()
                    .filter_map(|id| ctx.indexes.spectrum_matches.get(id))
                    .collect()
            })
            .unwrap_or_default();
        let peptide_rows = if rows.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(join_row_ids(&rows))
        };

        let mut emitted = 0;
        let mut values = self.text.split_whitespace();
        while let Some(mz) = values.next() {
            let Some(intensity) = values.next() else {
                debug!(
                    "Ignoring unpaired reporter value {:?} in spectrum {}",
                    mz, spectrum_id
                );
                break;
            };
            let row = Row::new(vec![
                Cell::Text(spectrum_id.to_string()),
                peptide_rows.clone(),
                ctx.float_value("reporter_mz", mz),
                ctx.float_value("reporter_intensity", intensity),
            ]);
            ctx.append(sink, Table::Quantitation, row)?;
            emitted += 1;
        }

        Ok(if emitted > 0 {
            SaveOutcome::Emitted
        } else {
            SaveOutcome::Rejected
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groupxml::matchers::ElementKind;
    use crate::sink::MemorySink;

    #[test]
    fn test_requires_spectrum_and_text() {
        let mut itraq = ItraqMatcher::default();
        itraq.process_element(&Scope::new());
        itraq.process_text("114.1 10");
        assert!(!itraq.has_minimal_match_data());

        let mut spectrum = Matcher::new(ElementKind::Spectrum);
        spectrum
            .process_element(
                [("id", "s1"), ("precursormass", "1")].into_iter().collect(),
                &Scope::new(),
            )
            .unwrap();
        let mut scope = Scope::new();
        scope.push(spectrum, 1);

        itraq.process_element(&scope);
        assert!(!itraq.has_minimal_match_data());
        itraq.process_text("114.1 10");
        itraq.process_text("115.1 20");
        assert!(itraq.has_minimal_match_data());

        let mut ctx = DocumentContext::default();
        let mut sink = MemorySink::new();
        assert_eq!(
            itraq.save(&mut scope, &mut ctx, &mut sink).unwrap(),
            SaveOutcome::Emitted
        );
        assert_eq!(sink.rows(Table::Quantitation).len(), 2);
        assert_eq!(ctx.counters.rows.quantitation, 2);
    }
}
