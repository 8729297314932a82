use log::warn;

use super::{Matcher, SaveOutcome, SpectrumContext};
use crate::groupxml::attributes::Attributes;
use crate::groupxml::context::DocumentContext;
use crate::groupxml::scope::Scope;
use crate::sink::{Cell, Row, RowSink, SinkError, Table};

const ATTRIBUTES: &[&str] = &[
    "charge",
    "confidence",
    "mz",
    "seq",
    "ht",
    "eval",
    "da_delta",
    "score",
    "type",
    "id",
];

/// Attributes that must be present for a peptide row to be emitted
const REQUIRED: &[&str] = &["id", "charge", "confidence", "mz"];

/// `<MATCH>`: one peptide-to-spectrum identification
///
/// The enclosing spectrum is captured when the element opens, so the
/// emission predicate only depends on state held by the matcher itself.
#[derive(Debug, Default)]
pub struct PsmMatcher {
    attributes: Attributes,
    spectrum: Option<SpectrumContext>,
}

impl PsmMatcher {
    pub(crate) fn process_element(&mut self, attributes: Attributes, scope: &Scope) {
        self.attributes.absorb(attributes, ATTRIBUTES);
        self.spectrum = scope
            .peek()
            .and_then(Matcher::as_spectrum)
            .and_then(|s| s.context());
    }

    /// The parent spectrum has its minimal data and id, charge, confidence
    /// and mz are present (parseable or not)
    pub fn has_minimal_match_data(&self) -> bool {
        self.spectrum.is_some() && REQUIRED.iter().all(|a| self.attributes.contains(a))
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
        let (Some(spectrum), Some(match_id)) = (&self.spectrum, self.attributes.get("id")) else {
            return Ok(SaveOutcome::Rejected);
        };

        let attrs = &self.attributes;
        let row = Row::new(vec![
            Cell::Text(spectrum.id.clone()),
            ctx.float(&spectrum.attributes, "elution"),
            ctx.float(&spectrum.attributes, "precursormass"),
            Cell::Text(match_id.to_string()),
            ctx.int(attrs, "charge"),
            ctx.float(attrs, "confidence"),
            ctx.float(attrs, "mz"),
            Cell::text(attrs.get("seq")),
            ctx.int(attrs, "ht"),
            ctx.float(attrs, "eval"),
            ctx.float(attrs, "da_delta"),
            ctx.float(attrs, "score"),
            Cell::text(attrs.get("type")),
        ]);
        let row_id = ctx.append(sink, Table::Peptides, row)?;

        if let Err(existing) = ctx.indexes.spectrum_matches.insert(match_id, row_id) {
            warn!(
                "Duplicate MATCH id {:?} in spectrum {}: index keeps {}, not {}",
                match_id, spectrum.id, existing, row_id
            );
            ctx.counters.duplicate_ids += 1;
        }
        if let Some(parent) = scope.peek_mut().and_then(Matcher::as_spectrum_mut) {
            parent.record_match(match_id);
        }

        Ok(SaveOutcome::Emitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groupxml::matchers::ElementKind;
    use crate::sink::MemorySink;

    fn spectrum_scope(attrs: &[(&str, &str)]) -> Scope {
        let mut spectrum = Matcher::new(ElementKind::Spectrum);
        spectrum
            .process_element(attrs.iter().copied().collect(), &Scope::new())
            .unwrap();
        let mut scope = Scope::new();
        scope.push(spectrum, 1);
        scope
    }

    #[test]
    fn test_needs_complete_spectrum() {
        let attrs = [("id", "m1"), ("charge", "2"), ("confidence", "99"), ("mz", "400.2")];

        let mut psm = PsmMatcher::default();
        psm.process_element(Attributes::from_iter(attrs), &spectrum_scope(&[("id", "s1")]));
        assert!(!psm.has_minimal_match_data());

        let scope = spectrum_scope(&[("id", "s1"), ("precursormass", "800.4")]);
        psm.process_element(Attributes::from_iter(attrs), &scope);
        assert!(psm.has_minimal_match_data());

        psm.process_element(Attributes::from_iter([("id", "m1"), ("charge", "2")]), &scope);
        assert!(!psm.has_minimal_match_data());
    }

    #[test]
    fn test_save_records_match_on_spectrum() {
        let mut scope = spectrum_scope(&[("id", "s1"), ("precursormass", "800.4"), ("elution", "12.5")]);
        let mut psm = PsmMatcher::default();
        psm.process_element(
            Attributes::from_iter([
                ("id", "m1"),
                ("charge", "2"),
                ("confidence", "99"),
                ("mz", "400.2"),
                ("ht", "1"),
                ("unknown", "x"),
            ]),
            &scope,
        );

        let mut ctx = DocumentContext::default();
        let mut sink = MemorySink::new();
        let outcome = psm.save(&mut scope, &mut ctx, &mut sink).unwrap();
        assert_eq!(outcome, SaveOutcome::Emitted);

        let row = &sink.rows(Table::Peptides)[0];
        assert_eq!(row.column(Table::Peptides, "elution"), Some(&Cell::float(12.5, "12.5")));
        assert_eq!(row.column(Table::Peptides, "ht"), Some(&Cell::int(1, "1")));
        assert_eq!(ctx.indexes.spectrum_matches.get("m1"), Some(row.id));

        let spectrum = scope.peek().and_then(Matcher::as_spectrum).unwrap();
        assert_eq!(spectrum.match_ids(), ["m1".to_string()]);
    }
}
