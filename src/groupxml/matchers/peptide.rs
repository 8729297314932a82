use log::debug;

use super::SaveOutcome;
use crate::groupxml::attributes::Attributes;
use crate::groupxml::context::DocumentContext;
use crate::groupxml::index::strip_peptide_prefix;
use crate::sink::{join_row_ids, RowId};

const ATTRIBUTES: &[&str] = &["id", "matches"];

/// `<PEPTIDE>`: indexes the rows of the matches it references
///
/// The `matches` attribute lists match ids separated by commas or
/// whitespace. No row is emitted.
#[derive(Debug, Default)]
pub struct PeptideMatcher {
    attributes: Attributes,
}

impl PeptideMatcher {
    pub(crate) fn process_element(&mut self, attributes: Attributes) {
        self.attributes.absorb(attributes, ATTRIBUTES);
    }

    /// Id without the `PEPTIDE:` prefix
    pub fn peptide_id(&self) -> Option<&str> {
        self.attributes.get("id").and_then(strip_peptide_prefix)
    }

    /// The id carries the `PEPTIDE:` prefix
    pub fn has_minimal_match_data(&self) -> bool {
        self.peptide_id().is_some()
    }

    /// Referenced match ids, in attribute order
    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("matches")
            .unwrap_or_default()
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|id| !id.is_empty())
    }

    pub(crate) fn save(&self, ctx: &mut DocumentContext) -> SaveOutcome {
        let Some(peptide_id) = self.peptide_id() else {
            return SaveOutcome::Rejected;
        };

        let mut rows: Vec<RowId> = Vec::new();
        for match_id in self.match_ids() {
            match ctx.indexes.spectrum_matches.get(match_id) {
                Some(row) => rows.push(row),
                None => {
                    debug!("PEPTIDE:{} references unknown MATCH {:?}", peptide_id, match_id);
                    ctx.counters.unresolved_references += 1;
                }
            }
        }
        // Row ids grow with every emission, so sorting restores closure order.
        rows.sort_unstable();
        rows.dedup();

        ctx.indexes
            .peptides
            .insert(peptide_id.to_string(), join_row_ids(&rows));
        SaveOutcome::Recorded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_prefix() {
        let mut peptide = PeptideMatcher::default();
        peptide.process_element(Attributes::from_iter([("id", "7")]));
        assert!(!peptide.has_minimal_match_data());

        let mut ctx = DocumentContext::default();
        assert_eq!(peptide.save(&mut ctx), SaveOutcome::Rejected);
        assert!(ctx.indexes.peptides.is_empty());
    }

    #[test]
    fn test_resolves_matches_in_closure_order() {
        let mut ctx = DocumentContext::default();
        ctx.indexes
            .spectrum_matches
            .insert("m1", RowId::new(4))
            .unwrap();
        ctx.indexes
            .spectrum_matches
            .insert("m2", RowId::new(9))
            .unwrap();

        let mut peptide = PeptideMatcher::default();
        peptide.process_element(Attributes::from_iter([
            ("id", "PEPTIDE:7"),
            ("matches", "m2, m1 m3"),
        ]));
        assert_eq!(peptide.match_ids().collect::<Vec<_>>(), ["m2", "m1", "m3"]);

        assert_eq!(peptide.save(&mut ctx), SaveOutcome::Recorded);
        assert_eq!(ctx.indexes.peptides.get("7"), Some("Row4,Row9"));
        assert_eq!(ctx.counters.unresolved_references, 1);
    }
}
