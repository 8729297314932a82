use super::{ElementKind, Matcher, SaveOutcome};
use crate::groupxml::attributes::Attributes;
use crate::groupxml::context::DocumentContext;
use crate::groupxml::error::MatchError;
use crate::groupxml::scope::Scope;

const ATTRIBUTES: &[&str] = &["coverage", "threshold"];

/// `<COVERAGE>`: sets a coverage column of the directly enclosing protein
///
/// Emits no row of its own. Under any other parent it does nothing.
#[derive(Debug, Default)]
pub struct CoverageMatcher {
    attributes: Attributes,
}

impl CoverageMatcher {
    pub(crate) fn process_element(
        &mut self,
        attributes: Attributes,
        scope: &Scope,
    ) -> Result<(), MatchError> {
        self.attributes.absorb(attributes, ATTRIBUTES);
        match scope.peek() {
            Some(Matcher::Protein(_)) => Ok(()),
            parent => Err(MatchError::ScopeViolation {
                element: ElementKind::Coverage,
                expected: ElementKind::Protein,
                found: parent.map(Matcher::kind),
            }),
        }
    }

    /// Both `coverage` and `threshold` are present
    pub fn has_minimal_match_data(&self) -> bool {
        self.attributes.contains("coverage") && self.attributes.contains("threshold")
    }

    pub(crate) fn save(&self, scope: &mut Scope, ctx: &mut DocumentContext) -> SaveOutcome {
        if !self.has_minimal_match_data() {
            return SaveOutcome::Rejected;
        }
        let Some(protein) = scope.peek_mut().and_then(Matcher::as_protein_mut) else {
            return SaveOutcome::Consumed;
        };
        let Some(threshold) = ctx.parse::<f64>(&self.attributes, "threshold") else {
            return SaveOutcome::Rejected;
        };

        let coverage = ctx.float(&self.attributes, "coverage");
        if protein.set_coverage(threshold, coverage) {
            SaveOutcome::Recorded
        } else {
            SaveOutcome::Consumed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Cell;

    fn protein_scope() -> Scope {
        let mut protein = Matcher::new(ElementKind::Protein);
        protein
            .process_element(Attributes::from_iter([("id", "P1")]), &Scope::new())
            .unwrap();
        let mut scope = Scope::new();
        scope.push(protein, 1);
        scope
    }

    #[test]
    fn test_scope_violation() {
        let mut coverage = CoverageMatcher::default();
        let err = coverage
            .process_element(Attributes::from_iter([("coverage", "1")]), &Scope::new())
            .unwrap_err();
        assert_eq!(
            err,
            MatchError::ScopeViolation {
                element: ElementKind::Coverage,
                expected: ElementKind::Protein,
                found: None,
            }
        );

        assert!(coverage
            .process_element(Attributes::from_iter([("coverage", "1")]), &protein_scope())
            .is_ok());
    }

    #[test]
    fn test_save_mutates_parent() {
        let mut scope = protein_scope();
        let mut ctx = DocumentContext::default();
        let mut coverage = CoverageMatcher::default();

        coverage
            .process_element(Attributes::from_iter([("coverage", "42.0")]), &scope)
            .unwrap();
        assert_eq!(coverage.save(&mut scope, &mut ctx), SaveOutcome::Rejected);

        coverage
            .process_element(
                Attributes::from_iter([("coverage", "42.0"), ("threshold", "95")]),
                &scope,
            )
            .unwrap();
        assert_eq!(coverage.save(&mut scope, &mut ctx), SaveOutcome::Recorded);

        coverage
            .process_element(
                Attributes::from_iter([("coverage", "3"), ("threshold", "high")]),
                &scope,
            )
            .unwrap();
        assert_eq!(coverage.save(&mut scope, &mut ctx), SaveOutcome::Rejected);
        assert_eq!(ctx.counters.coercion_failures, 1);

        let protein = scope.peek_mut().and_then(Matcher::as_protein_mut).unwrap();
        assert_eq!(protein.coverage()[2], Cell::float(42.0, "42.0"));
    }
}
