use super::SaveOutcome;
use crate::groupxml::attributes::Attributes;

const ATTRIBUTES: &[&str] = &["id", "precursormass", "elution"];

/// Spectrum fields copied into the rows of its matches
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumContext {
    /// Spectrum id
    pub id: String,
    /// `precursormass` and `elution`, as read
    pub attributes: Attributes,
}

/// `<SPECTRUM>`: emits nothing itself, supplies context to its children
#[derive(Debug, Default)]
pub struct SpectrumMatcher {
    attributes: Attributes,
    match_ids: Vec<String>,
}

impl SpectrumMatcher {
    pub(crate) fn process_element(&mut self, attributes: Attributes) {
        self.attributes.absorb(attributes, ATTRIBUTES);
        self.match_ids.clear();
    }

    /// Both `id` and `precursormass` are present
    pub fn has_minimal_match_data(&self) -> bool {
        self.attributes.contains("id") && self.attributes.contains("precursormass")
    }

    /// Spectrum id
    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id")
    }

    /// Context for child matches, present only when the spectrum has its minimal data
    pub fn context(&self) -> Option<SpectrumContext> {
        if !self.has_minimal_match_data() {
            return None;
        }
        let id = self.id()?.to_string();
        Some(SpectrumContext {
            id,
            attributes: self.attributes.clone(),
        })
    }

    /// Note a child match that emitted a peptide row
    pub fn record_match(&mut self, match_id: &str) {
        self.match_ids.push(match_id.to_string());
    }

    /// Ids of the child matches emitted so far, in closure order
    pub fn match_ids(&self) -> &[String] {
        &self.match_ids
    }

    pub(crate) fn save(&self) -> SaveOutcome {
        if self.has_minimal_match_data() {
            SaveOutcome::Consumed
        } else {
            SaveOutcome::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_data() {
        let mut spectrum = SpectrumMatcher::default();
        spectrum.process_element(Attributes::from_iter([("id", "s1")]));
        assert!(!spectrum.has_minimal_match_data());
        assert!(spectrum.context().is_none());
        assert_eq!(spectrum.save(), SaveOutcome::Rejected);

        spectrum.process_element(Attributes::from_iter([
            ("id", "s2"),
            ("precursormass", "500.2"),
        ]));
        let context = spectrum.context().unwrap();
        assert_eq!(context.id, "s2");
        assert_eq!(context.attributes.get("precursormass"), Some("500.2"));
        assert_eq!(context.attributes.get("elution"), None);
    }

    #[test]
    fn test_reuse_clears_matches() {
        let mut spectrum = SpectrumMatcher::default();
        spectrum.process_element(Attributes::from_iter([("id", "s1")]));
        spectrum.record_match("m1");
        assert_eq!(spectrum.match_ids(), ["m1".to_string()]);

        spectrum.process_element(Attributes::from_iter([("id", "s2")]));
        assert!(spectrum.match_ids().is_empty());
    }
}
