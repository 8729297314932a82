//! Element matchers: one handler per registered Group-XML element.
//!
//! Every matcher follows the same three-step contract:
//!
//! 1. `process_element` clears previous state (instances are reused across
//!    siblings) and copies the attributes it cares about
//! 2. `has_minimal_match_data` decides whether enough was collected to save
//! 3. `save` runs once the element closes: it emits rows, records ids in the
//!    cross-reference maps, or updates the enclosing element still open on the
//!    scope stack

use std::fmt;

use serde::Serialize;

use super::attributes::Attributes;
use super::context::DocumentContext;
use super::error::MatchError;
use super::scope::Scope;
use super::summary::KindCounters;
use crate::sink::{RowSink, SinkError};

pub use coverage::CoverageMatcher;
pub use itraq::ItraqMatcher;
pub use passthrough::PassThroughMatcher;
pub use peptide::PeptideMatcher;
pub use protein::{ProteinMatcher, COVERAGE_THRESHOLDS};
pub use psm::PsmMatcher;
pub use spectrum::{SpectrumContext, SpectrumMatcher};

mod coverage;
mod itraq;
mod passthrough;
mod peptide;
mod protein;
mod psm;
mod spectrum;

/// Registered Group-XML element names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    /// `<SPECTRUM>`: shared context for its matches
    #[serde(rename = "SPECTRUM")]
    Spectrum,
    /// `<MATCH>`: peptide-to-spectrum identification
    #[serde(rename = "MATCH")]
    Match,
    /// `<PEPTIDE>`: groups matches under a peptide id
    #[serde(rename = "PEPTIDE")]
    Peptide,
    /// `<PROTEIN>`: protein summary
    #[serde(rename = "PROTEIN")]
    Protein,
    /// `<PROTEIN2MATCH>`
    #[serde(rename = "PROTEIN2MATCH")]
    Protein2Match,
    /// `<COVERAGE>`: sequence coverage of the enclosing protein
    #[serde(rename = "COVERAGE")]
    Coverage,
    /// `<MSMSPEAKS>`
    #[serde(rename = "MSMSPEAKS")]
    MsmsPeaks,
    /// `<ITRAQPEAKS>`: reporter ion peaks of the enclosing spectrum
    #[serde(rename = "ITRAQPEAKS")]
    ItraqPeaks,
}

impl ElementKind {
    /// Number of registered kinds
    pub const COUNT: usize = 8;

    /// Every registered kind
    pub const ALL: [ElementKind; Self::COUNT] = [
        ElementKind::Spectrum,
        ElementKind::Match,
        ElementKind::Peptide,
        ElementKind::Protein,
        ElementKind::Protein2Match,
        ElementKind::Coverage,
        ElementKind::MsmsPeaks,
        ElementKind::ItraqPeaks,
    ];

    /// Look up the kind registered for an element name
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "SPECTRUM" => ElementKind::Spectrum,
            "MATCH" => ElementKind::Match,
            "PEPTIDE" => ElementKind::Peptide,
            "PROTEIN" => ElementKind::Protein,
            "PROTEIN2MATCH" => ElementKind::Protein2Match,
            "COVERAGE" => ElementKind::Coverage,
            "MSMSPEAKS" => ElementKind::MsmsPeaks,
            "ITRAQPEAKS" => ElementKind::ItraqPeaks,
            _ => return None,
        })
    }

    /// Element name
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::Spectrum => "SPECTRUM",
            ElementKind::Match => "MATCH",
            ElementKind::Peptide => "PEPTIDE",
            ElementKind::Protein => "PROTEIN",
            ElementKind::Protein2Match => "PROTEIN2MATCH",
            ElementKind::Coverage => "COVERAGE",
            ElementKind::MsmsPeaks => "MSMSPEAKS",
            ElementKind::ItraqPeaks => "ITRAQPEAKS",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// One-line summary of this kind's counters for a document
    pub fn summary(self, counters: &KindCounters) -> String {
        let done = match self {
            ElementKind::Match => format!("{} peptide rows", counters.emitted),
            ElementKind::Protein => format!("{} protein rows", counters.emitted),
            ElementKind::ItraqPeaks => format!("{} with quantitation rows", counters.emitted),
            ElementKind::Peptide => format!("{} indexed", counters.recorded),
            ElementKind::Coverage => format!("{} applied", counters.recorded),
            ElementKind::Spectrum | ElementKind::Protein2Match | ElementKind::MsmsPeaks => {
                format!("{} closed", counters.closed)
            }
        };
        let mut line = format!("{}: {} seen, {}", self, counters.opened, done);
        if counters.rejected > 0 {
            line.push_str(&format!(", {} failed (insufficient data)", counters.rejected));
        }
        line
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a matcher did when its element closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// One or more rows were appended
    Emitted,
    /// A cross-reference map or the enclosing element was updated
    Recorded,
    /// Nothing to do for this element
    Consumed,
    /// Minimal data missing; nothing was emitted
    Rejected,
}

/// A matcher for one open element
#[derive(Debug)]
pub enum Matcher {
    /// `<SPECTRUM>`
    Spectrum(SpectrumMatcher),
    /// `<MATCH>`
    Match(PsmMatcher),
    /// `<PEPTIDE>`
    Peptide(PeptideMatcher),
    /// `<PROTEIN>`
    Protein(ProteinMatcher),
    /// `<COVERAGE>`
    Coverage(CoverageMatcher),
    /// `<ITRAQPEAKS>`
    ItraqPeaks(ItraqMatcher),
    /// `<PROTEIN2MATCH>` and `<MSMSPEAKS>`
    PassThrough(PassThroughMatcher),
}

impl Matcher {
    /// Fresh matcher for `kind`
    pub fn new(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Spectrum => Matcher::Spectrum(SpectrumMatcher::default()),
            ElementKind::Match => Matcher::Match(PsmMatcher::default()),
            ElementKind::Peptide => Matcher::Peptide(PeptideMatcher::default()),
            ElementKind::Protein => Matcher::Protein(ProteinMatcher::default()),
            ElementKind::Coverage => Matcher::Coverage(CoverageMatcher::default()),
            ElementKind::ItraqPeaks => Matcher::ItraqPeaks(ItraqMatcher::default()),
            ElementKind::Protein2Match | ElementKind::MsmsPeaks => {
                Matcher::PassThrough(PassThroughMatcher::new(kind))
            }
        }
    }

    /// Element kind handled by this matcher
    pub fn kind(&self) -> ElementKind {
        match self {
            Matcher::Spectrum(_) => ElementKind::Spectrum,
            Matcher::Match(_) => ElementKind::Match,
            Matcher::Peptide(_) => ElementKind::Peptide,
            Matcher::Protein(_) => ElementKind::Protein,
            Matcher::Coverage(_) => ElementKind::Coverage,
            Matcher::ItraqPeaks(_) => ElementKind::ItraqPeaks,
            Matcher::PassThrough(m) => m.kind(),
        }
    }

    /// Start a new element, discarding state from the previous one
    ///
    /// `scope` holds the elements still open around this one; its top is the
    /// direct registered parent.
    pub fn process_element(&mut self, attributes: Attributes, scope: &Scope) -> Result<(), MatchError> {
        match self {
            Matcher::Spectrum(m) => m.process_element(attributes),
            Matcher::Match(m) => m.process_element(attributes, scope),
            Matcher::Peptide(m) => m.process_element(attributes),
            Matcher::Protein(m) => m.process_element(attributes),
            Matcher::Coverage(m) => return m.process_element(attributes, scope),
            Matcher::ItraqPeaks(m) => m.process_element(scope),
            Matcher::PassThrough(_) => {}
        }
        Ok(())
    }

    /// Character data directly inside the element
    pub fn process_text(&mut self, text: &str) {
        match self {
            Matcher::Protein(m) => m.process_text(text),
            Matcher::ItraqPeaks(m) => m.process_text(text),
            _ => {}
        }
    }

    /// Whether enough data was collected to save the element
    pub fn has_minimal_match_data(&self) -> bool {
        match self {
            Matcher::Spectrum(m) => m.has_minimal_match_data(),
            Matcher::Match(m) => m.has_minimal_match_data(),
            Matcher::Peptide(m) => m.has_minimal_match_data(),
            Matcher::Protein(m) => m.has_minimal_match_data(),
            Matcher::Coverage(m) => m.has_minimal_match_data(),
            Matcher::ItraqPeaks(m) => m.has_minimal_match_data(),
            Matcher::PassThrough(_) => true,
        }
    }

    /// Finish the element after it has been popped from `scope`
    pub fn save<S: RowSink + ?Sized>(
        &self,
        scope: &mut Scope,
        ctx: &mut DocumentContext,
        sink: &mut S,
    ) -> Result<SaveOutcome, SinkError> {
        match self {
            Matcher::Spectrum(m) => Ok(m.save()),
            Matcher::Match(m) => m.save(scope, ctx, sink),
            Matcher::Peptide(m) => Ok(m.save(ctx)),
            Matcher::Protein(m) => m.save(ctx, sink),
            Matcher::Coverage(m) => Ok(m.save(scope, ctx)),
            Matcher::ItraqPeaks(m) => m.save(scope, ctx, sink),
            Matcher::PassThrough(_) => Ok(SaveOutcome::Consumed),
        }
    }

    /// The spectrum matcher, if this is one
    pub fn as_spectrum(&self) -> Option<&SpectrumMatcher> {
        match self {
            Matcher::Spectrum(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable spectrum matcher, if this is one
    pub fn as_spectrum_mut(&mut self) -> Option<&mut SpectrumMatcher> {
        match self {
            Matcher::Spectrum(m) => Some(m),
            _ => None,
        }
    }

    /// Mutable protein matcher, if this is one
    pub fn as_protein_mut(&mut self) -> Option<&mut ProteinMatcher> {
        match self {
            Matcher::Protein(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_name(kind.name()), Some(kind));
            assert_eq!(Matcher::new(kind).kind(), kind);
            assert_eq!(ElementKind::ALL[kind.index()], kind);
        }
        assert_eq!(ElementKind::from_name("match"), None);
        assert_eq!(ElementKind::from_name("RESULTS"), None);
    }

    #[test]
    fn test_downcasts() {
        let mut protein = Matcher::new(ElementKind::Protein);
        assert!(protein.as_protein_mut().is_some());
        assert!(protein.as_spectrum().is_none());

        let mut spectrum = Matcher::new(ElementKind::Spectrum);
        assert!(spectrum.as_protein_mut().is_none());
        assert!(spectrum.as_spectrum_mut().is_some());
    }

    #[test]
    fn test_kind_summary_line() {
        let counters = KindCounters {
            opened: 3,
            closed: 3,
            emitted: 2,
            recorded: 0,
            rejected: 1,
        };
        assert_eq!(
            ElementKind::Match.summary(&counters),
            "MATCH: 3 seen, 2 peptide rows, 1 failed (insufficient data)"
        );
    }
}
