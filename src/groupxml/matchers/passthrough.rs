use super::ElementKind;

/// Registered element whose content is not ingested
///
/// It only keeps the scope stack balanced.
#[derive(Debug, Clone, Copy)]
pub struct PassThroughMatcher {
    kind: ElementKind,
}

impl PassThroughMatcher {
    pub(crate) fn new(kind: ElementKind) -> Self {
        Self { kind }
    }

    /// Element kind handled by this matcher
    pub fn kind(&self) -> ElementKind {
        self.kind
    }
}
