//! The scope stack of open matchers and the per-kind matcher pool.

use super::matchers::{ElementKind, Matcher};

#[derive(Debug)]
struct ScopeEntry {
    matcher: Matcher,
    depth: usize,
}

/// Last-in-first-out stack of the registered elements currently open
///
/// Its height is the nesting depth counted over registered elements only.
#[derive(Debug, Default)]
pub struct Scope {
    entries: Vec<ScopeEntry>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Innermost open matcher
    pub fn peek(&self) -> Option<&Matcher> {
        self.entries.last().map(|e| &e.matcher)
    }

    /// Innermost open matcher, mutably
    pub fn peek_mut(&mut self) -> Option<&mut Matcher> {
        self.entries.last_mut().map(|e| &mut e.matcher)
    }

    /// Number of open registered elements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no registered element is open
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Kinds of the open elements, outermost first
    pub fn kinds(&self) -> Vec<ElementKind> {
        self.entries.iter().map(|e| e.matcher.kind()).collect()
    }

    /// Open a matcher whose element starts at XML nesting `depth`
    pub fn push(&mut self, matcher: Matcher, depth: usize) {
        self.entries.push(ScopeEntry { matcher, depth });
    }

    /// Close the innermost matcher
    pub fn pop(&mut self) -> Option<Matcher> {
        self.entries.pop().map(|e| e.matcher)
    }

    /// The innermost matcher if its element is the one open at XML nesting `depth`
    pub fn innermost_at(&mut self, depth: usize) -> Option<&mut Matcher> {
        self.entries
            .last_mut()
            .filter(|e| e.depth == depth)
            .map(|e| &mut e.matcher)
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Matcher> + '_ {
        self.entries.drain(..).map(|e| e.matcher)
    }
}

/// Spare matcher instances, reused across sibling elements
#[derive(Debug, Default)]
pub struct MatcherPool {
    spare: [Vec<Matcher>; ElementKind::COUNT],
}

impl MatcherPool {
    /// A matcher for `kind`, reused when one is available
    pub fn take(&mut self, kind: ElementKind) -> Matcher {
        self.spare[kind.index()]
            .pop()
            .unwrap_or_else(|| Matcher::new(kind))
    }

    /// Return a matcher for later reuse
    pub fn release(&mut self, matcher: Matcher) {
        self.spare[matcher.kind().index()].push(matcher);
    }

    /// Number of spare matchers of `kind`
    pub fn spare(&self, kind: ElementKind) -> usize {
        self.spare[kind.index()].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo() {
        let mut scope = Scope::new();
        scope.push(Matcher::new(ElementKind::Protein), 2);
        scope.push(Matcher::new(ElementKind::Coverage), 3);

        assert_eq!(scope.kinds(), vec![ElementKind::Protein, ElementKind::Coverage]);
        assert_eq!(scope.peek().map(Matcher::kind), Some(ElementKind::Coverage));
        assert!(scope.innermost_at(2).is_none());
        assert!(scope.innermost_at(3).is_some());

        assert_eq!(scope.pop().map(|m| m.kind()), Some(ElementKind::Coverage));
        assert!(scope.peek_mut().and_then(Matcher::as_protein_mut).is_some());
        assert_eq!(scope.pop().map(|m| m.kind()), Some(ElementKind::Protein));
        assert!(scope.pop().is_none());
    }

    #[test]
    fn test_pool_reuses_instances() {
        let mut pool = MatcherPool::default();
        let matcher = pool.take(ElementKind::Match);
        assert_eq!(pool.spare(ElementKind::Match), 0);
        pool.release(matcher);
        assert_eq!(pool.spare(ElementKind::Match), 1);

        let again = pool.take(ElementKind::Match);
        assert_eq!(again.kind(), ElementKind::Match);
        assert_eq!(pool.spare(ElementKind::Match), 0);
        assert_eq!(pool.take(ElementKind::MsmsPeaks).kind(), ElementKind::MsmsPeaks);
    }
}
