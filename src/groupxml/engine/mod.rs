//! The scope stack engine
//!
//! Drives one forward pass over a token source, keeps the stack of open
//! matchers in step with the nesting of registered elements, and hands each
//! closed element to its matcher. Rows are emitted in the order elements
//! *close*, which is what lets later closures resolve ids recorded by earlier
//! ones.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};

use super::attributes::Attributes;
use super::context::DocumentContext;
use super::error::{Malformation, ParseError};
use super::index::CrossReferences;
use super::matchers::ElementKind;
use super::scope::{MatcherPool, Scope};
use super::summary::ProcessingSummary;
use super::tokens::{Token, TokenSource};
use crate::sink::RowSink;

pub use batch::{FileReport, FileStatus, IngestError, RunSummary};

mod batch;
mod report;


/// Configuration for [`GroupXmlEngine`]
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Check the cancellation token every this many closed registered elements
    pub cancel_check_interval: usize,
    /// Clear the cross-reference maps before each document
    pub reset_indexes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cancel_check_interval: 256,
            reset_indexes: true,
        }
    }
}

/// Shared flag used to stop an engine between elements
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How the processing of one document ended
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The whole document was consumed
    Completed(ProcessingSummary),
    /// Processing stopped early on request; rows emitted so far are kept
    Cancelled(ProcessingSummary),
}

impl FileOutcome {
    /// Counters of the document
    pub fn summary(&self) -> &ProcessingSummary {
        match self {
            FileOutcome::Completed(s) | FileOutcome::Cancelled(s) => s,
        }
    }

    /// Whether processing was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FileOutcome::Cancelled(_))
    }
}

/// Streaming interpreter for ProteinPilot Group-XML documents
///
/// # Example
/// ```rust
/// use groupxml::groupxml::{FileOutcome, GroupXmlEngine, XmlTokenSource};
/// use groupxml::sink::{MemorySink, Table};
///
/// let xml = r#"<SPECTRUM id="s1" precursormass="500.2">
///   <MATCH id="m1" charge="2" confidence="95" mz="501.0" seq="PEPTIDER"/>
/// </SPECTRUM>"#;
///
/// let mut engine = GroupXmlEngine::new();
/// let mut sink = MemorySink::new();
/// let outcome = engine.process(XmlTokenSource::new(xml.as_bytes()), &mut sink)?;
///
/// assert!(matches!(outcome, FileOutcome::Completed(_)));
/// assert_eq!(sink.rows(Table::Peptides).len(), 1);
/// # Ok::<(), groupxml::groupxml::ParseError>(())
/// ```
#[derive(Debug, Default)]
pub struct GroupXmlEngine {
    config: EngineConfig,
    scope: Scope,
    pool: MatcherPool,
    context: DocumentContext,
    cancel: CancellationToken,
    open_names: Vec<String>,
}

impl GroupXmlEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Use `token` to stop processing from another thread
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this engine
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cross-reference maps of the last processed document
    pub fn cross_references(&self) -> &CrossReferences {
        &self.context.indexes
    }

    /// Counters of the current (or last) document
    pub fn summary(&self) -> ProcessingSummary {
        self.context.counters.summary()
    }

    /// Process one document
    ///
    /// The sink is flushed on every exit path. On error or cancellation the
    /// rows already emitted stay in the sink and the elements still open are
    /// dropped without being saved.
    pub fn process<T, S>(&mut self, mut tokens: T, sink: &mut S) -> Result<FileOutcome, ParseError>
    where
        T: TokenSource,
        S: RowSink + ?Sized,
    {
        self.begin_document();

        let result = self.run(&mut tokens, sink);
        let flushed = sink.flush();
        if !matches!(result, Ok(FileOutcome::Completed(_))) {
            self.abandon_scope();
        }

        let outcome = result?;
        flushed?;
        Ok(outcome)
    }

    fn begin_document(&mut self) {
        self.abandon_scope();
        self.open_names.clear();
        self.context.reset(!self.config.reset_indexes);
    }

    fn abandon_scope(&mut self) {
        let open: Vec<_> = self.scope.drain().collect();
        for matcher in open {
            self.pool.release(matcher);
        }
    }

    fn run<T, S>(&mut self, tokens: &mut T, sink: &mut S) -> Result<FileOutcome, ParseError>
    where
        T: TokenSource,
        S: RowSink + ?Sized,
    {
        let interval = self.config.cancel_check_interval.max(1);
        let mut depth = 0usize;
        let mut closed = 0usize;

        loop {
            match tokens.next_token()? {
                Token::Start { name, attributes } => {
                    depth += 1;
                    match ElementKind::from_name(&name) {
                        Some(kind) => self.open_element(kind, attributes, depth),
                        None => self.context.counters.unregistered_elements += 1,
                    }
                    self.open_names.push(name);
                }
                Token::Text(text) => {
                    if let Some(matcher) = self.scope.innermost_at(depth) {
                        matcher.process_text(&text);
                    }
                }
                Token::End { name } => {
                    let kind = ElementKind::from_name(&name);
                    self.check_end_tag(&name, kind)?;
                    if let Some(kind) = kind {
                        self.close_element(kind, sink)?;
                        closed += 1;
                        if closed % interval == 0 && self.cancel.is_cancelled() {
                            info!("Cancelled after {} closed elements", closed);
                            return Ok(FileOutcome::Cancelled(self.summary()));
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Token::DocumentEnd => {
                    if !self.scope.is_empty() {
                        return Err(Malformation::Unterminated(self.scope.kinds()).into());
                    }
                    debug!("Document complete after {} closed elements", closed);
                    return Ok(FileOutcome::Completed(self.summary()));
                }
            }
        }
    }

    /// Validate an end tag before anything is saved
    ///
    /// Registered names are checked against the scope stack first, so that a
    /// nesting error between registered elements is reported by kind.
    fn check_end_tag(&mut self, name: &str, kind: Option<ElementKind>) -> Result<(), Malformation> {
        if let Some(kind) = kind {
            match self.scope.peek() {
                None => return Err(Malformation::UnexpectedClose(kind)),
                Some(top) if top.kind() != kind => {
                    return Err(Malformation::StackMismatch {
                        expected: top.kind(),
                        found: kind,
                    })
                }
                Some(_) => {}
            }
        }

        match self.open_names.pop() {
            Some(open) if open == name => Ok(()),
            Some(open) => Err(Malformation::MismatchedEndTag {
                expected: open,
                found: name.to_string(),
            }),
            None => Err(Malformation::UnmatchedEndTag(name.to_string())),
        }
    }

    fn open_element(&mut self, kind: ElementKind, attributes: Attributes, depth: usize) {
        self.context.counters.record_open(kind);

        let mut matcher = self.pool.take(kind);
        if let Err(e) = matcher.process_element(attributes, &self.scope) {
            warn!("{}; element ignored", e);
            self.context.counters.scope_violations += 1;
        }
        self.scope.push(matcher, depth);
    }

    fn close_element<S: RowSink + ?Sized>(
        &mut self,
        kind: ElementKind,
        sink: &mut S,
    ) -> Result<(), ParseError> {
        let matcher = self
            .scope
            .pop()
            .ok_or(Malformation::UnexpectedClose(kind))?;
        if matcher.kind() != kind {
            let expected = matcher.kind();
            self.pool.release(matcher);
            return Err(Malformation::StackMismatch {
                expected,
                found: kind,
            }
            .into());
        }

        let outcome = matcher.save(&mut self.scope, &mut self.context, sink);
        self.pool.release(matcher);
        self.context.counters.record_save(kind, outcome?);
        Ok(())
    }
}
