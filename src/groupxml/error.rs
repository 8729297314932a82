use super::matchers::ElementKind;
use crate::sink::SinkError;

/// Structural violations of the element nesting
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Malformation {
    /// A registered end tag does not close the innermost open registered element
    #[error("</{found}> closes while <{expected}> is the innermost open element")]
    StackMismatch {
        /// Kind on top of the scope stack
        expected: ElementKind,
        /// Kind named by the end tag
        found: ElementKind,
    },

    /// A registered end tag arrived with nothing open
    #[error("</{0}> has no matching start tag")]
    UnexpectedClose(ElementKind),

    /// An end tag names a different element than the innermost open one
    #[error("</{found}> closes while <{expected}> is the innermost open element")]
    MismatchedEndTag {
        /// Name of the innermost open element
        expected: String,
        /// Name in the end tag
        found: String,
    },

    /// An end tag arrived with no element open
    #[error("</{0}> has no matching start tag")]
    UnmatchedEndTag(String),

    /// The document ended while registered elements were still open
    #[error("document ended inside {}", describe_open(.0))]
    Unterminated(Vec<ElementKind>),
}

fn describe_open(open: &[ElementKind]) -> String {
    open.iter()
        .map(|k| format!("<{}>", k))
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Errors that abort the processing of a document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Invalid element nesting
    #[error("Malformed Group-XML: {0}")]
    Malformed(#[from] Malformation),

    /// Error from the XML tokenizer
    #[error("XML parsing error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// I/O error while reading the document
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A name or value is not valid in the document's declared encoding
    #[error("Encoding error: {0}")]
    EncodingError(#[from] quick_xml::encoding::EncodingError),

    /// Attribute value with an invalid escape sequence
    #[error("Invalid attribute value: {0}")]
    InvalidAttributeValue(String),

    /// The row sink failed; this aborts the whole run, not just the document
    #[error("Sink error: {0}")]
    SinkError(#[from] SinkError),
}

impl ParseError {
    /// Whether the error concerns the document itself rather than the output
    ///
    /// Document errors abort only the current file; sink errors abort the run.
    pub fn is_document_error(&self) -> bool {
        !matches!(self, ParseError::SinkError(_))
    }
}

/// Locally recovered problems reported by a matcher's `process_element`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MatchError {
    /// The element is not nested directly in the kind it needs to update
    #[error("<{element}> must be nested directly in <{expected}>, found {}", describe_parent(.found))]
    ScopeViolation {
        /// Element being processed
        element: ElementKind,
        /// Required parent kind
        expected: ElementKind,
        /// Actual innermost open registered element
        found: Option<ElementKind>,
    },
}

fn describe_parent(found: &Option<ElementKind>) -> String {
    match found {
        Some(kind) => format!("<{}>", kind),
        None => "no registered parent".to_string(),
    }
}

/// An attribute value that could not be read as the field's numeric type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot read {field}={value:?} as {expected}")]
pub struct FieldCoercionError {
    /// Attribute name
    pub field: &'static str,
    /// Raw attribute value
    pub value: String,
    /// Name of the target type
    pub expected: &'static str,
}
