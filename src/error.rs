//! Error types for wsdl-types
//!
//! Hard failures (unreadable documents, broken XML, exceeded limits) are
//! reported through [`Error`]. Problems found in the schemas themselves are
//! collected as [`Diagnostic`]s so one run reports all of them; they only
//! surface as an `Error` when the pipeline as a whole gives up.

use std::fmt;
use thiserror::Error;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::model::DeclarationKind;
use crate::namespaces::QName;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wsdl-types operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schema or WSDL document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A name was looked up that no visible schema declares
    #[error("unknown {kind} reference '{name}'")]
    UnknownReference {
        /// Symbol space that was searched
        kind: DeclarationKind,
        /// The qualified name that was requested
        name: QName,
    },

    /// On-demand resolution of a single declaration failed
    #[error("{0}")]
    Diagnostic(Box<Diagnostic>),

    /// The resolution pass recorded fatal diagnostics; nothing was produced
    #[error("schema resolution failed with {count} error(s):\n{report}", count = .0.error_count(), report = .0)]
    Resolution(Diagnostics),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Value error (invalid option or attribute value)
    #[error("value error: {0}")]
    Value(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML tokenizer error
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON export error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Diagnostic category of a schema-level failure
    ///
    /// `None` for I/O, XML and other document-level errors, and for a failed
    /// pipeline, which carries several diagnostics.
    pub fn diagnostic_kind(&self) -> Option<DiagnosticKind> {
        match self {
            Error::UnknownReference { .. } => Some(DiagnosticKind::UnknownReference),
            Error::Diagnostic(diagnostic) => Some(diagnostic.kind),
            _ => None,
        }
    }
}

impl From<Diagnostic> for Error {
    fn from(diagnostic: Diagnostic) -> Self {
        Error::Diagnostic(Box::new(diagnostic))
    }
}

/// Document-level parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema source that caused the error
    pub source: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the source
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref loc) = self.location {
            write!(f, "\n\nLocation: {}", loc)?;
        }

        if let Some(ref src) = self.source {
            write!(f, "\n\nSource:\n{}", src)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
