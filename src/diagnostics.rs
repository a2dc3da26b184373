//! Structured diagnostics
//!
//! Schema problems are collected rather than raised, so one run reports
//! every broken declaration. Each diagnostic names its kind, the declaration
//! it concerns, and where in which document the offending element sits.

use std::collections::HashSet;
use std::fmt;

use crate::locations::SourceLocation;
use crate::model::DeclarationKind;
use crate::namespaces::QName;

/// Category of a schema problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A required attribute (usually `name` or `ref`) is absent
    MissingRequiredAttribute,
    /// A lookup named a declaration no visible schema has
    ///
    /// Lookups fail with [`Error::UnknownReference`](crate::Error::UnknownReference)
    /// rather than recording a diagnostic; this is its
    /// [`Error::diagnostic_kind`](crate::Error::diagnostic_kind). Dangling
    /// references met during resolution are [`Self::UnresolvedReference`].
    UnknownReference,
    /// A reference was still dangling once every schema was registered
    UnresolvedReference,
    /// Two declarations share a qualified name in one symbol space
    NamespaceCollision,
    /// Unexpected child inside a group or compositor
    MalformedCompositor,
    /// An attribute value could not be parsed
    InvalidAttributeValue,
    /// A document's target namespace conflicts with how it was pulled in
    NamespaceMismatch,
}

impl DiagnosticKind {
    /// Stable short code, used in rendered output
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingRequiredAttribute => "missing-required-attribute",
            Self::UnknownReference => "unknown-reference",
            Self::UnresolvedReference => "unresolved-reference",
            Self::NamespaceCollision => "namespace-collision",
            Self::MalformedCompositor => "malformed-compositor",
            Self::InvalidAttributeValue => "invalid-attribute-value",
            Self::NamespaceMismatch => "namespace-mismatch",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Reported, but does not stop the pipeline
    Warning,
    /// Fails the pipeline
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single schema problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Whether it fails the pipeline
    pub severity: Severity,
    /// Human readable description
    pub message: String,
    /// The declaration the problem belongs to, if it has a name
    pub declaration: Option<QName>,
    /// Where the offending element sits
    pub location: SourceLocation,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            declaration: None,
            location,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            declaration: None,
            location,
        }
    }

    /// Attach the name of the declaration being processed
    pub fn with_declaration(mut self, name: QName) -> Self {
        self.declaration = Some(name);
        self
    }

    /// Override the severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Whether this diagnostic fails the pipeline
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub(crate) fn missing_attribute(
        element: &str,
        attribute: &str,
        location: SourceLocation,
    ) -> Self {
        Self::error(
            DiagnosticKind::MissingRequiredAttribute,
            format!("<{}> is missing required attribute '{}'", element, attribute),
            location,
        )
    }

    pub(crate) fn invalid_value(
        attribute: &str,
        value: &str,
        expected: &str,
        location: SourceLocation,
    ) -> Self {
        Self::error(
            DiagnosticKind::InvalidAttributeValue,
            format!(
                "attribute '{}' has invalid value '{}' (expected {})",
                attribute, value, expected
            ),
            location,
        )
    }

    pub(crate) fn unresolved(kind: DeclarationKind, name: &QName, location: SourceLocation) -> Self {
        Self::error(
            DiagnosticKind::UnresolvedReference,
            format!("{} reference '{}' cannot be resolved", kind, name),
            location,
        )
        .with_declaration(name.clone())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location, self.severity, self.kind, self.message
        )?;
        if let Some(ref name) = self.declaration {
            write!(f, " (in '{}')", name)?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics for one run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    /// Dangling references already reported, keyed by symbol space and name
    unresolved_seen: HashSet<(DeclarationKind, QName)>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::debug!(kind = %diagnostic.kind, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(kind = %diagnostic.kind, "{}", diagnostic.message),
        }
        self.items.push(diagnostic);
    }

    /// Record a dangling reference unless that name was already reported
    ///
    /// Returns `true` when the diagnostic was recorded.
    pub fn push_unresolved(
        &mut self,
        kind: DeclarationKind,
        name: &QName,
        location: SourceLocation,
    ) -> bool {
        if !self.unresolved_seen.insert((kind, name.clone())) {
            return false;
        }
        self.push(Diagnostic::unresolved(kind, name, location));
        true
    }

    /// Whether any error-severity diagnostic was recorded
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    /// Number of error-severity diagnostics
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Error-severity diagnostics
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    /// Warning-severity diagnostics
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    /// Diagnostics of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    /// All diagnostics in the order they were recorded
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keep only warnings, dropping errors
    pub(crate) fn into_warnings(self) -> Self {
        Self {
            items: self.items.into_iter().filter(|d| !d.is_error()).collect(),
            unresolved_seen: HashSet::new(),
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::SourcePosition;
    use std::sync::Arc;

    fn loc(line: u32) -> SourceLocation {
        SourceLocation::new(Some(Arc::from("a.xsd")), SourcePosition::new(line, 3))
    }

    #[test]
    fn test_error_and_warning() {
        let e = Diagnostic::error(DiagnosticKind::NamespaceCollision, "dup", loc(1));
        let w = Diagnostic::warning(DiagnosticKind::MalformedCompositor, "odd", loc(2));
        assert!(e.is_error());
        assert!(!w.is_error());
        assert_eq!(w.with_severity(Severity::Error).severity, Severity::Error);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::missing_attribute("group", "name", loc(7))
            .with_declaration(QName::namespaced("urn:x", "G"));
        assert_eq!(
            d.to_string(),
            "a.xsd:7:3: error [missing-required-attribute] <group> is missing required attribute 'name' (in '{urn:x}G')"
        );
    }

    #[test]
    fn test_unresolved_reported_once_per_name() {
        let mut diags = Diagnostics::new();
        let name = QName::namespaced("urn:x", "Missing");
        assert!(diags.push_unresolved(DeclarationKind::Type, &name, loc(1)));
        assert!(!diags.push_unresolved(DeclarationKind::Type, &name, loc(9)));
        assert!(diags.push_unresolved(DeclarationKind::Group, &name, loc(4)));
        assert_eq!(diags.of_kind(DiagnosticKind::UnresolvedReference).count(), 2);
    }

    #[test]
    fn test_counts_and_filtering() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warning(DiagnosticKind::MalformedCompositor, "w", loc(1)));
        assert!(!diags.has_errors());
        diags.push(Diagnostic::error(DiagnosticKind::NamespaceCollision, "e", loc(2)));
        assert!(diags.has_errors());
        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warnings().count(), 1);

        let warnings = diags.into_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(!warnings.has_errors());
    }
}
