//! Element declarations

use super::particles::Occurs;
use super::NodeId;
use crate::locations::SourceLocation;
use crate::namespaces::QName;

/// Where an element was declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementScope {
    /// Top-level declaration of a schema
    #[default]
    Global,
    /// Declared inside a group or complex type
    Local,
}

/// XSD element declaration
#[derive(Debug, Clone, PartialEq)]
pub struct XsdElement {
    /// Local name
    pub name: String,
    /// Qualified name (local elements follow `elementFormDefault`/`form`)
    pub qualified_name: QName,
    /// Type of the element's content
    pub type_ref: Option<NodeId>,
    /// Occurrence bounds as declared on the element
    pub occurs: Occurs,
    /// Whether `xsi:nil` is allowed
    pub nillable: bool,
    /// Whether the element is abstract
    pub is_abstract: bool,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Head of the substitution group this element joins
    pub substitution_group: Option<NodeId>,
    /// Global or local declaration
    pub scope: ElementScope,
    /// Where the element was declared
    pub location: SourceLocation,
}

impl XsdElement {
    /// Create an element declaration with default facets
    pub fn new(qualified_name: QName, scope: ElementScope) -> Self {
        Self {
            name: qualified_name.local_name.clone(),
            qualified_name,
            type_ref: None,
            occurs: Occurs::once(),
            nillable: false,
            is_abstract: false,
            default: None,
            fixed: None,
            substitution_group: None,
            scope,
            location: SourceLocation::unknown(),
        }
    }

    /// Whether this is a top-level declaration
    pub fn is_global(&self) -> bool {
        self.scope == ElementScope::Global
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_defaults() {
        let element = XsdElement::new(QName::namespaced("urn:a", "street"), ElementScope::Local);
        assert_eq!(element.name, "street");
        assert_eq!(element.occurs, Occurs::once());
        assert!(!element.nillable);
        assert!(!element.is_global());
        assert!(element.type_ref.is_none());
    }
}
