//! Model groups
//!
//! An [`XsdGroup`] is either a named `xs:group` definition or the anonymous
//! group created for a compositor nested inside another one. Its `sequence`
//! holds the members in document order, which is the wire order downstream
//! code generation relies on.
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#cModel_Group_Definitions

use serde::Serialize;
use std::fmt;

use super::particles::{Occurs, Particle};
use crate::locations::SourceLocation;
use crate::namespaces::{QName, XSD_NAMESPACE};

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelType {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl ModelType {
    /// Parse from element tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Parse from a namespaced tag, accepting only the XSD namespace
    pub fn from_qname(qname: &QName) -> Option<Self> {
        if qname.namespace() == Some(XSD_NAMESPACE) {
            Self::from_tag(&qname.local_name)
        } else {
            None
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "sequence"),
            Self::Choice => write!(f, "choice"),
            Self::All => write!(f, "all"),
        }
    }
}

/// XSD Model Group
#[derive(Debug, Clone, PartialEq)]
pub struct XsdGroup {
    /// Local name (None for anonymous nested compositors)
    pub name: Option<String>,
    /// Name qualified by the owning schema's target namespace
    pub qualified_name: Option<QName>,
    /// Compositor kind
    pub compositor: ModelType,
    /// Members in document order
    pub sequence: Vec<Particle>,
    /// Occurrence bounds written on a nested compositor
    pub occurs: Occurs,
    /// Where the group was declared
    pub location: SourceLocation,
}

impl XsdGroup {
    /// Create an anonymous group for a nested compositor
    pub fn new(compositor: ModelType) -> Self {
        Self {
            name: None,
            qualified_name: None,
            compositor,
            sequence: Vec::new(),
            occurs: Occurs::once(),
            location: SourceLocation::unknown(),
        }
    }

    /// Create a named group definition
    pub fn named(qualified_name: QName, compositor: ModelType) -> Self {
        Self {
            name: Some(qualified_name.local_name.clone()),
            qualified_name: Some(qualified_name),
            ..Self::new(compositor)
        }
    }

    /// Clark-notation name used by WSDL tooling (`{ns}local`)
    pub fn wsdl_name(&self) -> Option<String> {
        self.qualified_name.as_ref().map(|q| q.to_string())
    }

    /// Append a member
    pub fn push(&mut self, particle: Particle) {
        self.sequence.push(particle);
    }

    /// Whether this group is a named definition
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Check if group has no members
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of direct members
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Iterate over direct members
    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.sequence.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeId;

    #[test]
    fn test_model_type_from_tag() {
        assert_eq!(ModelType::from_tag("sequence"), Some(ModelType::Sequence));
        assert_eq!(ModelType::from_tag("choice"), Some(ModelType::Choice));
        assert_eq!(ModelType::from_tag("all"), Some(ModelType::All));
        assert_eq!(ModelType::from_tag("invalid"), None);
    }

    #[test]
    fn test_model_type_from_qname_requires_xsd_namespace() {
        assert_eq!(
            ModelType::from_qname(&QName::xsd("choice")),
            Some(ModelType::Choice)
        );
        assert_eq!(
            ModelType::from_qname(&QName::namespaced("urn:other", "choice")),
            None
        );
    }

    #[test]
    fn test_named_group() {
        let group = XsdGroup::named(QName::namespaced("urn:a", "Addr"), ModelType::Choice);
        assert_eq!(group.name.as_deref(), Some("Addr"));
        assert_eq!(group.wsdl_name().as_deref(), Some("{urn:a}Addr"));
        assert_eq!(group.compositor, ModelType::Choice);
        assert!(group.is_empty());
    }

    #[test]
    fn test_anonymous_group() {
        let mut group = XsdGroup::new(ModelType::Sequence);
        assert!(!group.is_named());
        assert!(group.wsdl_name().is_none());

        group.push(Particle::new(NodeId::new(0), Occurs::once()));
        group.push(Particle::new(NodeId::new(1), Occurs::optional()));
        assert_eq!(group.len(), 2);
        assert_eq!(group.iter().nth(1).map(|p| p.occurs), Some(Occurs::optional()));
    }
}
