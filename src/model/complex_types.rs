//! Complex type definitions
//!
//! A complex type's element content is kept as a flat particle list under a
//! single compositor. Content pulled in through a direct `xs:group ref` is
//! one particle pointing at the shared group definition, and extension
//! content is the derived type's own particles (the base stays reachable
//! through `base`).

use std::fmt;

use super::groups::ModelType;
use super::particles::Particle;
use super::NodeId;
use crate::locations::SourceLocation;
use crate::namespaces::QName;

/// Derivation method for complex types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Type derived by extension
    Extension,
    /// Type derived by restriction
    Restriction,
}

impl Derivation {
    /// Parse from element tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "extension" => Some(Self::Extension),
            "restriction" => Some(Self::Restriction),
            _ => None,
        }
    }
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extension => write!(f, "extension"),
            Self::Restriction => write!(f, "restriction"),
        }
    }
}

/// Content type label for complex types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    /// No content (empty element)
    #[default]
    Empty,
    /// Simple content (text only)
    Simple,
    /// Mixed content (text and elements)
    Mixed,
    /// Element-only content
    ElementOnly,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Simple => write!(f, "simple"),
            Self::Mixed => write!(f, "mixed"),
            Self::ElementOnly => write!(f, "element-only"),
        }
    }
}

/// XSD complex type definition
#[derive(Debug, Clone, PartialEq)]
pub struct XsdComplexType {
    /// Local name (None for anonymous types)
    pub name: Option<String>,
    /// Qualified name (None for anonymous types)
    pub qualified_name: Option<QName>,
    /// Compositor governing `members`
    pub content_model: ModelType,
    /// Content type label
    pub content: ContentKind,
    /// Element content in document order
    pub members: Vec<Particle>,
    /// Attribute declarations and references
    pub attributes: Vec<NodeId>,
    /// Base type for derived types
    pub base: Option<NodeId>,
    /// How the type was derived from `base`
    pub derivation: Option<Derivation>,
    /// Whether character data may be interleaved with elements
    pub mixed: bool,
    /// Whether the type is abstract
    pub is_abstract: bool,
    /// Where the type was declared
    pub location: SourceLocation,
}

impl XsdComplexType {
    /// Create an empty complex type
    pub fn new(qualified_name: Option<QName>) -> Self {
        Self {
            name: qualified_name.as_ref().map(|q| q.local_name.clone()),
            qualified_name,
            content_model: ModelType::Sequence,
            content: ContentKind::Empty,
            members: Vec::new(),
            attributes: Vec::new(),
            base: None,
            derivation: None,
            mixed: false,
            is_abstract: false,
            location: SourceLocation::unknown(),
        }
    }

    /// Whether the type was declared inline
    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Whether this type derives from another
    pub fn is_derived(&self) -> bool {
        self.derivation.is_some()
    }
}
