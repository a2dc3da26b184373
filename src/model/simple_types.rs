//! Simple type definitions

use serde::Serialize;
use std::fmt;

use super::NodeId;
use crate::locations::SourceLocation;
use crate::namespaces::QName;

/// Simple type variety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleVariety {
    /// Restriction of an atomic type
    #[default]
    Atomic,
    /// Whitespace-separated list of an item type
    List,
    /// Union of member types
    Union,
}

impl fmt::Display for SimpleVariety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atomic => write!(f, "atomic"),
            Self::List => write!(f, "list"),
            Self::Union => write!(f, "union"),
        }
    }
}

/// A constraining facet, kept as written (`<xs:maxLength value="10"/>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facet {
    /// Facet element local name
    pub name: String,
    /// Facet `value` attribute
    pub value: String,
}

impl Facet {
    /// Create a facet
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// XSD simple type definition
#[derive(Debug, Clone, PartialEq)]
pub struct XsdSimpleType {
    /// Local name (None for anonymous types)
    pub name: Option<String>,
    /// Qualified name (None for anonymous types)
    pub qualified_name: Option<QName>,
    /// Atomic, list or union
    pub variety: SimpleVariety,
    /// Restriction base, or the item type of a list
    pub base: Option<NodeId>,
    /// Union member types
    pub members: Vec<NodeId>,
    /// Constraining facets in document order
    pub restrictions: Vec<Facet>,
    /// Where the type was declared
    pub location: SourceLocation,
}

impl XsdSimpleType {
    /// Create an atomic simple type without a base
    pub fn new(qualified_name: Option<QName>) -> Self {
        Self {
            name: qualified_name.as_ref().map(|q| q.local_name.clone()),
            qualified_name,
            variety: SimpleVariety::Atomic,
            base: None,
            members: Vec::new(),
            restrictions: Vec::new(),
            location: SourceLocation::unknown(),
        }
    }

    /// Values of every `enumeration` facet
    pub fn enumeration(&self) -> Vec<&str> {
        self.restrictions
            .iter()
            .filter(|f| f.name == "enumeration")
            .map(|f| f.value.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_facets() {
        let mut ty = XsdSimpleType::new(Some(QName::local("Color")));
        ty.restrictions.push(Facet::new("enumeration", "red"));
        ty.restrictions.push(Facet::new("maxLength", "5"));
        ty.restrictions.push(Facet::new("enumeration", "blue"));
        assert_eq!(ty.enumeration(), vec!["red", "blue"]);
        assert_eq!(ty.variety, SimpleVariety::Atomic);
    }
}
