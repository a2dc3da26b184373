//! Type model
//!
//! Every resolvable schema construct becomes a [`TypeNode`] stored in a
//! [`TypeGraph`] arena and addressed by a [`NodeId`]. Links between nodes
//! are ids, never owned copies, so self- and mutually-recursive schema types
//! are ordinary cycles in the graph.

pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod graph;
pub mod groups;
pub mod particles;
pub mod references;
pub mod simple_types;
pub mod wildcards;

use serde::Serialize;
use std::fmt;

use crate::namespaces::QName;

pub use attributes::{AttributeUse, XsdAttribute};
pub use builtins::BuiltinType;
pub use complex_types::{ContentKind, Derivation, XsdComplexType};
pub use elements::{ElementScope, XsdElement};
pub use graph::TypeGraph;
pub use groups::{ModelType, XsdGroup};
pub use particles::{Occurs, Particle};
pub use references::XsdReference;
pub use simple_types::{Facet, SimpleVariety, XsdSimpleType};
pub use wildcards::{ProcessContents, XsdAnyElement};

/// XSD symbol space a top-level declaration lives in
///
/// Simple and complex types share one space, so a `simpleType` and a
/// `complexType` with the same name collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    /// `xs:element`
    Element,
    /// `xs:simpleType` / `xs:complexType`
    Type,
    /// `xs:group`
    Group,
    /// `xs:attribute`
    Attribute,
}

impl DeclarationKind {
    /// Symbol space of a top-level schema child, by local name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "element" => Some(Self::Element),
            "simpleType" | "complexType" => Some(Self::Type),
            "group" => Some(Self::Group),
            "attribute" => Some(Self::Attribute),
            _ => None,
        }
    }

    /// Lower-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Type => "type",
            Self::Group => "group",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable handle to a node in a [`TypeGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    /// Arena index
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resolvable schema construct
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// Named group definition or anonymous nested compositor
    Group(XsdGroup),
    /// Element declaration
    Element(XsdElement),
    /// Complex type definition
    ComplexType(XsdComplexType),
    /// Simple type definition
    SimpleType(XsdSimpleType),
    /// Attribute declaration
    Attribute(XsdAttribute),
    /// XSD built-in datatype
    Builtin(BuiltinType),
    /// Element wildcard (`xs:any`)
    Any(XsdAnyElement),
    /// Placeholder for a by-name reference
    Reference(XsdReference),
    /// Reserved slot whose declaration failed to build
    Pending,
}

impl TypeNode {
    /// Short variant label
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeNode::Group(_) => "group",
            TypeNode::Element(_) => "element",
            TypeNode::ComplexType(_) => "complexType",
            TypeNode::SimpleType(_) => "simpleType",
            TypeNode::Attribute(_) => "attribute",
            TypeNode::Builtin(_) => "builtin",
            TypeNode::Any(_) => "any",
            TypeNode::Reference(_) => "reference",
            TypeNode::Pending => "pending",
        }
    }

    /// Local name, for named constructs
    pub fn name(&self) -> Option<&str> {
        self.qualified_name().map(|q| q.local_name.as_str())
    }

    /// Qualified name, for named constructs
    pub fn qualified_name(&self) -> Option<&QName> {
        match self {
            TypeNode::Group(g) => g.qualified_name.as_ref(),
            TypeNode::Element(e) => Some(&e.qualified_name),
            TypeNode::ComplexType(t) => t.qualified_name.as_ref(),
            TypeNode::SimpleType(t) => t.qualified_name.as_ref(),
            TypeNode::Attribute(a) => Some(&a.qualified_name),
            TypeNode::Builtin(b) => Some(&b.name),
            TypeNode::Reference(r) => Some(&r.target),
            TypeNode::Any(_) | TypeNode::Pending => None,
        }
    }

    /// Get as group
    pub fn as_group(&self) -> Option<&XsdGroup> {
        match self {
            TypeNode::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Get as element
    pub fn as_element(&self) -> Option<&XsdElement> {
        match self {
            TypeNode::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get as complex type
    pub fn as_complex_type(&self) -> Option<&XsdComplexType> {
        match self {
            TypeNode::ComplexType(t) => Some(t),
            _ => None,
        }
    }

    /// Get as simple type
    pub fn as_simple_type(&self) -> Option<&XsdSimpleType> {
        match self {
            TypeNode::SimpleType(t) => Some(t),
            _ => None,
        }
    }

    /// Get as attribute
    pub fn as_attribute(&self) -> Option<&XsdAttribute> {
        match self {
            TypeNode::Attribute(a) => Some(a),
            _ => None,
        }
    }

    /// Get as built-in type
    pub fn as_builtin(&self) -> Option<&BuiltinType> {
        match self {
            TypeNode::Builtin(b) => Some(b),
            _ => None,
        }
    }

    /// Get as reference placeholder
    pub fn as_reference(&self) -> Option<&XsdReference> {
        match self {
            TypeNode::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this is a placeholder reference
    pub fn is_reference(&self) -> bool {
        matches!(self, TypeNode::Reference(_))
    }

    /// Ids this node links to, in declaration order
    pub fn successors(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            TypeNode::Group(g) => out.extend(g.sequence.iter().map(|p| p.term)),
            TypeNode::Element(e) => {
                out.extend(e.type_ref);
                out.extend(e.substitution_group);
            }
            TypeNode::ComplexType(t) => {
                out.extend(t.base);
                out.extend(t.members.iter().map(|p| p.term));
                out.extend(t.attributes.iter().copied());
            }
            TypeNode::SimpleType(t) => {
                out.extend(t.base);
                out.extend(t.members.iter().copied());
            }
            TypeNode::Attribute(a) => out.extend(a.type_ref),
            TypeNode::Reference(r) => out.extend(r.resolved),
            TypeNode::Builtin(_) | TypeNode::Any(_) | TypeNode::Pending => {}
        }
        out
    }

    /// Mutable access to every outgoing link slot
    pub(crate) fn link_slots_mut(&mut self) -> Vec<&mut NodeId> {
        let mut out: Vec<&mut NodeId> = Vec::new();
        match self {
            TypeNode::Group(g) => out.extend(g.sequence.iter_mut().map(|p| &mut p.term)),
            TypeNode::Element(e) => {
                out.extend(e.type_ref.as_mut());
                out.extend(e.substitution_group.as_mut());
            }
            TypeNode::ComplexType(t) => {
                out.extend(t.base.as_mut());
                out.extend(t.members.iter_mut().map(|p| &mut p.term));
                out.extend(t.attributes.iter_mut());
            }
            TypeNode::SimpleType(t) => {
                out.extend(t.base.as_mut());
                out.extend(t.members.iter_mut());
            }
            TypeNode::Attribute(a) => out.extend(a.type_ref.as_mut()),
            TypeNode::Reference(_)
            | TypeNode::Builtin(_)
            | TypeNode::Any(_)
            | TypeNode::Pending => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_kind_from_tag() {
        assert_eq!(DeclarationKind::from_tag("group"), Some(DeclarationKind::Group));
        assert_eq!(DeclarationKind::from_tag("simpleType"), Some(DeclarationKind::Type));
        assert_eq!(DeclarationKind::from_tag("complexType"), Some(DeclarationKind::Type));
        assert_eq!(DeclarationKind::from_tag("import"), None);
    }

    #[test]
    fn test_successors_and_slots_agree() {
        let mut group = XsdGroup::named(QName::local("G"), ModelType::Sequence);
        group.push(Particle::new(NodeId::new(3), Occurs::once()));
        group.push(Particle::new(NodeId::new(5), Occurs::optional()));
        let mut node = TypeNode::Group(group);

        assert_eq!(node.successors(), vec![NodeId::new(3), NodeId::new(5)]);

        for slot in node.link_slots_mut() {
            *slot = NodeId::new(slot.index() + 10);
        }
        assert_eq!(node.successors(), vec![NodeId::new(13), NodeId::new(15)]);
    }

    #[test]
    fn test_node_names() {
        let node = TypeNode::Builtin(BuiltinType::new("string"));
        assert_eq!(node.name(), Some("string"));
        assert_eq!(node.kind_name(), "builtin");
        assert!(TypeNode::Pending.qualified_name().is_none());
    }
}
