//! Graph export
//!
//! Flattens a [`ResolvedGraph`] into plain serializable records for tooling
//! and snapshot tests. Names are written in Clark notation (`{ns}local`).
//! Named constructs are referenced by name only, so cycles never expand.

use serde::Serialize;

use crate::error::Result;
use crate::model::{Facet, ModelType, NodeId, Particle, TypeNode};
use crate::resolver::ResolvedGraph;

/// Serializable view of a resolved graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphDump {
    /// Target namespaces of the resolved schemas
    pub namespaces: Vec<Option<String>>,
    /// Named group definitions
    pub groups: Vec<GroupDump>,
    /// Global element declarations
    pub elements: Vec<ElementDump>,
    /// Named complex types
    pub complex_types: Vec<ComplexTypeDump>,
    /// Named simple types
    pub simple_types: Vec<SimpleTypeDump>,
    /// Warnings recorded while resolving
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A named group
#[derive(Debug, Clone, Serialize)]
pub struct GroupDump {
    /// Local name
    pub name: String,
    /// `{ns}name`
    pub qualified_name: String,
    /// Compositor of the member sequence
    pub compositor: ModelType,
    /// Whether the group contains itself
    pub recursive: bool,
    /// Members in document order
    pub members: Vec<MemberDump>,
}

/// One member of a group or content model
#[derive(Debug, Clone, Serialize)]
pub struct MemberDump {
    /// Node kind (`element`, `group`, `any`, ...)
    pub kind: &'static str,
    /// Member name, absent for anonymous compositors and wildcards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Element type name
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// `minOccurs`
    pub min: u32,
    /// `maxOccurs`, absent when unbounded
    pub max: Option<u32>,
    /// Compositor of an anonymous nested group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compositor: Option<ModelType>,
    /// Members of an anonymous nested group
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberDump>,
}

/// A global element
#[derive(Debug, Clone, Serialize)]
pub struct ElementDump {
    /// `{ns}name`
    pub qualified_name: String,
    /// Type name
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// `nillable`
    pub nillable: bool,
    /// `abstract`
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Substitution group head
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_group: Option<String>,
    /// Elements that may substitute for this one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub substitutes: Vec<String>,
}

/// A named complex type
#[derive(Debug, Clone, Serialize)]
pub struct ComplexTypeDump {
    /// `{ns}name`
    pub qualified_name: String,
    /// Content kind (`empty`, `simple`, `mixed`, `element-only`)
    pub content: String,
    /// Compositor of the top-level content model
    pub content_model: ModelType,
    /// Base type of a derivation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// `extension` or `restriction`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
    /// Whether the type contains itself
    pub recursive: bool,
    /// Content members in document order
    pub members: Vec<MemberDump>,
    /// Attribute uses
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDump>,
}

/// An attribute use of a complex type
#[derive(Debug, Clone, Serialize)]
pub struct AttributeDump {
    /// Attribute name
    pub name: String,
    /// Type name
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// `optional`, `required` or `prohibited`
    #[serde(rename = "use")]
    pub use_mode: &'static str,
}

/// A named simple type
#[derive(Debug, Clone, Serialize)]
pub struct SimpleTypeDump {
    /// `{ns}name`
    pub qualified_name: String,
    /// `atomic`, `list` or `union`
    pub variety: String,
    /// Restriction base or list item type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Union member types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Constraining facets
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
}

impl GraphDump {
    /// Flatten a resolved graph
    pub fn from_graph(graph: &ResolvedGraph) -> Self {
        let mut dump = GraphDump {
            namespaces: graph.namespaces().to_vec(),
            warnings: graph.diagnostics().iter().map(ToString::to_string).collect(),
            ..Default::default()
        };

        for (_, name, id) in graph.declarations() {
            let Some(node) = graph.node(id) else { continue };
            match node {
                TypeNode::Group(group) => dump.groups.push(GroupDump {
                    name: name.local_name.clone(),
                    qualified_name: name.to_string(),
                    compositor: group.compositor,
                    recursive: graph.is_recursive(id),
                    members: members(graph, &group.sequence),
                }),
                TypeNode::Element(element) => dump.elements.push(ElementDump {
                    qualified_name: name.to_string(),
                    type_name: element.type_ref.map(|t| type_name(graph, t)),
                    nillable: element.nillable,
                    is_abstract: element.is_abstract,
                    substitution_group: element.substitution_group.map(|h| type_name(graph, h)),
                    substitutes: graph
                        .substitutes(id)
                        .iter()
                        .map(|&s| type_name(graph, s))
                        .collect(),
                }),
                TypeNode::ComplexType(ty) => dump.complex_types.push(ComplexTypeDump {
                    qualified_name: name.to_string(),
                    content: ty.content.to_string(),
                    content_model: ty.content_model,
                    base: ty.base.map(|b| type_name(graph, b)),
                    derivation: ty.derivation.map(|d| d.to_string()),
                    recursive: graph.is_recursive(id),
                    members: members(graph, &ty.members),
                    attributes: ty
                        .attributes
                        .iter()
                        .filter_map(|&a| graph.node(a)?.as_attribute())
                        .map(|a| AttributeDump {
                            name: a.qualified_name.to_string(),
                            type_name: a.type_ref.map(|t| type_name(graph, t)),
                            use_mode: a.use_mode.as_str(),
                        })
                        .collect(),
                }),
                TypeNode::SimpleType(ty) => dump.simple_types.push(SimpleTypeDump {
                    qualified_name: name.to_string(),
                    variety: ty.variety.to_string(),
                    base: ty.base.map(|b| type_name(graph, b)),
                    members: ty.members.iter().map(|&m| type_name(graph, m)).collect(),
                    facets: ty.restrictions.clone(),
                }),
                _ => {}
            }
        }
        dump
    }

    /// Group entry by local name
    pub fn group(&self, name: &str) -> Option<&GroupDump> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Serialize to JSON
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

fn members(graph: &ResolvedGraph, particles: &[Particle]) -> Vec<MemberDump> {
    particles
        .iter()
        .filter_map(|particle| {
            let node = graph.node(particle.term)?;
            let mut member = MemberDump {
                kind: node.kind_name(),
                name: node.qualified_name().map(ToString::to_string),
                type_name: None,
                min: particle.occurs.min,
                max: particle.occurs.max,
                compositor: None,
                members: Vec::new(),
            };
            match node {
                TypeNode::Element(element) => {
                    member.type_name = element.type_ref.map(|t| type_name(graph, t));
                }
                // anonymous groups are trees; named ones are referenced by name
                TypeNode::Group(group) if !group.is_named() => {
                    member.compositor = Some(group.compositor);
                    member.members = members(graph, &group.sequence);
                }
                TypeNode::Any(any) => member.name = Some(any.namespace.clone()),
                _ => {}
            }
            Some(member)
        })
        .collect()
}

fn type_name(graph: &ResolvedGraph, id: NodeId) -> String {
    match graph.node(id) {
        Some(node) => match node.qualified_name() {
            Some(name) => name.to_string(),
            None => format!("(anonymous {})", node.kind_name()),
        },
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverOptions;
    use crate::documents::Document;
    use crate::registry::SchemaRegistry;

    fn dump(xml: &str) -> GraphDump {
        let mut registry = SchemaRegistry::new(ResolverOptions::default());
        registry.register(&Document::from_string(xml).unwrap()).unwrap();
        GraphDump::from_graph(&registry.resolve_all().unwrap())
    }

    #[test]
    fn test_dump_group_members() {
        let dump = dump(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="Addr">
    <xs:sequence>
      <xs:element name="street" type="xs:string"/>
      <xs:choice minOccurs="0">
        <xs:element name="zip" type="xs:string"/>
        <xs:any/>
      </xs:choice>
    </xs:sequence>
  </xs:group>
</xs:schema>"#,
        );
        let addr = dump.group("Addr").unwrap();
        assert_eq!(addr.qualified_name, "{urn:t}Addr");
        assert!(!addr.recursive);
        assert_eq!(addr.members.len(), 2);
        assert_eq!(addr.members[0].kind, "element");
        assert_eq!(addr.members[0].name.as_deref(), Some("street"));
        assert_eq!(
            addr.members[0].type_name.as_deref(),
            Some("{http://www.w3.org/2001/XMLSchema}string")
        );
        assert_eq!(addr.members[1].compositor, Some(ModelType::Choice));
        assert_eq!(addr.members[1].min, 0);
        assert_eq!(addr.members[1].members.len(), 2);
    }

    #[test]
    fn test_json_output() {
        let dump = dump(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:simpleType name="Code">
    <xs:restriction base="xs:string"><xs:maxLength value="4"/></xs:restriction>
  </xs:simpleType>
  <xs:complexType name="Node">
    <xs:sequence><xs:element name="next" type="t:Node" minOccurs="0"/></xs:sequence>
    <xs:attribute name="code" type="t:Code" use="required"/>
  </xs:complexType>
</xs:schema>"#,
        );
        let value: serde_json::Value = serde_json::from_str(&dump.to_json(false).unwrap()).unwrap();
        let node = &value["complex_types"][0];
        assert_eq!(node["qualified_name"], "{urn:t}Node");
        assert_eq!(node["recursive"], true);
        assert_eq!(node["content"], "element-only");
        assert_eq!(node["attributes"][0]["use"], "required");
        assert_eq!(node["attributes"][0]["type"], "{urn:t}Code");
        assert_eq!(value["simple_types"][0]["facets"][0]["name"], "maxLength");
        assert!(value.get("warnings").is_none());
    }
}
