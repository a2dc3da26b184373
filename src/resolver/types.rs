//! Complex and simple type resolution

use super::groups::{resolve_group_reference, resolve_members, resolve_nested_compositor};
use super::{
    attributes, boolean, link, link_attribute, malformed, parse_occurs, report, xsd_attrs,
    xsd_elements, Scope,
};
use crate::diagnostics::Diagnostic;
use crate::documents::Element;
use crate::model::{
    ContentKind, DeclarationKind, Derivation, Facet, ModelType, NodeId, Occurs, SimpleVariety,
    TypeNode, XsdComplexType, XsdSimpleType,
};
use crate::namespaces::XSD_NAMESPACE;
use crate::registry::SchemaRegistry;

/// Build a `<complexType>`
///
/// `named` is false for inline (anonymous) types.
pub(crate) fn resolve_complex_type(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    named: bool,
) -> Result<XsdComplexType, Diagnostic> {
    let qualified_name = if named {
        Some(scope.qualify(scope.required_name(element)?))
    } else {
        None
    };

    let mut ty = XsdComplexType::new(qualified_name);
    ty.location = scope.location(element);
    ty.mixed = boolean(registry, scope, element, xsd_attrs::MIXED);
    ty.is_abstract = boolean(registry, scope, element, xsd_attrs::ABSTRACT);

    let mut simple_content = false;
    for child in element.child_elements() {
        if apply_content_child(registry, scope, child, &mut ty) {
            continue;
        }
        if child.is_xsd(xsd_elements::COMPLEX_CONTENT) {
            if boolean(registry, scope, child, xsd_attrs::MIXED) {
                ty.mixed = true;
            }
            resolve_derivation(registry, scope, child, &mut ty)?;
        } else if child.is_xsd(xsd_elements::SIMPLE_CONTENT) {
            simple_content = true;
            resolve_derivation(registry, scope, child, &mut ty)?;
        } else {
            malformed(registry, scope, element, child);
        }
    }

    ty.content = if simple_content {
        ContentKind::Simple
    } else if ty.mixed {
        ContentKind::Mixed
    } else if ty.members.is_empty() {
        ContentKind::Empty
    } else {
        ContentKind::ElementOnly
    };

    Ok(ty)
}

/// Handle a child shared by `complexType` and its derivations
///
/// Returns false when the child is not content or attribute material.
fn apply_content_child(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    child: &Element,
    ty: &mut XsdComplexType,
) -> bool {
    if child.namespace() != Some(XSD_NAMESPACE) {
        return false;
    }

    match child.local_name() {
        xsd_elements::ANNOTATION => true,
        xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
            let model = ModelType::from_qname(&child.qname).unwrap_or_default();
            let occurs = parse_occurs(registry, scope, child);
            if occurs == Occurs::once() {
                ty.content_model = model;
                let members = resolve_members(registry, scope, child);
                ty.members.extend(members);
            } else {
                let particle = resolve_nested_compositor(registry, scope, child, occurs);
                ty.members.push(particle);
            }
            true
        }
        xsd_elements::GROUP => {
            match resolve_group_reference(registry, scope, child) {
                Ok(particle) => ty.members.push(particle),
                Err(diagnostic) => registry.diagnostics.push(diagnostic),
            }
            true
        }
        xsd_elements::ATTRIBUTE => {
            match attributes::resolve_attribute_use(registry, scope, child) {
                Ok(id) => ty.attributes.push(id),
                Err(diagnostic) => registry.diagnostics.push(diagnostic),
            }
            true
        }
        xsd_elements::ATTRIBUTE_GROUP | xsd_elements::ANY_ATTRIBUTE => {
            tracing::debug!(element = child.local_name(), "skipping attribute wildcard or group");
            true
        }
        _ => false,
    }
}

/// `extension`/`restriction` inside `complexContent` or `simpleContent`
fn resolve_derivation(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    content: &Element,
    ty: &mut XsdComplexType,
) -> Result<(), Diagnostic> {
    for child in content.child_elements() {
        if child.is_xsd(xsd_elements::ANNOTATION) {
            continue;
        }
        let derivation = if child.namespace() == Some(XSD_NAMESPACE) {
            Derivation::from_tag(child.local_name())
        } else {
            None
        };
        let Some(derivation) = derivation else {
            malformed(registry, scope, content, child);
            continue;
        };

        if child.string_attribute(xsd_attrs::BASE).is_none() {
            return Err(scope.attach(Diagnostic::missing_attribute(
                child.local_name(),
                xsd_attrs::BASE,
                scope.location(child),
            )));
        }
        ty.derivation = Some(derivation);
        ty.base = link_attribute(registry, scope, child, xsd_attrs::BASE, DeclarationKind::Type);

        for grandchild in child.child_elements() {
            if apply_content_child(registry, scope, grandchild, ty) {
                continue;
            }
            // simpleContent restrictions carry facets and an optional inline base
            let is_facet = grandchild.namespace() == Some(XSD_NAMESPACE)
                && (grandchild.string_attribute(xsd_attrs::VALUE).is_some()
                    || grandchild.local_name() == xsd_elements::SIMPLE_TYPE);
            if !is_facet {
                malformed(registry, scope, child, grandchild);
            }
        }
    }
    Ok(())
}

/// Build a `<simpleType>`
pub(crate) fn resolve_simple_type(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    named: bool,
) -> Result<XsdSimpleType, Diagnostic> {
    let qualified_name = if named {
        Some(scope.qualify(scope.required_name(element)?))
    } else {
        None
    };

    let mut ty = XsdSimpleType::new(qualified_name);
    ty.location = scope.location(element);

    for child in element.child_elements() {
        if child.namespace() != Some(XSD_NAMESPACE) {
            continue;
        }
        match child.local_name() {
            xsd_elements::ANNOTATION => {}
            xsd_elements::RESTRICTION => {
                ty.variety = SimpleVariety::Atomic;
                ty.base = derived_from(registry, scope, child, xsd_attrs::BASE);
                ty.restrictions = child
                    .child_elements()
                    .filter(|f| f.namespace() == Some(XSD_NAMESPACE))
                    .filter(|f| !matches!(f.local_name(), xsd_elements::ANNOTATION | xsd_elements::SIMPLE_TYPE))
                    .filter_map(|f| {
                        f.string_attribute(xsd_attrs::VALUE)
                            .map(|value| Facet::new(f.local_name(), value))
                    })
                    .collect();
            }
            xsd_elements::LIST => {
                ty.variety = SimpleVariety::List;
                ty.base = derived_from(registry, scope, child, xsd_attrs::ITEM_TYPE);
            }
            xsd_elements::UNION => {
                ty.variety = SimpleVariety::Union;
                ty.members = union_members(registry, scope, child);
            }
            other => tracing::debug!(element = other, "ignoring simpleType child"),
        }
    }

    Ok(ty)
}

/// Base of a restriction or item type of a list: attribute or inline type
fn derived_from(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    attribute: &str,
) -> Option<NodeId> {
    if element.string_attribute(attribute).is_some() {
        return link_attribute(registry, scope, element, attribute, DeclarationKind::Type);
    }
    if element.find_xsd_child(xsd_elements::SIMPLE_TYPE).is_some() {
        return inline_simple_type(registry, scope, element);
    }
    let diagnostic = Diagnostic::missing_attribute(
        element.local_name(),
        attribute,
        scope.location(element),
    );
    report(registry, scope, diagnostic);
    None
}

fn union_members(registry: &mut SchemaRegistry, scope: &Scope, element: &Element) -> Vec<NodeId> {
    let mut members = Vec::new();

    if let Some(value) = element.string_attribute(xsd_attrs::MEMBER_TYPES) {
        for token in value.split_whitespace() {
            match scope.resolve_qname(element, xsd_attrs::MEMBER_TYPES, token) {
                Ok(name) => members.push(link(
                    registry,
                    scope,
                    DeclarationKind::Type,
                    name,
                    scope.location(element),
                )),
                Err(diagnostic) => registry.diagnostics.push(diagnostic),
            }
        }
    }

    for inline in element
        .child_elements()
        .filter(|c| c.is_xsd(xsd_elements::SIMPLE_TYPE))
    {
        match resolve_simple_type(registry, scope, inline, false) {
            Ok(ty) => members.push(registry.graph.push(TypeNode::SimpleType(ty))),
            Err(diagnostic) => registry.diagnostics.push(diagnostic),
        }
    }

    members
}

/// The anonymous `<simpleType>` child of `parent`, built and stored
pub(crate) fn inline_simple_type(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    parent: &Element,
) -> Option<NodeId> {
    let inline = parent.find_xsd_child(xsd_elements::SIMPLE_TYPE)?;
    match resolve_simple_type(registry, scope, inline, false) {
        Ok(ty) => Some(registry.graph.push(TypeNode::SimpleType(ty))),
        Err(diagnostic) => {
            registry.diagnostics.push(diagnostic);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ResolverOptions;
    use crate::diagnostics::DiagnosticKind;
    use crate::documents::Document;
    use crate::model::{
        ContentKind, DeclarationKind, Derivation, ModelType, Occurs, SimpleVariety, TypeGraph,
        TypeNode,
    };
    use crate::namespaces::QName;
    use crate::registry::SchemaRegistry;

    const SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:complexType name="Base">
    <xs:sequence>
      <xs:element name="id" type="xs:int"/>
    </xs:sequence>
    <xs:attribute name="version" type="xs:string" use="required"/>
  </xs:complexType>
  <xs:complexType name="Derived">
    <xs:complexContent>
      <xs:extension base="t:Base">
        <xs:sequence>
          <xs:element name="label" type="xs:string"/>
        </xs:sequence>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>
  <xs:complexType name="Price">
    <xs:simpleContent>
      <xs:extension base="xs:decimal">
        <xs:attribute name="currency" type="t:Currency"/>
      </xs:extension>
    </xs:simpleContent>
  </xs:complexType>
  <xs:complexType name="Repeated">
    <xs:choice maxOccurs="unbounded">
      <xs:element name="a" type="xs:string"/>
      <xs:element name="b" type="xs:string"/>
    </xs:choice>
  </xs:complexType>
  <xs:simpleType name="Currency">
    <xs:restriction base="xs:string">
      <xs:enumeration value="EUR"/>
      <xs:enumeration value="USD"/>
      <xs:length value="3"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:simpleType name="Codes">
    <xs:list itemType="t:Currency"/>
  </xs:simpleType>
  <xs:simpleType name="IntOrCode">
    <xs:union memberTypes="xs:int t:Currency">
      <xs:simpleType><xs:restriction base="xs:token"/></xs:simpleType>
    </xs:union>
  </xs:simpleType>
</xs:schema>"#;

    fn resolve(name: &str) -> (SchemaRegistry, crate::model::NodeId) {
        let mut registry = SchemaRegistry::new(ResolverOptions::default());
        registry.register(&Document::from_string(SCHEMA).unwrap()).unwrap();
        let id = registry
            .resolved_node(DeclarationKind::Type, &QName::namespaced("urn:t", name))
            .unwrap();
        (registry, id)
    }

    fn name_of(graph: &TypeGraph, id: crate::model::NodeId) -> Option<String> {
        graph[id].name().map(str::to_string)
    }

    #[test]
    fn test_complex_type_with_attributes() {
        let (registry, id) = resolve("Base");
        let graph = registry.graph();
        let ty = graph[id].as_complex_type().unwrap();
        assert_eq!(ty.content, ContentKind::ElementOnly);
        assert_eq!(ty.content_model, ModelType::Sequence);
        assert_eq!(ty.members.len(), 1);
        assert_eq!(ty.attributes.len(), 1);
        assert!(graph[ty.attributes[0]].as_attribute().unwrap().is_required());
    }

    #[test]
    fn test_complex_content_extension() {
        let (registry, id) = resolve("Derived");
        let graph = registry.graph();
        let ty = graph[id].as_complex_type().unwrap();
        assert_eq!(ty.derivation, Some(Derivation::Extension));
        assert_eq!(name_of(graph, ty.base.unwrap()).as_deref(), Some("Base"));
        assert_eq!(ty.members.len(), 1);
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn test_simple_content_extension() {
        let (registry, id) = resolve("Price");
        let graph = registry.graph();
        let ty = graph[id].as_complex_type().unwrap();
        assert_eq!(ty.content, ContentKind::Simple);
        assert_eq!(name_of(graph, ty.base.unwrap()).as_deref(), Some("decimal"));
        let currency = graph[ty.attributes[0]].as_attribute().unwrap();
        assert_eq!(
            name_of(graph, currency.type_ref.unwrap()).as_deref(),
            Some("Currency")
        );
    }

    #[test]
    fn test_repeated_top_compositor_is_wrapped() {
        let (registry, id) = resolve("Repeated");
        let graph = registry.graph();
        let ty = graph[id].as_complex_type().unwrap();
        assert_eq!(ty.members.len(), 1);
        assert_eq!(ty.members[0].occurs, Occurs::new(1, None));
        let inner = graph[ty.members[0].term].as_group().unwrap();
        assert_eq!(inner.compositor, ModelType::Choice);
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_simple_type_restriction_facets() {
        let (registry, id) = resolve("Currency");
        let ty = registry.graph()[id].as_simple_type().unwrap();
        assert_eq!(ty.variety, SimpleVariety::Atomic);
        assert_eq!(ty.enumeration(), vec!["EUR", "USD"]);
        assert_eq!(ty.restrictions.len(), 3);
    }

    #[test]
    fn test_list_and_union() {
        let (registry, id) = resolve("Codes");
        let graph = registry.graph();
        let list = graph[id].as_simple_type().unwrap();
        assert_eq!(list.variety, SimpleVariety::List);
        assert_eq!(name_of(graph, list.base.unwrap()).as_deref(), Some("Currency"));

        let (registry, id) = resolve("IntOrCode");
        let graph = registry.graph();
        let union = graph[id].as_simple_type().unwrap();
        assert_eq!(union.variety, SimpleVariety::Union);
        assert_eq!(union.members.len(), 3);
        assert!(matches!(graph[union.members[2]], TypeNode::SimpleType(_)));
    }

    #[test]
    fn test_derivation_without_base() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:complexType name="Broken">
    <xs:complexContent><xs:extension/></xs:complexContent>
  </xs:complexType>
</xs:schema>"#;
        let mut registry = SchemaRegistry::new(ResolverOptions::default());
        registry.register(&Document::from_string(xml).unwrap()).unwrap();
        let result =
            registry.resolved_node(DeclarationKind::Type, &QName::namespaced("urn:t", "Broken"));
        assert!(matches!(result, Err(crate::Error::Diagnostic(_))));
        assert_eq!(
            registry
                .diagnostics()
                .of_kind(DiagnosticKind::MissingRequiredAttribute)
                .count(),
            1
        );
    }
}
