//! Group and compositor resolution
//!
//! A top-level `<group name>` is a definition; a `<group ref>` inside a
//! content model is always a use of one and becomes a particle linking to the
//! shared definition, carrying the use site's occurrence bounds.

use super::{elements, link, malformed, parse_occurs, report, xsd_attrs, xsd_elements, Scope};
use crate::diagnostics::Diagnostic;
use crate::documents::Element;
use crate::model::{
    DeclarationKind, ModelType, Occurs, Particle, ProcessContents, TypeNode, XsdAnyElement,
    XsdGroup,
};
use crate::namespaces::XSD_NAMESPACE;
use crate::registry::SchemaRegistry;

/// Build a named `<group>` definition
///
/// The members of its compositor become the group's sequence, in document
/// order. A group without a compositor is an empty sequence.
pub(crate) fn resolve_group_definition(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
) -> Result<XsdGroup, Diagnostic> {
    let name = scope.required_name(element)?;

    let mut group = XsdGroup::named(scope.qualify(name), ModelType::Sequence);
    group.location = scope.location(element);

    let mut compositor_seen = false;
    for child in element.child_elements() {
        if child.is_xsd(xsd_elements::ANNOTATION) {
            continue;
        }
        match ModelType::from_qname(&child.qname) {
            Some(model) if !compositor_seen => {
                compositor_seen = true;
                group.compositor = model;
                group.sequence = resolve_members(registry, scope, child);
            }
            _ => malformed(registry, scope, element, child),
        }
    }

    tracing::trace!(group = name, compositor = %group.compositor, members = group.len(), "resolved group");
    Ok(group)
}

/// A `<group ref>` particle
pub(crate) fn resolve_group_reference(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
) -> Result<Particle, Diagnostic> {
    let Some(value) = element.string_attribute(xsd_attrs::REF) else {
        return Err(scope.attach(Diagnostic::missing_attribute(
            xsd_elements::GROUP,
            xsd_attrs::REF,
            scope.location(element),
        )));
    };
    let name = scope.resolve_qname(element, xsd_attrs::REF, value)?;
    let occurs = parse_occurs(registry, scope, element);
    let id = link(registry, scope, DeclarationKind::Group, name, scope.location(element));
    Ok(Particle::new(id, occurs))
}

/// Members of a `sequence`/`choice`/`all`, in document order
pub(crate) fn resolve_members(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    compositor: &Element,
) -> Vec<Particle> {
    let mut members = Vec::new();

    for child in compositor.child_elements() {
        if child.namespace() != Some(XSD_NAMESPACE) {
            malformed(registry, scope, compositor, child);
            continue;
        }

        let particle = match child.local_name() {
            xsd_elements::ANNOTATION => continue,
            xsd_elements::ELEMENT => elements::resolve_element_particle(registry, scope, child),
            xsd_elements::GROUP => resolve_group_reference(registry, scope, child),
            xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL => {
                let occurs = parse_occurs(registry, scope, child);
                Ok(resolve_nested_compositor(registry, scope, child, occurs))
            }
            xsd_elements::ANY => Ok(resolve_wildcard(registry, scope, child)),
            _ => {
                malformed(registry, scope, compositor, child);
                continue;
            }
        };

        match particle {
            Ok(particle) => members.push(particle),
            Err(diagnostic) => registry.diagnostics.push(diagnostic),
        }
    }

    members
}

/// A compositor nested in another one, as an anonymous group
pub(crate) fn resolve_nested_compositor(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    occurs: Occurs,
) -> Particle {
    let compositor = ModelType::from_qname(&element.qname).unwrap_or_default();
    let mut group = XsdGroup::new(compositor);
    group.occurs = occurs;
    group.location = scope.location(element);
    group.sequence = resolve_members(registry, scope, element);

    let id = registry.graph.push(TypeNode::Group(group));
    Particle::new(id, occurs)
}

fn resolve_wildcard(registry: &mut SchemaRegistry, scope: &Scope, element: &Element) -> Particle {
    let occurs = parse_occurs(registry, scope, element);

    let process_contents = match element.string_attribute(xsd_attrs::PROCESS_CONTENTS) {
        None => ProcessContents::default(),
        Some(value) => value.parse::<ProcessContents>().unwrap_or_else(|_| {
            let diagnostic = Diagnostic::invalid_value(
                xsd_attrs::PROCESS_CONTENTS,
                value,
                "'strict', 'lax' or 'skip'",
                scope.location(element),
            );
            report(registry, scope, diagnostic);
            ProcessContents::default()
        }),
    };

    let any = XsdAnyElement {
        namespace: element
            .string_attribute(xsd_attrs::NAMESPACE)
            .unwrap_or("##any")
            .to_string(),
        process_contents,
        location: scope.location(element),
    };
    Particle::new(registry.graph.push(TypeNode::Any(any)), occurs)
}

#[cfg(test)]
mod tests {
    use crate::config::ResolverOptions;
    use crate::diagnostics::DiagnosticKind;
    use crate::documents::Document;
    use crate::model::{DeclarationKind, ModelType, Occurs, TypeNode};
    use crate::namespaces::QName;
    use crate::registry::SchemaRegistry;

    fn build(xml: &str, name: &str) -> (SchemaRegistry, crate::model::NodeId) {
        let mut registry = SchemaRegistry::new(ResolverOptions::default());
        registry.register(&Document::from_string(xml).unwrap()).unwrap();
        let id = registry
            .resolved_node(DeclarationKind::Group, &QName::namespaced("urn:t", name))
            .unwrap();
        (registry, id)
    }

    #[test]
    fn test_empty_compositor_is_empty_group() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="Nothing"><xs:choice/></xs:group>
</xs:schema>"#;
        let (registry, id) = build(xml, "Nothing");
        let group = registry.graph()[id].as_group().unwrap();
        assert!(group.is_empty());
        assert_eq!(group.compositor, ModelType::Choice);
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn test_nested_compositor_becomes_anonymous_group() {
        let xml = r###"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:sequence>
      <xs:element name="id" type="xs:int"/>
      <xs:choice minOccurs="0">
        <xs:element name="email" type="xs:string"/>
        <xs:element name="phone" type="xs:string"/>
      </xs:choice>
      <xs:any namespace="##other" processContents="lax" maxOccurs="unbounded"/>
    </xs:sequence>
  </xs:group>
</xs:schema>"###;
        let (registry, id) = build(xml, "G");
        let graph = registry.graph();
        let group = graph[id].as_group().unwrap();
        assert_eq!(group.len(), 3);

        let nested = &group.sequence[1];
        assert_eq!(nested.occurs, Occurs::optional());
        let inner = graph[nested.term].as_group().unwrap();
        assert!(!inner.is_named());
        assert_eq!(inner.compositor, ModelType::Choice);
        assert_eq!(inner.len(), 2);

        match &graph[group.sequence[2].term] {
            TypeNode::Any(any) => assert_eq!(any.namespace, "##other"),
            other => panic!("expected wildcard, got {:?}", other),
        }
        assert_eq!(group.sequence[2].occurs, Occurs::one_or_more());
    }

    #[test]
    fn test_group_reference_without_ref() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:sequence>
      <xs:group/>
      <xs:element name="kept" type="xs:string"/>
    </xs:sequence>
  </xs:group>
</xs:schema>"#;
        let (registry, id) = build(xml, "G");
        assert_eq!(registry.graph()[id].as_group().unwrap().len(), 1);
        assert_eq!(
            registry
                .diagnostics()
                .of_kind(DiagnosticKind::MissingRequiredAttribute)
                .count(),
            1
        );
    }

    #[test]
    fn test_second_compositor_is_malformed() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:annotation/>
    <xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence>
    <xs:choice/>
  </xs:group>
</xs:schema>"#;
        let (registry, id) = build(xml, "G");
        assert_eq!(registry.graph()[id].as_group().unwrap().len(), 1);
        assert_eq!(
            registry
                .diagnostics()
                .of_kind(DiagnosticKind::MalformedCompositor)
                .count(),
            1
        );
    }
}
