//! Element declaration resolution

use super::{boolean, form, link, link_attribute, parse_occurs, report, types, xsd_attrs, xsd_elements, Scope};
use crate::diagnostics::Diagnostic;
use crate::documents::Element;
use crate::model::builtins::XSD_ANY_TYPE;
use crate::model::{DeclarationKind, ElementScope, NodeId, Particle, TypeNode, XsdElement};
use crate::namespaces::QName;
use crate::registry::SchemaRegistry;

/// An `<element>` inside a compositor: a local declaration or a `ref`
pub(crate) fn resolve_element_particle(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
) -> Result<Particle, Diagnostic> {
    let occurs = parse_occurs(registry, scope, element);

    if let Some(value) = element.string_attribute(xsd_attrs::REF) {
        let name = scope.resolve_qname(element, xsd_attrs::REF, value)?;
        let id = link(registry, scope, DeclarationKind::Element, name, scope.location(element));
        return Ok(Particle::new(id, occurs));
    }

    let mut local = resolve_element(registry, scope, element, ElementScope::Local)?;
    local.occurs = occurs;
    let id = registry.graph.push(TypeNode::Element(local));
    Ok(Particle::new(id, occurs))
}

/// Build an element declaration
///
/// Global names are always in the target namespace; local names only when
/// `form` (or the schema's `elementFormDefault`) is `qualified`.
pub(crate) fn resolve_element(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    element_scope: ElementScope,
) -> Result<XsdElement, Diagnostic> {
    let name = scope.required_name(element)?;

    let qualified_name = match element_scope {
        ElementScope::Global => scope.qualify(name),
        ElementScope::Local => {
            if form(registry, scope, element, scope.element_form).is_qualified() {
                scope.qualify(name)
            } else {
                QName::local(name)
            }
        }
    };

    let mut declaration = XsdElement::new(qualified_name, element_scope);
    declaration.location = scope.location(element);
    declaration.nillable = boolean(registry, scope, element, xsd_attrs::NILLABLE);
    declaration.is_abstract = boolean(registry, scope, element, xsd_attrs::ABSTRACT);
    declaration.default = element.string_attribute(xsd_attrs::DEFAULT).map(str::to_string);
    declaration.fixed = element.string_attribute(xsd_attrs::FIXED).map(str::to_string);
    declaration.substitution_group = link_attribute(
        registry,
        scope,
        element,
        xsd_attrs::SUBSTITUTION_GROUP,
        DeclarationKind::Element,
    );
    declaration.type_ref = resolve_element_type(registry, scope, element);

    Ok(declaration)
}

fn resolve_element_type(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
) -> Option<NodeId> {
    if element.string_attribute(xsd_attrs::TYPE).is_some() {
        return link_attribute(registry, scope, element, xsd_attrs::TYPE, DeclarationKind::Type);
    }

    if let Some(inline) = element.find_xsd_child(xsd_elements::COMPLEX_TYPE) {
        return match types::resolve_complex_type(registry, scope, inline, false) {
            Ok(ty) => Some(registry.graph.push(TypeNode::ComplexType(ty))),
            Err(diagnostic) => {
                report(registry, scope, diagnostic);
                None
            }
        };
    }

    if element.find_xsd_child(xsd_elements::SIMPLE_TYPE).is_some() {
        return types::inline_simple_type(registry, scope, element);
    }

    Some(registry.graph.builtin(XSD_ANY_TYPE))
}
