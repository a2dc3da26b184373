//! Attribute declaration resolution

use super::{form, link, link_attribute, report, types, xsd_attrs, Scope};
use crate::diagnostics::Diagnostic;
use crate::documents::Element;
use crate::model::builtins::XSD_ANY_SIMPLE_TYPE;
use crate::model::{AttributeUse, DeclarationKind, NodeId, TypeNode, XsdAttribute};
use crate::namespaces::QName;
use crate::registry::SchemaRegistry;

/// An `<attribute>` inside a complex type: a local declaration or a `ref`
pub(crate) fn resolve_attribute_use(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
) -> Result<NodeId, Diagnostic> {
    if let Some(value) = element.string_attribute(xsd_attrs::REF) {
        let name = scope.resolve_qname(element, xsd_attrs::REF, value)?;
        return Ok(link(
            registry,
            scope,
            DeclarationKind::Attribute,
            name,
            scope.location(element),
        ));
    }

    let attribute = resolve_attribute(registry, scope, element, false)?;
    Ok(registry.graph.push(TypeNode::Attribute(attribute)))
}

/// Build an attribute declaration
pub(crate) fn resolve_attribute(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    global: bool,
) -> Result<XsdAttribute, Diagnostic> {
    let name = scope.required_name(element)?;

    let qualified_name = if global || form(registry, scope, element, scope.attribute_form).is_qualified() {
        scope.qualify(name)
    } else {
        QName::local(name)
    };

    let mut attribute = XsdAttribute::new(qualified_name);
    attribute.location = scope.location(element);
    attribute.default = element.string_attribute(xsd_attrs::DEFAULT).map(str::to_string);
    attribute.fixed = element.string_attribute(xsd_attrs::FIXED).map(str::to_string);

    if let Some(value) = element.string_attribute(xsd_attrs::USE) {
        match value.parse::<AttributeUse>() {
            Ok(use_mode) => attribute.use_mode = use_mode,
            Err(_) => {
                let diagnostic = Diagnostic::invalid_value(
                    xsd_attrs::USE,
                    value,
                    "'optional', 'required' or 'prohibited'",
                    scope.location(element),
                );
                report(registry, scope, diagnostic);
            }
        }
    }

    attribute.type_ref = if element.string_attribute(xsd_attrs::TYPE).is_some() {
        link_attribute(registry, scope, element, xsd_attrs::TYPE, DeclarationKind::Type)
    } else {
        types::inline_simple_type(registry, scope, element)
            .or_else(|| Some(registry.graph.builtin(XSD_ANY_SIMPLE_TYPE)))
    };

    Ok(attribute)
}
