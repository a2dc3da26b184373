//! Declaration resolvers
//!
//! One resolver function per node variant turns a raw declaration element
//! into a [`TypeNode`]. Problems local to a nested construct are recorded as
//! diagnostics and the construct is skipped, so the enclosing declaration is
//! still built; a resolver only returns `Err` when the construct it was
//! asked for cannot exist at all (no `name`, no `ref`).
//!
//! By-name links go through [`link`]: built-ins become shared nodes,
//! visible declarations are built eagerly (bounded by
//! `Limits::max_resolution_depth`), anything else becomes a placeholder
//! that [`resolve_all`] closes.

mod attributes;
mod elements;
mod groups;
mod pass;
mod types;

pub use pass::{resolve_all, Member, ResolvedGraph};

use std::sync::Arc;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::documents::Element;
use crate::locations::SourceLocation;
use crate::model::builtins::is_builtin;
use crate::model::{DeclarationKind, ElementScope, NodeId, Occurs, TypeNode, XsdReference};
use crate::namespaces::{QName, XSD_NAMESPACE};
use crate::registry::{Declaration, FormDefault, SchemaRegistry};

/// XSD element local names
pub(crate) mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const IMPORT: &str = "import";
    pub const INCLUDE: &str = "include";
    pub const REDEFINE: &str = "redefine";
    pub const RESTRICTION: &str = "restriction";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    pub const NOTATION: &str = "notation";
}

/// XSD attribute names
pub(crate) mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
    pub const FORM: &str = "form";
    pub const NILLABLE: &str = "nillable";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIXED: &str = "mixed";
    pub const ABSTRACT: &str = "abstract";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const NAMESPACE: &str = "namespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
    pub const PROCESS_CONTENTS: &str = "processContents";
}

/// Context of the top-level declaration being built
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    /// Effective target namespace of the declaring document
    pub target_namespace: Option<String>,
    document: Option<Arc<str>>,
    pub element_form: FormDefault,
    pub attribute_form: FormDefault,
    chameleon: bool,
    declaration: QName,
}

impl Scope {
    fn of(declaration: &Declaration) -> Self {
        Self {
            target_namespace: declaration.name.namespace.clone(),
            document: declaration.document.clone(),
            element_form: declaration.element_form,
            attribute_form: declaration.attribute_form,
            chameleon: declaration.chameleon,
            declaration: declaration.name.clone(),
        }
    }

    /// Source location of an element of the declaring document
    pub fn location(&self, element: &Element) -> SourceLocation {
        element.location(self.document.as_ref())
    }

    /// Name in the target namespace
    pub fn qualify(&self, local_name: &str) -> QName {
        QName::new(self.target_namespace.clone(), local_name)
    }

    /// Attach the declaration name unless the diagnostic already names one
    pub fn attach(&self, diagnostic: Diagnostic) -> Diagnostic {
        if diagnostic.declaration.is_some() {
            diagnostic
        } else {
            diagnostic.with_declaration(self.declaration.clone())
        }
    }

    /// Resolve a QName-valued attribute value
    ///
    /// Unqualified names in a chameleon-included document belong to the
    /// including schema's namespace.
    pub fn resolve_qname(
        &self,
        element: &Element,
        attribute: &str,
        value: &str,
    ) -> Result<QName, Diagnostic> {
        let name = element.resolve_qname(value).map_err(|_| {
            self.attach(Diagnostic::invalid_value(
                attribute,
                value,
                "a QName with a declared prefix",
                self.location(element),
            ))
        })?;
        if self.chameleon && name.namespace.is_none() {
            return Ok(self.qualify(&name.local_name));
        }
        Ok(name)
    }

    /// The `name` attribute, required on definitions and local declarations
    pub fn required_name<'e>(&self, element: &'e Element) -> Result<&'e str, Diagnostic> {
        element.string_attribute(xsd_attrs::NAME).ok_or_else(|| {
            self.attach(Diagnostic::missing_attribute(
                element.local_name(),
                xsd_attrs::NAME,
                self.location(element),
            ))
        })
    }
}

/// Build the node for a registered declaration
pub(crate) fn build_declaration(
    registry: &mut SchemaRegistry,
    declaration: &Declaration,
) -> Result<TypeNode, Diagnostic> {
    let scope = Scope::of(declaration);
    let element = &declaration.element;

    match declaration.kind {
        DeclarationKind::Group => {
            groups::resolve_group_definition(registry, &scope, element).map(TypeNode::Group)
        }
        DeclarationKind::Element => {
            elements::resolve_element(registry, &scope, element, ElementScope::Global)
                .map(TypeNode::Element)
        }
        DeclarationKind::Type if element.local_name() == xsd_elements::COMPLEX_TYPE => {
            types::resolve_complex_type(registry, &scope, element, true).map(TypeNode::ComplexType)
        }
        DeclarationKind::Type => {
            types::resolve_simple_type(registry, &scope, element, true).map(TypeNode::SimpleType)
        }
        DeclarationKind::Attribute => {
            attributes::resolve_attribute(registry, &scope, element, true).map(TypeNode::Attribute)
        }
    }
}

/// Node for a by-name reference
pub(crate) fn link(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    kind: DeclarationKind,
    name: QName,
    location: SourceLocation,
) -> NodeId {
    if kind == DeclarationKind::Type && name.is_xsd() && is_builtin(&name.local_name) {
        return registry.graph.builtin(&name.local_name);
    }

    if registry.options.limits.allows_eager_resolution(registry.depth) {
        let found = registry
            .lookup_from(scope.target_namespace.as_deref(), kind, &name)
            .ok()
            .cloned();
        if let Some(declaration) = found {
            return registry.ensure_resolved(&declaration);
        }
    }

    tracing::trace!(%kind, %name, "deferring reference");
    registry.graph.push(TypeNode::Reference(XsdReference::new(
        kind,
        name,
        scope.target_namespace.clone(),
        location,
    )))
}

/// Link the declaration named by a QName-valued attribute, if present
pub(crate) fn link_attribute(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    attribute: &str,
    kind: DeclarationKind,
) -> Option<NodeId> {
    let value = element.string_attribute(attribute)?;
    match scope.resolve_qname(element, attribute, value) {
        Ok(name) => Some(link(registry, scope, kind, name, scope.location(element))),
        Err(diagnostic) => {
            registry.diagnostics.push(diagnostic);
            None
        }
    }
}

/// Record a diagnostic against the current declaration
pub(crate) fn report(registry: &mut SchemaRegistry, scope: &Scope, diagnostic: Diagnostic) {
    registry.diagnostics.push(scope.attach(diagnostic));
}

/// Record an unexpected child; its severity follows the resolution mode
pub(crate) fn malformed(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    parent: &Element,
    child: &Element,
) {
    let severity = registry.options.mode.compositor_severity();
    let diagnostic = Diagnostic::error(
        DiagnosticKind::MalformedCompositor,
        format!(
            "unexpected <{}> inside <{}>",
            display_tag(child),
            display_tag(parent)
        ),
        scope.location(child),
    )
    .with_severity(severity);
    report(registry, scope, diagnostic);
}

fn display_tag(element: &Element) -> String {
    if element.namespace() == Some(XSD_NAMESPACE) {
        format!("xs:{}", element.local_name())
    } else {
        element.qname.to_string()
    }
}

/// `minOccurs`/`maxOccurs` of a particle
pub(crate) fn parse_occurs(registry: &mut SchemaRegistry, scope: &Scope, element: &Element) -> Occurs {
    let min = match element.string_attribute(xsd_attrs::MIN_OCCURS).map(str::trim) {
        None => 1,
        Some(value) => match value.parse::<u32>() {
            Ok(n) => n,
            Err(_) => {
                let diagnostic = Diagnostic::invalid_value(
                    xsd_attrs::MIN_OCCURS,
                    value,
                    "a non-negative integer",
                    scope.location(element),
                );
                report(registry, scope, diagnostic);
                1
            }
        },
    };

    let max = match element.string_attribute(xsd_attrs::MAX_OCCURS).map(str::trim) {
        None => Some(1),
        Some("unbounded") => None,
        Some(value) => match value.parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                let diagnostic = Diagnostic::invalid_value(
                    xsd_attrs::MAX_OCCURS,
                    value,
                    "a non-negative integer or 'unbounded'",
                    scope.location(element),
                );
                report(registry, scope, diagnostic);
                Some(1)
            }
        },
    };

    let occurs = Occurs::new(min, max);
    if !occurs.is_consistent() {
        let diagnostic = Diagnostic::invalid_value(
            xsd_attrs::MIN_OCCURS,
            &min.to_string(),
            "a value not greater than maxOccurs",
            scope.location(element),
        );
        report(registry, scope, diagnostic);
    }
    occurs
}

/// An `xs:boolean` attribute, false when absent or invalid
pub(crate) fn boolean(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    attribute: &str,
) -> bool {
    match element.boolean_attribute(attribute) {
        Ok(value) => value.unwrap_or(false),
        Err(value) => {
            let diagnostic =
                Diagnostic::invalid_value(attribute, &value, "a boolean", scope.location(element));
            report(registry, scope, diagnostic);
            false
        }
    }
}

/// The `form` attribute of a local declaration, or the schema default
pub(crate) fn form(
    registry: &mut SchemaRegistry,
    scope: &Scope,
    element: &Element,
    default: FormDefault,
) -> FormDefault {
    match element.string_attribute(xsd_attrs::FORM) {
        None => default,
        Some(value) => value.parse::<FormDefault>().unwrap_or_else(|_| {
            let diagnostic = Diagnostic::invalid_value(
                xsd_attrs::FORM,
                value,
                "'qualified' or 'unqualified'",
                scope.location(element),
            );
            report(registry, scope, diagnostic);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ResolutionMode, ResolverOptions};
    use crate::diagnostics::Severity;
    use crate::documents::Document;
    use crate::limits::Limits;

    fn registry_with(xml: &str, options: ResolverOptions) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new(options);
        registry
            .register(&Document::parse(xml, Some("test.xsd"), &Limits::default()).unwrap())
            .unwrap();
        registry
    }

    #[test]
    fn test_occurs_parsing() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:sequence>
      <xs:element name="a" type="xs:string"/>
      <xs:element name="b" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
      <xs:element name="c" type="xs:string" minOccurs="2" maxOccurs="5"/>
    </xs:sequence>
  </xs:group>
</xs:schema>"#;
        let mut registry = registry_with(xml, ResolverOptions::default());
        let id = registry
            .resolved_node(DeclarationKind::Group, &QName::namespaced("urn:t", "G"))
            .unwrap();
        let group = registry.graph()[id].as_group().unwrap().clone();
        let occurs: Vec<_> = group.iter().map(|p| p.occurs).collect();
        assert_eq!(
            occurs,
            vec![Occurs::once(), Occurs::zero_or_more(), Occurs::new(2, Some(5))]
        );
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn test_invalid_occurs_is_reported() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:sequence>
      <xs:element name="a" type="xs:string" maxOccurs="many"/>
      <xs:element name="b" type="xs:string" minOccurs="3" maxOccurs="1"/>
    </xs:sequence>
  </xs:group>
</xs:schema>"#;
        let mut registry = registry_with(xml, ResolverOptions::default());
        registry
            .resolved_node(DeclarationKind::Group, &QName::namespaced("urn:t", "G"))
            .unwrap();
        let invalid: Vec<_> = registry
            .diagnostics()
            .of_kind(DiagnosticKind::InvalidAttributeValue)
            .collect();
        assert_eq!(invalid.len(), 2);
        assert_eq!(invalid[0].location.line(), Some(4));
        assert_eq!(
            invalid[0].declaration,
            Some(QName::namespaced("urn:t", "G"))
        );
    }

    #[test]
    fn test_malformed_severity_follows_mode() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:sequence>
      <xs:attribute name="oops"/>
    </xs:sequence>
  </xs:group>
</xs:schema>"#;
        let name = QName::namespaced("urn:t", "G");

        let mut strict = registry_with(xml, ResolverOptions::default());
        strict.resolved_node(DeclarationKind::Group, &name).unwrap();
        let found: Vec<_> = strict
            .diagnostics()
            .of_kind(DiagnosticKind::MalformedCompositor)
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert!(found[0].message.contains("xs:attribute"));

        let mut lax = registry_with(
            xml,
            ResolverOptions::new().with_mode(ResolutionMode::Lax),
        );
        lax.resolved_node(DeclarationKind::Group, &name).unwrap();
        assert!(!lax.diagnostics().has_errors());
        assert_eq!(lax.diagnostics().warnings().count(), 1);
    }

    #[test]
    fn test_deep_chains_fall_back_to_placeholders() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:complexType name="A"><xs:sequence><xs:element name="b" type="t:B"/></xs:sequence></xs:complexType>
  <xs:complexType name="B"><xs:sequence><xs:element name="c" type="t:C"/></xs:sequence></xs:complexType>
  <xs:complexType name="C"/>
</xs:schema>"#;
        let limits = Limits {
            max_resolution_depth: 1,
            ..Limits::default()
        };
        let mut registry = registry_with(xml, ResolverOptions::new().with_limits(limits));
        registry
            .resolved_node(DeclarationKind::Type, &QName::namespaced("urn:t", "A"))
            .unwrap();
        let placeholders = registry
            .graph()
            .iter()
            .filter(|(_, node)| node.is_reference())
            .count();
        assert_eq!(placeholders, 1);
    }
}
