//! XML document handling
//!
//! Schema documents are tokenized with `roxmltree` and converted into an
//! owned [`Element`] tree, so raw declarations can be kept in the schema
//! registry after the source text is gone. Each element remembers its
//! in-scope namespace bindings (needed to resolve QName-valued attributes)
//! and the position of its start tag (needed for diagnostics).

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::{SourceLocation, SourcePosition};
use crate::namespaces::{NamespaceContext, QName, XSD_NAMESPACE};
use indexmap::IndexMap;
use std::sync::Arc;

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespace bindings in scope at this element
    pub namespaces: NamespaceContext,
    /// Position of the start tag
    pub position: SourcePosition,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
            position: SourcePosition::new(1, 1),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Whether this is the XSD element with the given local name
    pub fn is_xsd(&self, local_name: &str) -> bool {
        self.namespace() == Some(XSD_NAMESPACE) && self.local_name() == local_name
    }

    /// Value of an unqualified attribute
    pub fn string_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.namespace.is_none() && qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of an `xs:boolean` attribute
    ///
    /// Returns the offending text as the error when the value is not one of
    /// `true`, `false`, `1`, `0`.
    pub fn boolean_attribute(&self, name: &str) -> std::result::Result<Option<bool>, String> {
        match self.string_attribute(name).map(str::trim) {
            None => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(other) => Err(other.to_string()),
        }
    }

    /// Resolve a QName-valued attribute value against this element's scope
    pub fn resolve_qname(&self, prefixed_name: &str) -> Result<QName> {
        self.namespaces.resolve(prefixed_name)
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: String) {
        self.text = Some(text);
    }

    /// Iterate child elements in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// First XSD child with the given local name
    pub fn find_xsd_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.is_xsd(local_name))
    }

    /// Source location of this element inside `document`
    pub fn location(&self, document: Option<&Arc<str>>) -> SourceLocation {
        SourceLocation::new(document.cloned(), self.position)
    }
}

/// XML Document representation
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
    /// Label of the document (path, URL, or caller-supplied name)
    pub location: Option<Arc<str>>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml, None, &Limits::default())
    }

    /// Parse an XML document, labelling it for diagnostics
    pub fn parse(xml: &str, location: Option<&str>, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        let mut options = roxmltree::ParsingOptions::default();
        options.allow_dtd = false;
        options.nodes_limit = limits.max_xml_nodes;

        let doc = roxmltree::Document::parse_with_options(xml, options)?;
        let lines = LineIndex::new(xml);
        let root = convert_element(&lines, doc.root_element(), &NamespaceContext::new(), 1, limits)?;

        Ok(Self {
            root: Some(root),
            location: location.map(Arc::from),
        })
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Root element, or a parse error naming the document
    pub fn require_root(&self) -> Result<&Element> {
        self.root.as_ref().ok_or_else(|| {
            Error::Parse(crate::error::ParseError::new(format!(
                "Empty document: {}",
                self.location.as_deref().unwrap_or("<input>")
            )))
        })
    }
}

/// Byte offsets of line starts, for offset to line/column mapping
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    /// 1-based line and character column of a byte offset
    fn position(&self, offset: usize) -> SourcePosition {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = self
            .text
            .get(start..offset)
            .map_or(0, |prefix| prefix.chars().count());
        SourcePosition::new(line as u32, column as u32 + 1)
    }
}

fn convert_element(
    lines: &LineIndex<'_>,
    node: roxmltree::Node<'_, '_>,
    parent_scope: &NamespaceContext,
    depth: usize,
    limits: &Limits,
) -> Result<Element> {
    limits.check_xml_depth(depth)?;

    let tag = node.tag_name();
    let mut element = Element::new(QName::new(tag.namespace(), tag.name()));

    element.position = lines.position(node.range().start);

    let mut scope = parent_scope.clone();
    for ns in node.namespaces() {
        match ns.name() {
            Some(prefix) => scope.add_prefix(prefix, ns.uri()),
            None => scope.set_default_namespace(ns.uri()),
        }
    }
    element.namespaces = scope;

    for attr in node.attributes() {
        element
            .attributes
            .insert(QName::new(attr.namespace(), attr.name()), attr.value().to_string());
    }

    let mut text = String::new();
    for child in node.children() {
        if child.is_element() {
            let converted = convert_element(lines, child, &element.namespaces, depth + 1, limits)?;
            element.add_child(converted);
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }
    if !text.trim().is_empty() {
        element.set_text(text);
    }

    Ok(element)
}
