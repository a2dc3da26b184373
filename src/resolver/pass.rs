//! Reference resolution pass
//!
//! Runs once every schema document is registered. The pass builds whatever
//! was not built on demand, closes the placeholders left behind, and freezes
//! the arena into a [`ResolvedGraph`].

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::model::builtins::is_builtin;
use crate::model::{
    DeclarationKind, NodeId, Occurs, TypeGraph, TypeNode, XsdAttribute, XsdComplexType,
    XsdElement, XsdGroup, XsdSimpleType,
};
use crate::namespaces::QName;
use crate::registry::SchemaRegistry;

/// Close every reference of a registry and freeze its graph
///
/// Fails with [`Error::Resolution`] carrying every diagnostic when any
/// error-severity diagnostic was recorded, during registration or here.
pub fn resolve_all(registry: SchemaRegistry) -> Result<ResolvedGraph> {
    let mut registry = registry;

    let declarations: Vec<_> = registry.declarations().cloned().collect();
    tracing::debug!(declarations = declarations.len(), "building declarations");
    for declaration in &declarations {
        registry.ensure_resolved(declaration);
    }

    let closed = close_references(&mut registry);
    tracing::debug!(references = closed, nodes = registry.graph.len(), "closed references");

    let redirected = redirect_slots(&mut registry.graph);
    tracing::debug!(slots = redirected, "redirected placeholder slots");

    let substitutions = collect_substitutions(&registry.graph);
    let recursive = recursive_nodes(&registry.graph);
    tracing::debug!(nodes = recursive.len(), "found recursive nodes");

    let diagnostics = std::mem::take(&mut registry.diagnostics);
    if diagnostics.has_errors() {
        tracing::debug!(errors = diagnostics.error_count(), "resolution failed");
        return Err(Error::Resolution(diagnostics));
    }

    let mut index = IndexMap::new();
    for schema in registry.schemas.values() {
        for declaration in schema.declarations() {
            if let Some(id) = schema.resolved(&declaration.key()) {
                index.insert((declaration.kind, declaration.name.clone()), id);
            }
        }
    }
    let namespaces = registry.schemas.keys().cloned().collect();

    Ok(ResolvedGraph {
        inner: Arc::new(GraphInner {
            graph: std::mem::take(&mut registry.graph),
            index,
            substitutions,
            recursive,
            namespaces,
            warnings: diagnostics.into_warnings(),
        }),
    })
}

/// Resolve every open placeholder, including ones created while building
/// the targets of earlier placeholders
fn close_references(registry: &mut SchemaRegistry) -> usize {
    let mut closed = 0;
    let mut cursor = 0;

    while cursor < registry.graph.len() {
        let id = NodeId::new(cursor);
        cursor += 1;

        let reference = match registry.graph.get(id) {
            Some(TypeNode::Reference(r)) if !r.is_resolved() => r.clone(),
            _ => continue,
        };

        let target = if reference.kind == DeclarationKind::Type
            && reference.target.is_xsd()
            && is_builtin(&reference.target.local_name)
        {
            Some(registry.graph.builtin(&reference.target.local_name))
        } else {
            let found = registry
                .lookup_from(
                    reference.origin_namespace.as_deref(),
                    reference.kind,
                    &reference.target,
                )
                .ok()
                .cloned();
            match found {
                Some(declaration) => Some(registry.ensure_resolved(&declaration)),
                None => {
                    registry.diagnostics.push_unresolved(
                        reference.kind,
                        &reference.target,
                        reference.location.clone(),
                    );
                    None
                }
            }
        };

        if let Some(TypeNode::Reference(r)) = registry.graph.get_mut(id) {
            r.resolved = target;
        }
        if target.is_some() {
            closed += 1;
        }
    }
    closed
}

/// Point every slot that names a resolved placeholder at the final target
fn redirect_slots(graph: &mut TypeGraph) -> usize {
    let limit = graph.len();
    let mut redirects = HashMap::new();

    for (id, node) in graph.iter() {
        let Some(mut target) = node.as_reference().and_then(|r| r.resolved) else {
            continue;
        };
        // placeholders can point at placeholders; the chain is finite
        let mut hops = 0;
        while let Some(next) = graph
            .get(target)
            .and_then(TypeNode::as_reference)
            .and_then(|r| r.resolved)
        {
            if hops >= limit {
                break;
            }
            target = next;
            hops += 1;
        }
        redirects.insert(id, target);
    }

    let mut count = 0;
    for index in 0..graph.len() {
        let Some(node) = graph.get_mut(NodeId::new(index)) else {
            continue;
        };
        for slot in node.link_slots_mut() {
            if let Some(&target) = redirects.get(&*slot) {
                *slot = target;
                count += 1;
            }
        }
    }
    count
}

fn collect_substitutions(graph: &TypeGraph) -> HashMap<NodeId, Vec<NodeId>> {
    let mut substitutions: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for (id, node) in graph.iter() {
        if let Some(head) = node.as_element().and_then(|e| e.substitution_group) {
            substitutions.entry(head).or_default().push(id);
        }
    }
    substitutions
}

/// Nodes that lie on a cycle
///
/// Tarjan's strongly connected components, walked with an explicit stack.
/// A node is recursive when its component has more than one node or it
/// links to itself.
fn recursive_nodes(graph: &TypeGraph) -> HashSet<NodeId> {
    const UNVISITED: usize = usize::MAX;

    let n = graph.len();
    let successors: Vec<Vec<usize>> = graph
        .iter()
        .map(|(_, node)| {
            node.successors()
                .into_iter()
                .map(NodeId::index)
                .filter(|&w| w < n)
                .collect()
        })
        .collect();

    let mut index = vec![UNVISITED; n];
    let mut low = vec![0; n];
    let mut on_stack = vec![false; n];
    let mut stack = Vec::new();
    let mut counter = 0;
    let mut recursive = HashSet::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = counter;
        low[root] = counter;
        counter += 1;
        stack.push(root);
        on_stack[root] = true;
        // (node, next successor to visit)
        let mut work = vec![(root, 0)];

        while let Some((v, position)) = work.last().copied() {
            if let Some(&w) = successors[v].get(position) {
                if let Some(top) = work.last_mut() {
                    top.1 += 1;
                }
                if index[w] == UNVISITED {
                    index[w] = counter;
                    low[w] = counter;
                    counter += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                low[parent] = low[parent].min(low[v]);
            }
            if low[v] != index[v] {
                continue;
            }
            let mut component = Vec::new();
            while let Some(w) = stack.pop() {
                on_stack[w] = false;
                component.push(w);
                if w == v {
                    break;
                }
            }
            if component.len() > 1 || successors[v].contains(&v) {
                recursive.extend(component.into_iter().map(NodeId::new));
            }
        }
    }
    recursive
}

/// One entry of a group's member sequence
#[derive(Debug, Clone, Copy)]
pub struct Member<'a> {
    /// Node of the member
    pub id: NodeId,
    /// The member itself, never a placeholder
    pub node: &'a TypeNode,
    /// Occurrence bounds at this position
    pub occurs: Occurs,
}

#[derive(Debug)]
struct GraphInner {
    graph: TypeGraph,
    index: IndexMap<(DeclarationKind, QName), NodeId>,
    substitutions: HashMap<NodeId, Vec<NodeId>>,
    recursive: HashSet<NodeId>,
    namespaces: Vec<Option<String>>,
    warnings: Diagnostics,
}

/// Fully resolved, immutable type graph
///
/// Cloning is cheap; clones share the same nodes. The graph may contain
/// cycles, so walk it through ids rather than by recursion.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    inner: Arc<GraphInner>,
}

impl ResolvedGraph {
    /// Node by id
    pub fn node(&self, id: NodeId) -> Option<&TypeNode> {
        self.inner.graph.get(id)
    }

    /// Id of a top-level declaration, or of a built-in type
    pub fn lookup(&self, kind: DeclarationKind, name: &QName) -> Option<NodeId> {
        if let Some(&id) = self.inner.index.get(&(kind, name.clone())) {
            return Some(id);
        }
        if kind == DeclarationKind::Type && name.is_xsd() {
            return self.inner.graph.builtin_id(&name.local_name);
        }
        None
    }

    fn declared(&self, kind: DeclarationKind, name: &QName) -> Option<&TypeNode> {
        self.lookup(kind, name).and_then(|id| self.node(id))
    }

    /// Named group definition
    pub fn group(&self, name: &QName) -> Option<&XsdGroup> {
        self.declared(DeclarationKind::Group, name)
            .and_then(TypeNode::as_group)
    }

    /// Global element declaration
    pub fn element(&self, name: &QName) -> Option<&XsdElement> {
        self.declared(DeclarationKind::Element, name)
            .and_then(TypeNode::as_element)
    }

    /// Named complex type
    pub fn complex_type(&self, name: &QName) -> Option<&XsdComplexType> {
        self.declared(DeclarationKind::Type, name)
            .and_then(TypeNode::as_complex_type)
    }

    /// Named simple type
    pub fn simple_type(&self, name: &QName) -> Option<&XsdSimpleType> {
        self.declared(DeclarationKind::Type, name)
            .and_then(TypeNode::as_simple_type)
    }

    /// Global attribute declaration
    pub fn attribute(&self, name: &QName) -> Option<&XsdAttribute> {
        self.declared(DeclarationKind::Attribute, name)
            .and_then(TypeNode::as_attribute)
    }

    /// Named group definitions, in registration order
    pub fn groups(&self) -> impl Iterator<Item = (NodeId, &XsdGroup)> {
        self.declarations()
            .filter(|(kind, _, _)| *kind == DeclarationKind::Group)
            .filter_map(move |(_, _, id)| self.node(id)?.as_group().map(|g| (id, g)))
    }

    /// Every top-level declaration with its node id, in registration order
    pub fn declarations(&self) -> impl Iterator<Item = (DeclarationKind, &QName, NodeId)> {
        self.inner
            .index
            .iter()
            .map(|((kind, name), id)| (*kind, name, *id))
    }

    /// Ordered members of a named group
    pub fn sequence_elements(&self, group: &QName) -> Result<Vec<Member<'_>>> {
        let definition = self.group(group).ok_or_else(|| Error::UnknownReference {
            kind: DeclarationKind::Group,
            name: group.clone(),
        })?;
        Ok(self.members(definition))
    }

    /// Ordered members of any group node
    pub fn members<'a>(&'a self, group: &'a XsdGroup) -> Vec<Member<'a>> {
        group
            .iter()
            .filter_map(|particle| {
                self.node(particle.term).map(|node| Member {
                    id: particle.term,
                    node,
                    occurs: particle.occurs,
                })
            })
            .collect()
    }

    /// Ids a node links to
    pub fn successors(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).map(TypeNode::successors).unwrap_or_default()
    }

    /// Whether a node can reach itself
    pub fn is_recursive(&self, id: NodeId) -> bool {
        self.inner.recursive.contains(&id)
    }

    /// Elements whose `substitutionGroup` names `head`
    pub fn substitutes(&self, head: NodeId) -> &[NodeId] {
        self.inner
            .substitutions
            .get(&head)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Warnings recorded while building the graph
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.warnings
    }

    /// Target namespaces of the resolved schemas
    pub fn namespaces(&self) -> &[Option<String>] {
        &self.inner.namespaces
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.inner.graph.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.inner.graph.is_empty()
    }

    /// Every node with its id
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TypeNode)> {
        self.inner.graph.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverOptions;
    use crate::diagnostics::DiagnosticKind;
    use crate::documents::Document;
    use crate::limits::Limits;

    fn registry(documents: &[&str], options: ResolverOptions) -> SchemaRegistry {
        let mut registry = SchemaRegistry::new(options);
        for xml in documents {
            registry.register(&Document::from_string(xml).unwrap()).unwrap();
        }
        registry
    }

    const CHAIN: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:group name="A"><xs:sequence><xs:group ref="t:B"/></xs:sequence></xs:group>
  <xs:group name="B"><xs:sequence><xs:group ref="t:C"/></xs:sequence></xs:group>
  <xs:group name="C"><xs:sequence><xs:element name="leaf" type="xs:string"/></xs:sequence></xs:group>
</xs:schema>"#;

    #[test]
    fn test_placeholders_are_redirected() {
        let limits = Limits {
            max_resolution_depth: 0,
            ..Limits::default()
        };
        let graph = resolve_all(registry(&[CHAIN], ResolverOptions::new().with_limits(limits)))
            .unwrap();

        let a = graph.lookup(DeclarationKind::Group, &QName::namespaced("urn:t", "A")).unwrap();
        let b = graph.lookup(DeclarationKind::Group, &QName::namespaced("urn:t", "B")).unwrap();
        let members = graph
            .sequence_elements(&QName::namespaced("urn:t", "A"))
            .unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, b);
        assert_eq!(graph.successors(a), vec![b]);

        // nothing reachable from a declaration is left as a placeholder
        for (_, _, id) in graph.declarations() {
            for next in graph.successors(id) {
                assert!(!graph.node(next).unwrap().is_reference());
            }
        }
    }

    #[test]
    fn test_unresolved_reported_once_per_name() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:group name="G">
    <xs:sequence>
      <xs:element name="a" type="t:Missing"/>
      <xs:element name="b" type="t:Missing"/>
      <xs:group ref="t:Missing"/>
    </xs:sequence>
  </xs:group>
</xs:schema>"#;
        let err = resolve_all(registry(&[xml], ResolverOptions::default())).unwrap_err();
        let Error::Resolution(diagnostics) = err else {
            panic!("expected resolution failure");
        };
        let unresolved: Vec<_> = diagnostics
            .of_kind(DiagnosticKind::UnresolvedReference)
            .collect();
        // the type and the group live in different symbol spaces
        assert_eq!(unresolved.len(), 2);
        assert_eq!(unresolved[0].location.line(), Some(5));
    }

    #[test]
    fn test_substitution_groups() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:element name="shape" type="xs:anyType" abstract="true"/>
  <xs:element name="circle" type="xs:string" substitutionGroup="t:shape"/>
  <xs:element name="square" type="xs:string" substitutionGroup="t:shape"/>
</xs:schema>"#;
        let graph = resolve_all(registry(&[xml], ResolverOptions::default())).unwrap();
        let head = graph
            .lookup(DeclarationKind::Element, &QName::namespaced("urn:t", "shape"))
            .unwrap();
        let names: Vec<_> = graph
            .substitutes(head)
            .iter()
            .filter_map(|&id| graph.node(id)?.name())
            .collect();
        assert_eq!(names, vec!["circle", "square"]);
        assert!(graph.element(&QName::namespaced("urn:t", "shape")).unwrap().is_abstract);
    }

    #[test]
    fn test_mutual_recursion_is_a_cycle() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
    xmlns:t="urn:t" targetNamespace="urn:t">
  <xs:complexType name="Tree">
    <xs:sequence><xs:element name="forest" type="t:Forest" minOccurs="0"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="Forest">
    <xs:sequence><xs:element name="tree" type="t:Tree" maxOccurs="unbounded"/></xs:sequence>
  </xs:complexType>
  <xs:complexType name="Leaf"/>
</xs:schema>"#;
        let graph = resolve_all(registry(&[xml], ResolverOptions::default())).unwrap();
        let tree = graph.lookup(DeclarationKind::Type, &QName::namespaced("urn:t", "Tree")).unwrap();
        let leaf = graph.lookup(DeclarationKind::Type, &QName::namespaced("urn:t", "Leaf")).unwrap();
        assert!(graph.is_recursive(tree));
        assert!(!graph.is_recursive(leaf));
    }

    #[test]
    fn test_recursive_nodes_match_reachability() {
        // T0..T49 form a ring, U0..U49 form a chain hanging off it
        let mut xml = String::from(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:t="urn:t" targetNamespace="urn:t">"#,
        );
        for i in 0..50 {
            xml.push_str(&format!(
                r#"<xs:complexType name="T{i}"><xs:sequence><xs:element name="n" type="t:T{}"/></xs:sequence></xs:complexType>"#,
                (i + 1) % 50
            ));
            let next = if i == 49 { "t:T0".to_string() } else { format!("t:U{}", i + 1) };
            xml.push_str(&format!(
                r#"<xs:complexType name="U{i}"><xs:sequence><xs:element name="n" type="{next}"/></xs:sequence></xs:complexType>"#
            ));
        }
        xml.push_str("</xs:schema>");
        let graph = resolve_all(registry(&[xml.as_str()], ResolverOptions::default())).unwrap();

        let reaches_itself = |id: NodeId| {
            let mut seen = HashSet::new();
            let mut stack = graph.successors(id);
            while let Some(next) = stack.pop() {
                if next == id {
                    return true;
                }
                if seen.insert(next) {
                    stack.extend(graph.successors(next));
                }
            }
            false
        };
        for (id, _) in graph.iter() {
            assert_eq!(graph.is_recursive(id), reaches_itself(id), "node {}", id);
        }

        let ring = graph.lookup(DeclarationKind::Type, &QName::namespaced("urn:t", "T7")).unwrap();
        let tail = graph.lookup(DeclarationKind::Type, &QName::namespaced("urn:t", "U7")).unwrap();
        assert!(graph.is_recursive(ring));
        assert!(!graph.is_recursive(tail));
    }

    #[test]
    fn test_lookup_falls_back_to_builtins() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:t">
  <xs:element name="e" type="xs:int"/>
</xs:schema>"#;
        let graph = resolve_all(registry(&[xml], ResolverOptions::default())).unwrap();
        let int = graph.lookup(DeclarationKind::Type, &QName::xsd("int")).unwrap();
        assert_eq!(graph.element(&QName::namespaced("urn:t", "e")).unwrap().type_ref, Some(int));
        assert!(graph.lookup(DeclarationKind::Type, &QName::xsd("date")).is_none());
        assert_eq!(graph.namespaces(), &[Some("urn:t".to_string())]);
    }

    #[test]
    fn test_unknown_group_members() {
        let graph = resolve_all(registry(&[CHAIN], ResolverOptions::default())).unwrap();
        let result = graph.sequence_elements(&QName::namespaced("urn:t", "Nope"));
        assert!(matches!(result, Err(Error::UnknownReference { .. })));
        assert_eq!(graph.groups().count(), 3);
    }
}
