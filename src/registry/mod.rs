//! Schema registry
//!
//! The registry owns every [`Schema`] of a run, the [`TypeGraph`] arena the
//! resolvers build into, and the [`Diagnostics`] collected along the way.
//! Documents are registered first (declarations are indexed, nothing is
//! built); nodes are then built on demand through
//! [`SchemaRegistry::resolved_node`] or all at once by the resolution pass.

pub mod schemas;

pub use schemas::{Declaration, DeclarationKey, FormDefault, Schema, SchemaImport};

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

use crate::config::ResolverOptions;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::loaders::Loader;
use crate::locations::{Location, SourceLocation};
use crate::model::builtins::is_builtin;
use crate::model::{DeclarationKind, NodeId, TypeGraph};
use crate::names::is_valid_ncname;
use crate::namespaces::{QName, WSDL_NAMESPACE, XSD_NAMESPACE};
use crate::resolver::{self, xsd_attrs, xsd_elements, ResolvedGraph};

/// How a document entered the registry
#[derive(Debug, Clone, PartialEq, Eq)]
enum Intake {
    /// Registered directly
    Root,
    /// Pulled in by an `include` of a schema with this namespace
    Include { parent_namespace: Option<String> },
    /// Pulled in by an `import` of this namespace
    Import { namespace: Option<String> },
}

impl Intake {
    /// Namespace a document declaring `declared` ends up in
    fn effective_namespace(&self, declared: Option<&str>) -> Option<String> {
        match (declared, self) {
            (Some(ns), _) => Some(ns.to_string()),
            (None, Intake::Include { parent_namespace }) => parent_namespace.clone(),
            (None, _) => None,
        }
    }
}

/// Pending document in the load worklist
#[derive(Debug)]
struct PendingDocument {
    location: Location,
    intake: Intake,
    depth: usize,
}

/// What one registered schema document declared and pulls in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaIntake {
    /// Effective target namespace (after chameleon adoption)
    pub target_namespace: Option<String>,
    /// Imports found in the document
    pub imports: Vec<SchemaImport>,
    /// Include locations found in the document
    pub includes: Vec<String>,
    /// Number of declarations registered from the document
    pub declarations: usize,
}

/// Registry of every schema in a translation run
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    pub(crate) options: ResolverOptions,
    pub(crate) schemas: IndexMap<Option<String>, Schema>,
    pub(crate) graph: TypeGraph,
    pub(crate) diagnostics: Diagnostics,
    /// Reserved nodes whose build failed
    pub(crate) failed: HashMap<NodeId, Diagnostic>,
    /// Current nesting of on-demand builds
    pub(crate) depth: usize,
    documents: usize,
    declarations: usize,
    /// (canonical location, effective namespace) of every loaded document
    loaded: HashSet<(String, Option<String>)>,
    /// `targetNamespace` written in each loaded document
    declared_namespaces: HashMap<String, Option<String>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Options in effect
    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Register a schema document (`xs:schema` root)
    pub fn register(&mut self, document: &Document) -> Result<SchemaIntake> {
        let root = document.require_root()?;
        self.register_schema(root, document.location.as_ref(), &Intake::Root)
    }

    /// Register a document pulled in by an `include` of `parent_namespace`
    ///
    /// A document without `targetNamespace` adopts the parent's namespace.
    pub fn register_included(
        &mut self,
        document: &Document,
        parent_namespace: Option<&str>,
    ) -> Result<SchemaIntake> {
        let root = document.require_root()?;
        let intake = Intake::Include {
            parent_namespace: parent_namespace.map(str::to_string),
        };
        self.register_schema(root, document.location.as_ref(), &intake)
    }

    /// Register every schema under `wsdl:definitions/wsdl:types`
    pub fn register_wsdl(&mut self, document: &Document) -> Result<Vec<SchemaIntake>> {
        let root = document.require_root()?;
        if !is_wsdl_definitions(root) {
            return Err(ParseError::new(format!(
                "Expected wsdl:definitions root element, got {}",
                root.qname
            ))
            .with_location(root.location(document.location.as_ref()).to_string())
            .into());
        }
        self.register_wsdl_root(root, document.location.as_ref())
    }

    /// Register a schema or WSDL document, detected by its root element
    pub fn register_document(&mut self, document: &Document) -> Result<Vec<SchemaIntake>> {
        self.register_as(document, &Intake::Root)
    }

    /// Load a schema or WSDL file and everything it includes or imports
    ///
    /// `schemaLocation`s are followed with a worklist rather than recursion.
    /// Documents already loaded into the same namespace are skipped, which
    /// also breaks include cycles. A document without `targetNamespace`
    /// included from schemas of different namespaces is registered into each.
    /// A referenced document that cannot be read is skipped with a warning;
    /// its names then surface as unresolved references.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let loader = Loader::new().with_limits(self.options.limits.clone());

        let mut pending: VecDeque<PendingDocument> = VecDeque::new();
        pending.push_back(PendingDocument {
            location: Location::Path(path.as_ref().to_path_buf()),
            intake: Intake::Root,
            depth: 0,
        });

        while let Some(work) = pending.pop_front() {
            let path_key = match &work.location {
                Location::Path(p) => p
                    .canonicalize()
                    .map(|c| c.to_string_lossy().into_owned())
                    .unwrap_or_else(|_| work.location.as_str()),
                other => other.as_str(),
            };
            if let Some(declared) = self.declared_namespaces.get(&path_key) {
                let key = (path_key.clone(), work.intake.effective_namespace(declared.as_deref()));
                if self.loaded.contains(&key) {
                    tracing::trace!(location = %work.location, "already loaded");
                    continue;
                }
            }
            self.options.limits.check_schema_depth(work.depth)?;

            let document = match loader.load_document(&work.location) {
                Ok(document) => document,
                Err(e) if work.depth > 0 => {
                    tracing::warn!(location = %work.location, error = %e, "skipping schema document");
                    continue;
                }
                Err(e) => return Err(e),
            };

            // a chameleon include is loaded once per adopting namespace
            let declared = document
                .root()
                .and_then(|root| root.string_attribute("targetNamespace"))
                .map(str::to_string);
            let namespace = work.intake.effective_namespace(declared.as_deref());
            self.declared_namespaces.insert(path_key.clone(), declared);
            if !self.loaded.insert((path_key, namespace)) {
                tracing::trace!(location = %work.location, "already loaded");
                continue;
            }

            for intake in self.register_as(&document, &work.intake)? {
                for include in &intake.includes {
                    pending.push_back(PendingDocument {
                        location: work.location.join(include)?,
                        intake: Intake::Include {
                            parent_namespace: intake.target_namespace.clone(),
                        },
                        depth: work.depth + 1,
                    });
                }
                for import in &intake.imports {
                    if let Some(ref location) = import.location {
                        pending.push_back(PendingDocument {
                            location: work.location.join(location)?,
                            intake: Intake::Import {
                                namespace: import.namespace.clone(),
                            },
                            depth: work.depth + 1,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Raw declaration by symbol space and qualified name
    ///
    /// Fails with [`Error::UnknownReference`] when no registered schema
    /// declares the name.
    pub fn lookup(&self, kind: DeclarationKind, name: &QName) -> Result<&Arc<Declaration>> {
        self.schemas
            .get(&name.namespace)
            .and_then(|schema| schema.declaration(kind, &name.local_name))
            .ok_or_else(|| Error::UnknownReference {
                kind,
                name: name.clone(),
            })
    }

    /// Raw declaration as seen from a schema with namespace `origin`
    pub fn lookup_from(
        &self,
        origin: Option<&str>,
        kind: DeclarationKind,
        name: &QName,
    ) -> Result<&Arc<Declaration>> {
        if !self.is_visible(origin, name.namespace()) {
            return Err(Error::UnknownReference {
                kind,
                name: name.clone(),
            });
        }
        self.lookup(kind, name)
    }

    /// Node for a declaration, building it on first request
    ///
    /// Repeated calls return the same id. Names in the XML Schema namespace
    /// resolve to the shared built-in nodes.
    pub fn resolved_node(&mut self, kind: DeclarationKind, name: &QName) -> Result<NodeId> {
        if kind == DeclarationKind::Type && name.is_xsd() && is_builtin(&name.local_name) {
            return Ok(self.graph.builtin(&name.local_name));
        }
        let declaration = self.lookup(kind, name)?.clone();
        let id = self.ensure_resolved(&declaration);
        match self.failed.get(&id) {
            Some(diagnostic) => Err(Error::Diagnostic(Box::new(diagnostic.clone()))),
            None => Ok(id),
        }
    }

    /// Memoized build of one declaration
    ///
    /// The slot is reserved and cached before the build starts, so a
    /// declaration that (directly or not) refers to itself gets its own id
    /// back instead of recursing.
    pub(crate) fn ensure_resolved(&mut self, declaration: &Arc<Declaration>) -> NodeId {
        let key = declaration.key();
        let namespace = declaration.name.namespace.clone();
        if let Some(id) = self.schemas.get(&namespace).and_then(|s| s.resolved(&key)) {
            return id;
        }

        let id = self.graph.reserve();
        if let Some(schema) = self.schemas.get_mut(&namespace) {
            schema.set_resolved(key, id);
        }
        tracing::trace!(kind = %declaration.kind, name = %declaration.name, %id, depth = self.depth, "building declaration");

        self.depth += 1;
        let built = resolver::build_declaration(self, declaration);
        self.depth -= 1;

        match built {
            Ok(node) => self.graph.fill(id, node),
            Err(diagnostic) => {
                self.failed.insert(id, diagnostic.clone());
                self.diagnostics.push(diagnostic);
            }
        }
        id
    }

    /// Namespaces a schema with namespace `origin` can refer into
    ///
    /// That is its own namespace plus everything it imports, transitively.
    pub fn visible_namespaces(&self, origin: Option<&str>) -> HashSet<Option<String>> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(origin.map(str::to_string));

        while let Some(namespace) = queue.pop_front() {
            if !seen.insert(namespace.clone()) {
                continue;
            }
            if let Some(schema) = self.schemas.get(&namespace) {
                for import in schema.imports() {
                    queue.push_back(import.namespace.clone());
                }
            }
        }
        seen
    }

    /// Whether names in `target` are visible from a schema with namespace `origin`
    pub fn is_visible(&self, origin: Option<&str>, target: Option<&str>) -> bool {
        target == Some(XSD_NAMESPACE)
            || origin == target
            || self
                .visible_namespaces(origin)
                .contains(&target.map(str::to_string))
    }

    /// Schema of a target namespace
    pub fn schema(&self, namespace: Option<&str>) -> Option<&Schema> {
        self.schemas.get(&namespace.map(str::to_string))
    }

    /// All schemas, in registration order
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    /// Every raw declaration, schema by schema
    pub fn declarations(&self) -> impl Iterator<Item = &Arc<Declaration>> {
        self.schemas.values().flat_map(|s| s.declarations())
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The node arena
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Close every reference and freeze the graph
    pub fn resolve_all(self) -> Result<ResolvedGraph> {
        resolver::resolve_all(self)
    }

    fn register_as(&mut self, document: &Document, intake: &Intake) -> Result<Vec<SchemaIntake>> {
        let root = document.require_root()?;
        if is_wsdl_definitions(root) {
            self.register_wsdl_root(root, document.location.as_ref())
        } else {
            Ok(vec![self.register_schema(root, document.location.as_ref(), intake)?])
        }
    }

    fn register_wsdl_root(
        &mut self,
        root: &Element,
        label: Option<&Arc<str>>,
    ) -> Result<Vec<SchemaIntake>> {
        let mut intakes = Vec::new();
        let types = root
            .child_elements()
            .filter(|c| c.namespace() == Some(WSDL_NAMESPACE) && c.local_name() == "types");
        for types in types {
            for schema in types.child_elements().filter(|c| c.is_xsd(xsd_elements::SCHEMA)) {
                intakes.push(self.register_schema(schema, label, &Intake::Root)?);
            }
        }
        tracing::debug!(schemas = intakes.len(), "registered WSDL types");
        Ok(intakes)
    }

    fn register_schema(
        &mut self,
        root: &Element,
        label: Option<&Arc<str>>,
        intake: &Intake,
    ) -> Result<SchemaIntake> {
        if !root.is_xsd(xsd_elements::SCHEMA) {
            return Err(ParseError::new(format!(
                "Expected xs:schema root element, got {}",
                root.qname
            ))
            .with_location(root.location(label).to_string())
            .into());
        }

        self.documents += 1;
        self.options.limits.check_schema_documents(self.documents)?;

        let location = root.location(label);
        let declared = root
            .string_attribute(xsd_attrs::TARGET_NAMESPACE)
            .map(str::to_string);

        let mut chameleon = false;
        let target_namespace = match intake {
            Intake::Root => declared,
            Intake::Include { parent_namespace } => match declared {
                None => {
                    chameleon = parent_namespace.is_some();
                    parent_namespace.clone()
                }
                Some(ns) => {
                    if parent_namespace.as_deref() != Some(ns.as_str()) {
                        self.diagnostics.push(namespace_mismatch(
                            "included",
                            Some(&ns),
                            parent_namespace.as_deref(),
                            location.clone(),
                        ));
                    }
                    Some(ns)
                }
            },
            Intake::Import { namespace } => {
                if *namespace != declared {
                    self.diagnostics.push(namespace_mismatch(
                        "imported",
                        declared.as_deref(),
                        namespace.as_deref(),
                        location.clone(),
                    ));
                }
                declared
            }
        };

        let element_form = self.form_default(root, xsd_attrs::ELEMENT_FORM_DEFAULT, label);
        let attribute_form = self.form_default(root, xsd_attrs::ATTRIBUTE_FORM_DEFAULT, label);

        let mut result = SchemaIntake {
            target_namespace: target_namespace.clone(),
            ..SchemaIntake::default()
        };

        let schema = self
            .schemas
            .entry(target_namespace.clone())
            .or_insert_with(|| Schema::new(target_namespace.clone()));
        schema.add_document(label.cloned().unwrap_or_else(|| Arc::from("<input>")));

        for child in root.child_elements() {
            if child.namespace() != Some(XSD_NAMESPACE) {
                tracing::debug!(element = %child.qname, "ignoring foreign schema child");
                continue;
            }

            match child.local_name() {
                xsd_elements::IMPORT => {
                    let import = SchemaImport {
                        namespace: child
                            .string_attribute(xsd_attrs::NAMESPACE)
                            .map(str::to_string),
                        location: child
                            .string_attribute(xsd_attrs::SCHEMA_LOCATION)
                            .map(str::to_string),
                    };
                    schema.add_import(import.clone());
                    result.imports.push(import);
                }
                xsd_elements::INCLUDE => match child.string_attribute(xsd_attrs::SCHEMA_LOCATION) {
                    Some(location) => {
                        schema.add_include(location.to_string());
                        result.includes.push(location.to_string());
                    }
                    None => self.diagnostics.push(Diagnostic::missing_attribute(
                        xsd_elements::INCLUDE,
                        xsd_attrs::SCHEMA_LOCATION,
                        child.location(label),
                    )),
                },
                xsd_elements::ANNOTATION
                | xsd_elements::NOTATION
                | xsd_elements::ATTRIBUTE_GROUP
                | xsd_elements::REDEFINE => {
                    tracing::debug!(element = child.local_name(), "skipping schema child");
                }
                tag => {
                    let Some(kind) = DeclarationKind::from_tag(tag) else {
                        tracing::warn!(element = tag, location = %child.location(label), "unknown schema child");
                        continue;
                    };

                    let Some(name) = child.string_attribute(xsd_attrs::NAME) else {
                        self.diagnostics.push(Diagnostic::missing_attribute(
                            tag,
                            xsd_attrs::NAME,
                            child.location(label),
                        ));
                        continue;
                    };
                    if !is_valid_ncname(name) {
                        self.diagnostics.push(Diagnostic::invalid_value(
                            xsd_attrs::NAME,
                            name,
                            "an NCName",
                            child.location(label),
                        ));
                        continue;
                    }

                    self.declarations += 1;
                    self.options.limits.check_declarations(self.declarations)?;

                    let qname = QName::new(target_namespace.clone(), name);
                    let declaration = Declaration {
                        kind,
                        name: qname.clone(),
                        element: child.clone(),
                        document: label.cloned(),
                        element_form,
                        attribute_form,
                        chameleon,
                    };
                    match schema.insert(declaration) {
                        Ok(()) => result.declarations += 1,
                        Err(existing) => self.diagnostics.push(
                            Diagnostic::error(
                                DiagnosticKind::NamespaceCollision,
                                format!(
                                    "{} '{}' is already declared at {}",
                                    kind,
                                    qname,
                                    existing.location()
                                ),
                                child.location(label),
                            )
                            .with_declaration(qname),
                        ),
                    }
                }
            }
        }

        tracing::debug!(
            namespace = target_namespace.as_deref().unwrap_or(""),
            declarations = result.declarations,
            chameleon,
            "registered schema document"
        );
        Ok(result)
    }

    fn form_default(
        &mut self,
        root: &Element,
        attribute: &str,
        label: Option<&Arc<str>>,
    ) -> FormDefault {
        match root.string_attribute(attribute) {
            None => FormDefault::Unqualified,
            Some(value) => value.parse::<FormDefault>().unwrap_or_else(|_| {
                self.diagnostics.push(Diagnostic::invalid_value(
                    attribute,
                    value,
                    "'qualified' or 'unqualified'",
                    root.location(label),
                ));
                FormDefault::Unqualified
            }),
        }
    }
}

fn is_wsdl_definitions(root: &Element) -> bool {
    root.namespace() == Some(WSDL_NAMESPACE) && root.local_name() == "definitions"
}

fn namespace_mismatch(
    how: &str,
    found: Option<&str>,
    expected: Option<&str>,
    location: SourceLocation,
) -> Diagnostic {
    Diagnostic::error(
        DiagnosticKind::NamespaceMismatch,
        format!(
            "{} schema has targetNamespace '{}', expected '{}'",
            how,
            found.unwrap_or(""),
            expected.unwrap_or("")
        ),
        location,
    )
}
