//! Per-namespace schema records
//!
//! A [`Schema`] is the logical schema of one target namespace. Every
//! document registered for that namespace (directly, through `include`, or
//! as a chameleon include) adds its top-level declarations to the same
//! record.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::documents::Element;
use crate::error::Error;
use crate::locations::SourceLocation;
use crate::model::{DeclarationKind, NodeId};
use crate::namespaces::QName;

/// Form default for local element and attribute names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDefault {
    /// Unqualified (default)
    #[default]
    Unqualified,
    /// Qualified
    Qualified,
}

impl FromStr for FormDefault {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "qualified" => Ok(Self::Qualified),
            "unqualified" => Ok(Self::Unqualified),
            _ => Err(Error::Value(format!("invalid form '{}'", s))),
        }
    }
}

impl FormDefault {

    /// Check if qualified
    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified)
    }
}

impl fmt::Display for FormDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified => write!(f, "qualified"),
            Self::Unqualified => write!(f, "unqualified"),
        }
    }
}

/// Import record for a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaImport {
    /// Imported namespace (None imports the no-namespace schema)
    pub namespace: Option<String>,
    /// Location hint (schemaLocation)
    pub location: Option<String>,
}

/// Key of a declaration inside one schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclarationKey {
    /// Symbol space
    pub kind: DeclarationKind,
    /// Local name
    pub name: String,
}

impl DeclarationKey {
    /// Create a key
    pub fn new(kind: DeclarationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// A raw top-level declaration, captured at registration
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Symbol space
    pub kind: DeclarationKind,
    /// Name qualified by the effective target namespace
    pub name: QName,
    /// The declaring element
    pub element: Element,
    /// Label of the document it came from
    pub document: Option<Arc<str>>,
    /// `elementFormDefault` of the declaring document
    pub element_form: FormDefault,
    /// `attributeFormDefault` of the declaring document
    pub attribute_form: FormDefault,
    /// Whether the declaring document was a chameleon include
    pub chameleon: bool,
}

impl Declaration {
    /// Key inside the owning schema
    pub fn key(&self) -> DeclarationKey {
        DeclarationKey::new(self.kind, self.name.local_name.clone())
    }

    /// Where the declaration starts
    pub fn location(&self) -> SourceLocation {
        self.element.location(self.document.as_ref())
    }
}

/// Logical schema of one target namespace
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Target namespace (None for no-namespace schemas)
    pub target_namespace: Option<String>,
    declarations: IndexMap<DeclarationKey, Arc<Declaration>>,
    resolved: HashMap<DeclarationKey, NodeId>,
    imports: Vec<SchemaImport>,
    includes: Vec<String>,
    documents: Vec<Arc<str>>,
}

impl Schema {
    /// Create an empty schema
    pub fn new(target_namespace: Option<String>) -> Self {
        Self {
            target_namespace,
            ..Self::default()
        }
    }

    /// Raw declaration by symbol space and local name
    pub fn declaration(&self, kind: DeclarationKind, local_name: &str) -> Option<&Arc<Declaration>> {
        self.declarations
            .get(&DeclarationKey::new(kind, local_name))
    }

    /// Raw declarations in registration order
    pub fn declarations(&self) -> impl Iterator<Item = &Arc<Declaration>> {
        self.declarations.values()
    }

    /// Number of declarations
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether no declaration was registered
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Add a declaration
    ///
    /// On a duplicate key the earlier declaration is kept and returned.
    pub(crate) fn insert(&mut self, declaration: Declaration) -> Result<(), Arc<Declaration>> {
        let key = declaration.key();
        if let Some(existing) = self.declarations.get(&key) {
            return Err(existing.clone());
        }
        self.declarations.insert(key, Arc::new(declaration));
        Ok(())
    }

    /// Memoized node of a declaration
    pub fn resolved(&self, key: &DeclarationKey) -> Option<NodeId> {
        self.resolved.get(key).copied()
    }

    pub(crate) fn set_resolved(&mut self, key: DeclarationKey, id: NodeId) {
        self.resolved.insert(key, id);
    }

    /// Imports recorded from every document of this schema
    pub fn imports(&self) -> &[SchemaImport] {
        &self.imports
    }

    pub(crate) fn add_import(&mut self, import: SchemaImport) {
        if !self.imports.contains(&import) {
            self.imports.push(import);
        }
    }

    /// Include locations recorded from every document of this schema
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub(crate) fn add_include(&mut self, location: String) {
        if !self.includes.contains(&location) {
            self.includes.push(location);
        }
    }

    /// Labels of the documents merged into this schema
    pub fn documents(&self) -> &[Arc<str>] {
        &self.documents
    }

    pub(crate) fn add_document(&mut self, label: Arc<str>) {
        self.documents.push(label);
    }
}
