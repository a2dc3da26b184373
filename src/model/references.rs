//! By-name reference placeholders
//!
//! A reference is created when a `ref`, `type`, `base`, `itemType`,
//! `memberTypes` or `substitutionGroup` value names a declaration that cannot
//! be linked yet. The resolution pass fills `resolved` and then rewrites
//! every slot pointing at the placeholder to point at the target instead.

use super::{DeclarationKind, NodeId};
use crate::locations::SourceLocation;
use crate::namespaces::QName;

/// Placeholder for a declaration referenced by name
#[derive(Debug, Clone, PartialEq)]
pub struct XsdReference {
    /// Symbol space of the target, so a group reference never binds to a type
    pub kind: DeclarationKind,
    /// Qualified name of the target
    pub target: QName,
    /// Target namespace of the schema the reference was written in
    pub origin_namespace: Option<String>,
    /// Where the reference was written
    pub location: SourceLocation,
    /// Target node, once known
    pub resolved: Option<NodeId>,
}

impl XsdReference {
    /// Create an unresolved reference
    pub fn new(
        kind: DeclarationKind,
        target: QName,
        origin_namespace: Option<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            target,
            origin_namespace,
            location,
            resolved: None,
        }
    }

    /// Namespace of the target
    pub fn target_namespace(&self) -> Option<&str> {
        self.target.namespace()
    }

    /// Whether the target has been found
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
