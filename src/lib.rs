//! # wsdl-types
//!
//! Builds a resolved type graph from the XML Schema documents of a WSDL
//! service description (or standalone XSD files), ready for code generation.
//!
//! XML Schema allows forward references, cross-document imports and
//! includes, substitution groups, and recursive type definitions. This crate
//! indexes every declaration, builds nodes lazily into an arena, closes the
//! remaining by-name references in one pass, and hands back an immutable
//! [`ResolvedGraph`] whose cycles are plain node ids.
//!
//! ## Features
//!
//! - `group`, `element`, `complexType`, `simpleType` and `attribute`
//!   declarations, with nested compositors and element wildcards
//! - Imports, includes (including chameleon includes) and WSDL `types`
//! - Structured diagnostics with source positions, strict and lax modes
//! - Resource limits on document size, depth and eager resolution
//! - JSON export of the resolved graph
//!
//! ## Example
//!
//! ```rust
//! use wsdl_types::{Document, QName, ResolverOptions, SchemaRegistry};
//!
//! let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:shop">
//!   <xs:group name="Addr">
//!     <xs:sequence>
//!       <xs:element name="street" type="xs:string"/>
//!       <xs:element name="city" type="xs:string"/>
//!     </xs:sequence>
//!   </xs:group>
//! </xs:schema>"#;
//!
//! let mut registry = SchemaRegistry::new(ResolverOptions::default());
//! registry.register(&Document::from_string(xsd)?)?;
//! let graph = registry.resolve_all()?;
//!
//! let addr = QName::namespaced("urn:shop", "Addr");
//! let members = graph.sequence_elements(&addr)?;
//! assert_eq!(members.len(), 2);
//! assert_eq!(graph.group(&addr).and_then(|g| g.wsdl_name()).as_deref(), Some("{urn:shop}Addr"));
//! # Ok::<(), wsdl_types::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod config;
pub mod diagnostics;

// XML layer
pub mod namespaces;
pub mod names;
pub mod locations;
pub mod loaders;
pub mod documents;

// Schema graph
pub mod model;
pub mod registry;
pub mod resolver;

// Output
pub mod exports;

// Re-exports for convenience
pub use config::{ResolutionMode, ResolverOptions};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use documents::{Document, Element};
pub use error::{Error, Result};
pub use limits::Limits;
pub use model::{DeclarationKind, NodeId, Occurs, Particle, TypeNode};
pub use namespaces::QName;
pub use registry::SchemaRegistry;
pub use resolver::{resolve_all, Member, ResolvedGraph};

/// Version of the wsdl-types library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use namespaces::{WSDL_NAMESPACE, XML_NAMESPACE, XSD_NAMESPACE};
