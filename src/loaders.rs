//! Schema document loading
//!
//! Only local files and in-memory text are read. Remote locations are
//! refused: fetching documents over the network belongs to the surrounding
//! tool, not to the resolver.

use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use std::fs;

/// Resource loader for schema and WSDL documents
#[derive(Debug, Clone, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        match location {
            Location::Path(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
                })?;

                self.limits.check_xml_size(content.len())?;

                Ok(content)
            }
            Location::Url(url) => Err(Error::Resource(format!(
                "Remote resources are not loaded: {}",
                url
            ))),
            Location::String(s) => {
                self.limits.check_xml_size(s.len())?;
                Ok(s.clone())
            }
        }
    }

    /// Load and parse a document, labelling it with its location
    pub fn load_document(&self, location: &Location) -> Result<Document> {
        let text = self.load(location)?;
        let label = match location {
            Location::String(_) => None,
            other => Some(other.as_str()),
        };
        tracing::debug!(location = label.as_deref().unwrap_or("<string>"), "parsing document");
        Document::parse(&text, label.as_deref(), &self.limits)
    }
}
