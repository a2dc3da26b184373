//! Limits and constraints for schema processing
//!
//! These bound the resources a single translation run may consume: document
//! size and shape, how many documents an include/import walk may pull in,
//! and how deep on-demand resolution may recurse before it falls back to
//! deferred placeholders.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth in one document
    pub max_xml_depth: usize,

    /// Maximum XML file size in bytes
    pub max_xml_size: usize,

    /// Maximum number of nodes the XML tokenizer may produce per document
    pub max_xml_nodes: u32,

    /// Maximum number of schema documents loaded in one run
    pub max_schema_documents: usize,

    /// Maximum include/import chain length
    pub max_schema_depth: usize,

    /// Maximum number of top-level declarations across all schemas
    pub max_declarations: usize,

    /// Maximum nesting of eager (on-demand) resolution; deeper references
    /// are left as placeholders for the resolution pass
    pub max_resolution_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_xml_nodes: 10_000_000,
            max_schema_documents: 1000,
            max_schema_depth: 100,
            max_declarations: 100_000,
            max_resolution_depth: 64,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_xml_nodes: 1_000_000,
            max_schema_documents: 100,
            max_schema_depth: 20,
            max_declarations: 10_000,
            max_resolution_depth: 16,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_xml_nodes: u32::MAX,
            max_schema_documents: 100_000,
            max_schema_depth: 1000,
            max_declarations: 10_000_000,
            max_resolution_depth: 256,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of loaded documents is within limits
    pub fn check_schema_documents(&self, count: usize) -> Result<()> {
        if count > self.max_schema_documents {
            Err(Error::LimitExceeded(format!(
                "Schema document count {} exceeds maximum {}",
                count, self.max_schema_documents
            )))
        } else {
            Ok(())
        }
    }

    /// Check if schema depth is within limits
    pub fn check_schema_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_schema_depth {
            Err(Error::LimitExceeded(format!(
                "Schema depth {} exceeds maximum {}",
                depth, self.max_schema_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if number of declarations is within limits
    pub fn check_declarations(&self, count: usize) -> Result<()> {
        if count > self.max_declarations {
            Err(Error::LimitExceeded(format!(
                "Declaration count {} exceeds maximum {}",
                count, self.max_declarations
            )))
        } else {
            Ok(())
        }
    }

    /// Whether another level of eager resolution is allowed
    pub fn allows_eager_resolution(&self, depth: usize) -> bool {
        depth < self.max_resolution_depth
    }
}
