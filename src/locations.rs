//! Resource and source locations
//!
//! [`Location`] identifies where a schema or WSDL document came from;
//! [`SourcePosition`] and [`SourceLocation`] pin a declaration inside it so
//! diagnostics can point at the offending element.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Resource location - can be a URL, file path, or string identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL (http, https, ftp, etc.)
    Url(Url),
    /// Label for an in-memory document
    String(String),
}

impl FromStr for Location {
    type Err = Error;

    /// Auto-detects a URL, a file path, or a plain label
    fn from_str(s: &str) -> Result<Self> {
        // Try to parse as URL first
        if let Ok(url) = Url::parse(s) {
            if url.scheme() == "file" {
                if let Ok(path) = url.to_file_path() {
                    return Ok(Location::Path(path));
                }
            } else if url.scheme().len() > 1 {
                // Single-letter schemes are Windows drive letters
                return Ok(Location::Url(url));
            }
        }

        // Try as file path
        let path = PathBuf::from(s);
        if path.exists() || s.starts_with('/') || s.starts_with('.') {
            return Ok(Location::Path(path));
        }

        // Otherwise treat as string identifier
        Ok(Location::String(s.to_string()))
    }
}

impl Location {

    /// Resolve a `schemaLocation` hint relative to this location
    pub fn join(&self, reference: &str) -> Result<Location> {
        match self {
            Location::Url(base) => Ok(Location::Url(base.join(reference)?)),
            Location::Path(path) => {
                let candidate = Path::new(reference);
                if candidate.is_absolute() {
                    return Ok(Location::Path(candidate.to_path_buf()));
                }
                if let Ok(url) = Url::parse(reference) {
                    if url.scheme().len() > 1 {
                        return Ok(Location::Url(url));
                    }
                }
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Location::Path(base.join(candidate)))
            }
            Location::String(_) => reference.parse(),
        }
    }

    /// Get the location as a string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Url(u) => u.to_string(),
            Location::String(s) => s.clone(),
        }
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// 1-based line/column of an element's start tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition {
    /// Line number (1-based)
    pub line: u32,
    /// Column number (1-based)
    pub column: u32,
}

impl SourcePosition {
    /// Create a new position
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Position of a construct within a named document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Document label (file path, URL, or in-memory name)
    pub document: Option<Arc<str>>,
    /// Position of the element inside the document
    pub position: Option<SourcePosition>,
}

impl SourceLocation {
    /// Location with neither document nor position
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Create a location from its parts
    pub fn new(document: Option<Arc<str>>, position: SourcePosition) -> Self {
        Self {
            document,
            position: Some(position),
        }
    }

    /// Line number, if known
    pub fn line(&self) -> Option<u32> {
        self.position.map(|p| p.line)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.document, &self.position) {
            (Some(doc), Some(pos)) => write!(f, "{}:{}", doc, pos),
            (Some(doc), None) => write!(f, "{}", doc),
            (None, Some(pos)) => write!(f, "<input>:{}", pos),
            (None, None) => write!(f, "<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc = "http://example.com/schema.xsd".parse::<Location>().unwrap();
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc = "/tmp/schema.xsd".parse::<Location>().unwrap();
        assert!(matches!(loc, Location::Path(_)));
        assert!(loc.is_file());
    }

    #[test]
    fn test_location_as_str() {
        let loc = Location::String("inline".to_string());
        assert_eq!(loc.as_str(), "inline");
    }

    #[test]
    fn test_join_relative_path() {
        let base = Location::Path(PathBuf::from("/srv/wsdl/service.wsdl"));
        let joined = base.join("types/common.xsd").unwrap();
        assert_eq!(
            joined,
            Location::Path(PathBuf::from("/srv/wsdl/types/common.xsd"))
        );
    }

    #[test]
    fn test_join_url() {
        let base = "http://example.com/a/service.wsdl".parse::<Location>().unwrap();
        let joined = base.join("common.xsd").unwrap();
        assert_eq!(joined.as_str(), "http://example.com/a/common.xsd");
    }

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(Some(Arc::from("orders.xsd")), SourcePosition::new(4, 9));
        assert_eq!(loc.to_string(), "orders.xsd:4:9");
        assert_eq!(loc.line(), Some(4));
        assert_eq!(SourceLocation::unknown().to_string(), "<unknown>");
    }
}
