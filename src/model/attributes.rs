//! Attribute declarations

use std::fmt;
use std::str::FromStr;

use super::NodeId;
use crate::error::Error;
use crate::locations::SourceLocation;
use crate::namespaces::QName;

/// Attribute use mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// Attribute is optional (default)
    #[default]
    Optional,
    /// Attribute is required
    Required,
    /// Attribute is prohibited
    Prohibited,
}

impl FromStr for AttributeUse {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "optional" => Ok(AttributeUse::Optional),
            "required" => Ok(AttributeUse::Required),
            "prohibited" => Ok(AttributeUse::Prohibited),
            _ => Err(Error::Value(format!("invalid attribute use '{}'", s))),
        }
    }
}

impl AttributeUse {
    /// Get the use as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeUse::Optional => "optional",
            AttributeUse::Required => "required",
            AttributeUse::Prohibited => "prohibited",
        }
    }
}

impl fmt::Display for AttributeUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// XSD attribute declaration
#[derive(Debug, Clone, PartialEq)]
pub struct XsdAttribute {
    /// Local name
    pub name: String,
    /// Qualified name (local attributes follow `attributeFormDefault`/`form`)
    pub qualified_name: QName,
    /// Simple type of the value
    pub type_ref: Option<NodeId>,
    /// Use mode
    pub use_mode: AttributeUse,
    /// Default value
    pub default: Option<String>,
    /// Fixed value
    pub fixed: Option<String>,
    /// Where the attribute was declared
    pub location: SourceLocation,
}

impl XsdAttribute {
    /// Create an optional attribute without a type
    pub fn new(qualified_name: QName) -> Self {
        Self {
            name: qualified_name.local_name.clone(),
            qualified_name,
            type_ref: None,
            use_mode: AttributeUse::Optional,
            default: None,
            fixed: None,
            location: SourceLocation::unknown(),
        }
    }

    /// Whether the attribute must be present
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }
}
