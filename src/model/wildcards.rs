//! Element wildcards (`xs:any`)
//!
//! Reference: https://www.w3.org/TR/xmlschema-1/#Wildcards

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::locations::SourceLocation;

/// Process contents mode for wildcards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessContents {
    /// Validate strictly - element must be declared
    #[default]
    Strict,
    /// Validate if declaration found, otherwise accept
    Lax,
    /// Skip validation entirely
    Skip,
}

impl FromStr for ProcessContents {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "skip" => Ok(Self::Skip),
            _ => Err(Error::Value(format!("invalid processContents '{}'", s))),
        }
    }
}

impl fmt::Display for ProcessContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lax => write!(f, "lax"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// `xs:any` inside a compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XsdAnyElement {
    /// The `namespace` attribute as written (`##any` when absent)
    pub namespace: String,
    /// How matched elements are processed
    pub process_contents: ProcessContents,
    /// Where the wildcard was declared
    pub location: SourceLocation,
}

impl XsdAnyElement {
    /// Wildcard accepting any namespace
    pub fn any() -> Self {
        Self {
            namespace: "##any".to_string(),
            process_contents: ProcessContents::Strict,
            location: SourceLocation::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_contents() {
        assert_eq!("lax".parse::<ProcessContents>().ok(), Some(ProcessContents::Lax));
        assert!("bogus".parse::<ProcessContents>().is_err());
        assert_eq!(ProcessContents::default(), ProcessContents::Strict);
        assert_eq!(ProcessContents::Skip.to_string(), "skip");
    }

    #[test]
    fn test_any_wildcard() {
        let any = XsdAnyElement::any();
        assert_eq!(any.namespace, "##any");
    }
}
