//! Particles and occurrence bounds
//!
//! A particle is one entry of a member sequence: a link to the term (element,
//! group, wildcard) plus the `minOccurs`/`maxOccurs` written at the use site.

use serde::Serialize;
use std::fmt;

use super::NodeId;

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// One or more (1, unbounded)
    pub fn one_or_more() -> Self {
        Self { min: 1, max: None }
    }

    /// Check if this particle can be empty (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check if this particle is empty (maxOccurs == 0)
    pub fn is_empty(&self) -> bool {
        self.max == Some(0)
    }

    /// Check if particle has maxOccurs == 1
    pub fn is_single(&self) -> bool {
        self.max == Some(1)
    }

    /// Check if particle can have multiple occurrences
    pub fn is_multiple(&self) -> bool {
        !self.is_empty() && !self.is_single()
    }

    /// Whether the bounds are consistent (min <= max)
    pub fn is_consistent(&self) -> bool {
        match self.max {
            Some(max) => self.min <= max,
            None => true,
        }
    }
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl fmt::Display for Occurs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "[{}..{}]", self.min, max),
            None => write!(f, "[{}..*]", self.min),
        }
    }
}

/// One member of a group or content model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Particle {
    /// The element, group, or wildcard this member refers to
    pub term: NodeId,
    /// Occurrence bounds written at the use site
    pub occurs: Occurs,
}

impl Particle {
    /// Create a particle
    pub fn new(term: NodeId, occurs: Occurs) -> Self {
        Self { term, occurs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurs_presets() {
        assert_eq!(Occurs::default(), Occurs::once());
        assert!(Occurs::optional().is_emptiable());
        assert!(Occurs::zero_or_more().is_multiple());
        assert!(Occurs::once().is_single());
        assert!(Occurs::new(0, Some(0)).is_empty());
    }

    #[test]
    fn test_occurs_consistency() {
        assert!(Occurs::new(2, Some(5)).is_consistent());
        assert!(Occurs::new(3, None).is_consistent());
        assert!(!Occurs::new(4, Some(2)).is_consistent());
    }

    #[test]
    fn test_occurs_display() {
        assert_eq!(Occurs::once().to_string(), "[1..1]");
        assert_eq!(Occurs::zero_or_more().to_string(), "[0..*]");
    }
}
