//! Resolver configuration

use std::fmt;
use std::str::FromStr;

use crate::diagnostics::Severity;
use crate::error::{Error, Result};
use crate::limits::Limits;

/// How strictly schema irregularities are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Every irregularity is an error
    #[default]
    Strict,
    /// Unexpected compositor content is only a warning
    Lax,
}

impl FromStr for ResolutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strict" => Ok(ResolutionMode::Strict),
            "lax" => Ok(ResolutionMode::Lax),
            _ => Err(Error::Value(format!(
                "Invalid resolution mode: '{}'. Must be 'strict' or 'lax'",
                s
            ))),
        }
    }
}

impl ResolutionMode {

    /// Get the mode as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMode::Strict => "strict",
            ResolutionMode::Lax => "lax",
        }
    }

    /// Severity given to malformed compositor content
    pub fn compositor_severity(&self) -> Severity {
        match self {
            ResolutionMode::Strict => Severity::Error,
            ResolutionMode::Lax => Severity::Warning,
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Options for a registry and its resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Strictness
    pub mode: ResolutionMode,
    /// Resource limits
    pub limits: Limits,
}

impl ResolverOptions {
    /// Default options (strict mode, default limits)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution mode
    pub fn with_mode(mut self, mode: ResolutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("strict".parse::<ResolutionMode>().unwrap(), ResolutionMode::Strict);
        assert_eq!("lax".parse::<ResolutionMode>().unwrap(), ResolutionMode::Lax);
        assert!("skip".parse::<ResolutionMode>().is_err());
    }

    #[test]
    fn test_compositor_severity() {
        assert_eq!(ResolutionMode::Strict.compositor_severity(), Severity::Error);
        assert_eq!(ResolutionMode::Lax.compositor_severity(), Severity::Warning);
    }

    #[test]
    fn test_builder() {
        let options = ResolverOptions::new()
            .with_mode(ResolutionMode::Lax)
            .with_limits(Limits::strict());
        assert_eq!(options.mode, ResolutionMode::Lax);
        assert_eq!(options.limits, Limits::strict());
    }
}
