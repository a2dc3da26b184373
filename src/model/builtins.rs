//! XSD built-in datatypes
//!
//! Built-ins are never declared by a schema document; a reference into the
//! XML Schema namespace resolves to one shared node per name.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::namespaces::QName;

/// XSD anyType, the default type of an element without `type`
pub const XSD_ANY_TYPE: &str = "anyType";
/// XSD anySimpleType, the base of every simple type
pub const XSD_ANY_SIMPLE_TYPE: &str = "anySimpleType";

/// Names of the XSD 1.0 built-in datatypes
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    // String types
    "string",
    "normalizedString",
    "token",
    "language",
    "Name",
    "NCName",
    "ID",
    "IDREF",
    "IDREFS",
    "ENTITY",
    "ENTITIES",
    "NMTOKEN",
    "NMTOKENS",
    "boolean",
    // Numeric types
    "decimal",
    "integer",
    "long",
    "int",
    "short",
    "byte",
    "nonNegativeInteger",
    "positiveInteger",
    "unsignedLong",
    "unsignedInt",
    "unsignedShort",
    "unsignedByte",
    "nonPositiveInteger",
    "negativeInteger",
    "float",
    "double",
    // Date/time types
    "duration",
    "dateTime",
    "time",
    "date",
    "gYearMonth",
    "gYear",
    "gMonthDay",
    "gDay",
    "gMonth",
    // Binary and other types
    "hexBinary",
    "base64Binary",
    "anyURI",
    "QName",
    "NOTATION",
    XSD_ANY_TYPE,
    XSD_ANY_SIMPLE_TYPE,
];

static BUILTIN_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BUILTIN_TYPE_NAMES.iter().copied().collect());

/// Whether `local_name` names an XSD built-in datatype
pub fn is_builtin(local_name: &str) -> bool {
    BUILTIN_SET.contains(local_name)
}

/// XSD built-in datatype node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinType {
    /// Name in the XML Schema namespace
    pub name: QName,
}

impl BuiltinType {
    /// Built-in datatype by local name
    pub fn new(local_name: &str) -> Self {
        Self {
            name: QName::xsd(local_name),
        }
    }

    /// Whether this is a simple datatype (everything except anyType)
    pub fn is_simple(&self) -> bool {
        self.name.local_name != XSD_ANY_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_builtin() {
        assert!(is_builtin("string"));
        assert!(is_builtin("dateTime"));
        assert!(is_builtin("anyType"));
        assert!(!is_builtin("Address"));
        assert!(!is_builtin("String"));
    }

    #[test]
    fn test_builtin_type() {
        let t = BuiltinType::new("int");
        assert!(t.name.is_xsd());
        assert!(t.is_simple());
        assert!(!BuiltinType::new(XSD_ANY_TYPE).is_simple());
    }
}
