//! Newtype IDs for type-safe identifiers.
//!
//! Using newtypes prevents accidentally mixing up different ID types,
//! e.g., passing an OptionId where a GlobalOptionId is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs.
macro_rules! define_id {
    ($name:ident) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(ProductId);
define_id!(VariantId);
define_id!(AttributeId);
define_id!(OptionId);
define_id!(GlobalAttributeId);
define_id!(GlobalOptionId);
define_id!(GlobalLinkId);
define_id!(RawMaterialId);
define_id!(BomEntryId);
define_id!(OptionBomEntryId);
define_id!(ModifierId);
define_id!(OverrideId);
define_id!(FieldDefinitionId);

/// Reference to an option on either kind of axis.
///
/// Product options and global options live in separate tables, so their ids
/// are only unique together with the source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "source", content = "id", rename_all = "snake_case")]
pub enum OptionRef {
    Product(OptionId),
    Global(GlobalOptionId),
}

impl OptionRef {
    /// Canonical text form: `p:<id>` or `g:<id>`.
    pub fn canonical(&self) -> String {
        match self {
            OptionRef::Product(id) => format!("p:{}", id),
            OptionRef::Global(id) => format!("g:{}", id),
        }
    }
}

impl fmt::Display for OptionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

impl From<OptionId> for OptionRef {
    fn from(id: OptionId) -> Self {
        OptionRef::Product(id)
    }
}

impl From<GlobalOptionId> for OptionRef {
    fn from(id: GlobalOptionId) -> Self {
        OptionRef::Global(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod-123");
        assert_eq!(id.as_str(), "prod-123");
    }

    #[test]
    fn test_id_generation() {
        let id1 = VariantId::generate();
        let id2 = VariantId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RawMaterialId::new("leather")).unwrap();
        assert_eq!(json, "\"leather\"");
    }

    #[test]
    fn test_option_ref_canonical_form() {
        assert_eq!(OptionRef::from(OptionId::new("black")).canonical(), "p:black");
        assert_eq!(OptionRef::from(GlobalOptionId::new("xl")).to_string(), "g:xl");
    }

    #[test]
    fn test_option_ref_serialization() {
        let r = OptionRef::Global(GlobalOptionId::new("xl"));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json, serde_json::json!({"source": "global", "id": "xl"}));
        let back: OptionRef = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}
