//! Canonical variant identity.

use sha2::{Digest, Sha256};

use crate::ids::OptionRef;

/// The order-independent identity of an option combination.
///
/// Two selections with the same options in any order have the same key and
/// hash, so reordering axes never makes an existing variant look new.
/// Refs are sorted by their canonical `p:`/`g:` form rather than by axis
/// position for that reason.
///
/// The identity does not include the product. Storage scopes it per product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantIdentity {
    key: String,
    hash: String,
}

impl VariantIdentity {
    pub fn of(options: &[OptionRef]) -> Self {
        let mut parts: Vec<String> = options.iter().map(OptionRef::canonical).collect();
        parts.sort();
        parts.dedup();
        let key = parts.join("|");

        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let hash = hex::encode(hasher.finalize());

        Self { key, hash }
    }

    /// Sorted canonical option refs joined by `|`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Hex SHA-256 of the key. Stored in the uniquely indexed column.
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{GlobalOptionId, OptionId};

    #[test]
    fn test_identity_is_order_independent() {
        let black = OptionRef::Product(OptionId::new("black"));
        let large = OptionRef::Global(GlobalOptionId::new("l"));

        let a = VariantIdentity::of(&[black.clone(), large.clone()]);
        let b = VariantIdentity::of(&[large, black]);
        assert_eq!(a, b);
        assert_eq!(a.key(), "g:l|p:black");
        assert_eq!(a.hash().len(), 64);
    }

    #[test]
    fn test_source_is_part_of_identity() {
        let product = VariantIdentity::of(&[OptionRef::Product(OptionId::new("x"))]);
        let global = VariantIdentity::of(&[OptionRef::Global(GlobalOptionId::new("x"))]);
        assert_ne!(product.hash(), global.hash());
    }
}
