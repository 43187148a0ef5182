//! Configurator error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in configurator operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfiguratorError {
    /// No attribute axis with at least one active option.
    #[error("Cannot generate variants for product {product_id}: {}", describe_empty_axes(.empty_axes))]
    NoAttributeAxes {
        product_id: String,
        empty_axes: Vec<String>,
    },

    /// Two axes of one product resolve to the same key.
    #[error("Duplicate axis key '{key}' on product {product_id}")]
    DuplicateAxisKey { product_id: String, key: String },

    /// A modifier targets a baseline entry outside the option's product.
    #[error("Invalid modifier reference from option {option} to BOM entry {entry_id}: {reason}")]
    InvalidModifierReference {
        option: String,
        entry_id: String,
        reason: String,
    },

    /// A quantity or modifier value below zero.
    #[error("Negative quantity for {field}: {value}")]
    NegativeQuantity { field: String, value: Decimal },

    /// No free SKU after the configured number of suffix attempts.
    #[error("SKU collision on {sku} unresolved after {attempts} attempts")]
    SkuCollisionUnresolved { sku: String, attempts: u32 },

    /// Another writer took a SKU between planning and insert.
    #[error("SKU already taken: {0}")]
    SkuConflict(String),

    /// Generation kept losing SKU races.
    #[error("Variant generation for product {product_id} gave up after {attempts} attempts")]
    GenerationContention { product_id: String, attempts: u32 },

    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Attribute (product or global) not found.
    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    /// Option (product or global) not found.
    #[error("Option not found: {0}")]
    OptionNotFound(String),

    /// Raw material not found.
    #[error("Raw material not found: {0}")]
    MaterialNotFound(String),

    /// Baseline BOM entry not found.
    #[error("BOM entry not found: {0}")]
    BomEntryNotFound(String),

    /// A second BOM line for the same owner and material.
    #[error("Duplicate BOM entry for {owner} and material {material}")]
    DuplicateBomEntry { owner: String, material: String },

    /// A second global link of the same attribute, or a repeated selection.
    #[error("Duplicate link: {0}")]
    DuplicateLink(String),

    /// A variant override missing fields its type needs.
    #[error("Invalid override: {0}")]
    InvalidOverride(String),

    /// A stored variant whose identity does not match its options.
    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    /// Metadata that does not match its field definitions.
    #[error("Invalid metadata field {field}: {reason}")]
    InvalidMetadata { field: String, reason: String },

    /// Not enough stock to consume.
    #[error("Insufficient stock for {material}: required {required}, available {available}")]
    InsufficientStock {
        material: String,
        required: Decimal,
        available: Decimal,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn describe_empty_axes(empty_axes: &[String]) -> String {
    if empty_axes.is_empty() {
        "no active attributes or global attribute links".to_string()
    } else {
        format!("no active options on axis {}", empty_axes.join(", "))
    }
}

impl ConfiguratorError {
    /// Errors caused by catalog data rather than by storage or contention.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConfiguratorError::NoAttributeAxes { .. }
                | ConfiguratorError::DuplicateAxisKey { .. }
                | ConfiguratorError::InvalidModifierReference { .. }
                | ConfiguratorError::NegativeQuantity { .. }
                | ConfiguratorError::DuplicateBomEntry { .. }
                | ConfiguratorError::DuplicateLink(_)
                | ConfiguratorError::InvalidOverride(_)
                | ConfiguratorError::InvalidVariant(_)
                | ConfiguratorError::InvalidMetadata { .. }
                | ConfiguratorError::InvalidQuantity(_)
        )
    }
}

#[cfg(feature = "storage")]
impl From<turbo_db::DbError> for ConfiguratorError {
    fn from(e: turbo_db::DbError) -> Self {
        ConfiguratorError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ConfiguratorError {
    fn from(e: serde_json::Error) -> Self {
        ConfiguratorError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_axes_message_names_empty_axis() {
        let err = ConfiguratorError::NoAttributeAxes {
            product_id: "p-1".to_string(),
            empty_axes: vec!["color".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Cannot generate variants for product p-1: no active options on axis color"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_no_axes_message_without_attributes() {
        let err = ConfiguratorError::NoAttributeAxes {
            product_id: "p-1".to_string(),
            empty_axes: vec![],
        };
        assert!(err.to_string().contains("no active attributes"));
    }

    #[test]
    fn test_storage_errors_are_not_validation() {
        assert!(!ConfiguratorError::Storage("disk".to_string()).is_validation());
    }
}
