//! Configurable products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::default_true;
use super::metadata::MetadataMap;
use crate::ids::ProductId;

/// A product whose variants are generated from its attribute axes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Leading part of every generated variant SKU.
    pub sku_prefix: String,
    /// Price before option deltas.
    #[serde(default)]
    pub base_price: Decimal,
    /// Weight before option deltas.
    #[serde(default)]
    pub base_weight: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Typed metadata, validated against product-scoped field definitions.
    #[serde(default)]
    pub metadata: MetadataMap,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Create an active product with zero base price and weight.
    pub fn new(name: impl Into<String>, sku_prefix: impl Into<String>) -> Self {
        Self {
            id: ProductId::generate(),
            name: name.into(),
            sku_prefix: sku_prefix.into(),
            base_price: Decimal::ZERO,
            base_weight: Decimal::ZERO,
            is_active: true,
            metadata: MetadataMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Replace the generated id.
    pub fn with_id(mut self, id: impl Into<ProductId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_base_price(mut self, price: Decimal) -> Self {
        self.base_price = price;
        self
    }

    pub fn with_base_weight(mut self, weight: Decimal) -> Self {
        self.base_weight = weight;
        self
    }
}
