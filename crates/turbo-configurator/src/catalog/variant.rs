//! Generated variants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::default_true;
use crate::ids::{OptionRef, ProductId, VariantId};

/// One combination of options, exactly one per axis.
///
/// Variants are created only by the generator. `selected_options` never
/// changes after creation; `identity_hash` is derived from it and carries the
/// storage-level uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    /// Unique stock keeping unit.
    pub sku: String,
    /// Selected options in axis order.
    pub selected_options: Vec<OptionRef>,
    /// Hash of the sorted option set.
    pub identity_hash: String,
    /// Fixed price. `None` means computed from the axes.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Fixed weight. `None` means computed from the axes.
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub stock_quantity: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Variant {
    /// Whether this variant selects `option`.
    pub fn selects(&self, option: &OptionRef) -> bool {
        self.selected_options.contains(option)
    }
}
