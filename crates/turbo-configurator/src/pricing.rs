//! Effective price and weight of a variant.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::axis::AxisResolution;
use crate::catalog::{Product, Variant};
use crate::ids::VariantId;
use crate::quantity::clamped_add;

/// Price and weight a variant sells and ships with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPricing {
    pub variant_id: VariantId,
    pub price: Decimal,
    pub weight: Decimal,
    /// Price comes from the variant row rather than the axes.
    pub price_is_fixed: bool,
    pub weight_is_fixed: bool,
}

/// Fixed values win; unset ones are the product base plus option deltas.
///
/// Deltas come from the resolved axes, so per-product overrides of global
/// options apply. Options no longer on an axis contribute nothing.
pub fn variant_pricing(
    product: &Product,
    variant: &Variant,
    axes: &AxisResolution,
) -> VariantPricing {
    let located: Vec<_> = variant
        .selected_options
        .iter()
        .filter_map(|o| axes.locate(o).map(|(_, option)| option))
        .collect();

    let price_delta = located
        .iter()
        .filter_map(|o| o.price_modifier)
        .fold(Decimal::ZERO, clamped_add);
    let weight_delta = located
        .iter()
        .filter_map(|o| o.weight_modifier)
        .fold(Decimal::ZERO, clamped_add);

    VariantPricing {
        variant_id: variant.id.clone(),
        price: variant.price.unwrap_or(clamped_add(product.base_price, price_delta)),
        weight: variant.weight.unwrap_or(clamped_add(product.base_weight, weight_delta)),
        price_is_fixed: variant.price.is_some(),
        weight_is_fixed: variant.weight.is_some(),
    }
}
