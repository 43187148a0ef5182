//! Attribute and option rows, product-specific and global.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::default_true;
use super::metadata::MetadataMap;
use crate::ids::{
    AttributeId, GlobalAttributeId, GlobalLinkId, GlobalOptionId, OptionId, ProductId,
};

/// An attribute defined on one product (e.g. Color of a tote bag).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductAttribute {
    pub id: AttributeId,
    pub product_id: ProductId,
    /// Axis key, unique within the product.
    pub key: String,
    pub display_name: String,
    /// Sort order among all axes of the product.
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// One value of a product attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductAttributeOption {
    pub id: OptionId,
    pub attribute_id: AttributeId,
    /// Raw value, also the source of the SKU abbreviation.
    pub value: String,
    pub display_value: String,
    /// Price delta added to the product base price.
    #[serde(default)]
    pub price_modifier: Option<Decimal>,
    /// Weight delta added to the product base weight.
    #[serde(default)]
    pub weight_modifier: Option<Decimal>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: MetadataMap,
}

/// A store-wide attribute that products link into their axes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalAttribute {
    pub id: GlobalAttributeId,
    pub key: String,
    pub display_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// One value of a global attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalAttributeOption {
    pub id: GlobalOptionId,
    pub global_attribute_id: GlobalAttributeId,
    pub value: String,
    pub display_value: String,
    #[serde(default)]
    pub price_modifier: Option<Decimal>,
    #[serde(default)]
    pub weight_modifier: Option<Decimal>,
    #[serde(default)]
    pub position: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: MetadataMap,
}

/// Links a global attribute into one product's axes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductGlobalAttributeLink {
    pub id: GlobalLinkId,
    pub product_id: ProductId,
    pub global_attribute_id: GlobalAttributeId,
    /// Sort order among all axes of the product.
    #[serde(default)]
    pub position: i32,
}

/// Restricts a link to chosen global options, with per-product overrides.
///
/// A link without any selection rows uses every active option of the global
/// attribute unmodified. Overrides apply to this product only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductGlobalOptionSelection {
    pub link_id: GlobalLinkId,
    pub global_option_id: GlobalOptionId,
    #[serde(default)]
    pub price_modifier: Option<Decimal>,
    #[serde(default)]
    pub weight_modifier: Option<Decimal>,
    #[serde(default)]
    pub position_override: Option<i32>,
}

impl ProductGlobalOptionSelection {
    /// Select a global option without overrides.
    pub fn new(link_id: GlobalLinkId, global_option_id: GlobalOptionId) -> Self {
        Self {
            link_id,
            global_option_id,
            price_modifier: None,
            weight_modifier: None,
            position_override: None,
        }
    }
}
