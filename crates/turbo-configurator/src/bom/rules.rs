//! BOM rule rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{
    BomEntryId, ModifierId, OptionBomEntryId, OptionRef, OverrideId, ProductId, RawMaterialId,
    VariantId,
};

/// Layer 1: a baseline material line of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductBomEntry {
    pub id: BomEntryId,
    pub product_id: ProductId,
    pub raw_material_id: RawMaterialId,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default = "crate::catalog::default_true")]
    pub is_required: bool,
}

/// Layer 2a: a material line added when an option is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionBomEntry {
    pub id: OptionBomEntryId,
    pub option: OptionRef,
    pub raw_material_id: RawMaterialId,
    pub quantity: Decimal,
    pub unit: String,
}

/// How a Layer 2b modifier changes its target line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierType {
    Multiply,
    Add,
    Set,
}

impl ModifierType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModifierType::Multiply => "multiply",
            ModifierType::Add => "add",
            ModifierType::Set => "set",
        }
    }
}

/// Layer 2b: adjusts one baseline line when an option is selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionBomModifier {
    pub id: ModifierId,
    pub option: OptionRef,
    /// Target Layer 1 entry. Must belong to the option's product.
    pub product_bom_entry_id: BomEntryId,
    pub modifier_type: ModifierType,
    pub modifier_value: Decimal,
}

/// What a Layer 3 override does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideType {
    Replace,
    Add,
    Remove,
    SetQuantity,
}

impl OverrideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideType::Replace => "replace",
            OverrideType::Add => "add",
            OverrideType::Remove => "remove",
            OverrideType::SetQuantity => "set_quantity",
        }
    }
}

/// Layer 3: a per-variant override, applied last in stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantBomOverride {
    pub id: OverrideId,
    pub variant_id: VariantId,
    pub raw_material_id: RawMaterialId,
    pub override_type: OverrideType,
    /// Line removed by a `replace`.
    #[serde(default)]
    pub replaces_material_id: Option<RawMaterialId>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Layers 1, 2a and 2b of one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BomRules {
    #[serde(default)]
    pub entries: Vec<ProductBomEntry>,
    #[serde(default)]
    pub option_entries: Vec<OptionBomEntry>,
    #[serde(default)]
    pub modifiers: Vec<OptionBomModifier>,
}
