//! Raw materials.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::RawMaterialId;

/// A stocked raw material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawMaterial {
    pub id: RawMaterialId,
    pub name: String,
    /// Unit of measure (e.g. "m2", "m", "pcs").
    pub unit: String,
    #[serde(default)]
    pub stock_quantity: Decimal,
}

impl RawMaterial {
    pub fn new(id: impl Into<RawMaterialId>, unit: impl Into<String>, stock: Decimal) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            unit: unit.into(),
            stock_quantity: stock,
        }
    }
}

/// A quantity to take out of one material's stock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDraw {
    pub raw_material_id: RawMaterialId,
    pub quantity: Decimal,
}
