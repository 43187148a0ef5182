//! Buildable units from raw-material stock.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::RawMaterialId;
use crate::quantity::whole_units;

/// How many complete units current stock covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "units", rename_all = "snake_case")]
pub enum Producibility {
    Units(u64),
    /// No material has a positive requirement.
    Unconstrained,
}

impl Producibility {
    /// The unit count, or `None` when unconstrained.
    pub fn units(&self) -> Option<u64> {
        match self {
            Producibility::Units(n) => Some(*n),
            Producibility::Unconstrained => None,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Producibility::Unconstrained)
    }
}

impl fmt::Display for Producibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producibility::Units(n) => write!(f, "{}", n),
            Producibility::Unconstrained => write!(f, "unconstrained (no materials required)"),
        }
    }
}

/// Capacity of one required material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialCapacity {
    pub raw_material_id: RawMaterialId,
    /// Quantity per unit.
    pub required: Decimal,
    /// Stock on hand. Zero when the material has no stock row.
    pub available: Decimal,
    pub units: u64,
    /// The material has no stock row.
    pub missing: bool,
}

/// Producibility with the per-material breakdown behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducibilityReport {
    pub producibility: Producibility,
    /// One line per material with a positive requirement.
    pub materials: Vec<MaterialCapacity>,
    /// Materials whose capacity equals the result.
    pub limiting: Vec<RawMaterialId>,
}

/// Minimum over required materials of `floor(stock / required)`.
///
/// Materials missing from `stock` count as zero stock. Requirements that are
/// not positive are ignored; if none remain the result is `Unconstrained`.
pub fn producible_units(
    required: &BTreeMap<RawMaterialId, Decimal>,
    stock: &HashMap<RawMaterialId, Decimal>,
) -> Producibility {
    producibility_report(required.iter().map(|(m, q)| (m, *q)), stock).producibility
}

/// Build a [`ProducibilityReport`] from per-unit requirements.
pub fn producibility_report<'a>(
    required: impl IntoIterator<Item = (&'a RawMaterialId, Decimal)>,
    stock: &HashMap<RawMaterialId, Decimal>,
) -> ProducibilityReport {
    let materials: Vec<MaterialCapacity> = required
        .into_iter()
        .filter(|(_, quantity)| *quantity > Decimal::ZERO)
        .map(|(material, quantity)| {
            let available = stock.get(material).copied();
            let on_hand = available.unwrap_or(Decimal::ZERO);
            MaterialCapacity {
                raw_material_id: material.clone(),
                required: quantity,
                available: on_hand,
                units: whole_units(on_hand, quantity),
                missing: available.is_none(),
            }
        })
        .collect();

    let Some(min) = materials.iter().map(|m| m.units).min() else {
        return ProducibilityReport {
            producibility: Producibility::Unconstrained,
            materials,
            limiting: Vec::new(),
        };
    };

    let limiting = materials
        .iter()
        .filter(|m| m.units == min)
        .map(|m| m.raw_material_id.clone())
        .collect();

    ProducibilityReport {
        producibility: Producibility::Units(min),
        materials,
        limiting,
    }
}
