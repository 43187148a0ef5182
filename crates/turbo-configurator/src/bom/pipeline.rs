//! BOM resolution as an ordered list of steps folded over a working map.
//!
//! The resolver turns rule rows into [`PlannedStep`]s in layer order; this
//! module only knows how to apply one step. Steps never fail: a step whose
//! target line is missing is a no-op unless its semantics create the line.
//! Arithmetic that overflows clamps to the largest representable quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::RawMaterialId;
use crate::quantity::{clamped_add, clamped_mul};

/// Rule tier a step came from, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Layer 1.
    Baseline,
    /// Layer 2b.
    OptionModifier,
    /// Layer 2a.
    OptionAddition,
    /// Layer 3.
    VariantOverride,
}

/// One transformation of the working material map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BomStep {
    /// Start a baseline line.
    Seed {
        material: RawMaterialId,
        quantity: Decimal,
        unit: String,
    },
    Multiply {
        material: RawMaterialId,
        factor: Decimal,
    },
    Add {
        material: RawMaterialId,
        amount: Decimal,
    },
    Set {
        material: RawMaterialId,
        quantity: Decimal,
    },
    /// Add to an existing line or create it.
    Merge {
        material: RawMaterialId,
        quantity: Decimal,
        unit: String,
    },
    /// Drop `from`, then merge `to` at `quantity` or at the dropped quantity.
    Replace {
        from: RawMaterialId,
        to: RawMaterialId,
        quantity: Option<Decimal>,
        unit: Option<String>,
    },
    Remove {
        material: RawMaterialId,
    },
    /// Overwrite a line's quantity, creating the line if needed.
    SetQuantity {
        material: RawMaterialId,
        quantity: Decimal,
        unit: Option<String>,
    },
}

/// A step tagged with the rule it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub layer: Layer,
    /// Id of the rule row.
    pub source: String,
    pub step: BomStep,
}

/// A line of the working map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingLine {
    pub material: RawMaterialId,
    pub quantity: Decimal,
    pub unit: String,
}

/// Material map under construction. Lines keep first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingBom {
    lines: Vec<WorkingLine>,
}

impl WorkingBom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `steps` left to right to an empty map.
    pub fn fold<'a>(steps: impl IntoIterator<Item = &'a PlannedStep>) -> Self {
        steps.into_iter().fold(Self::new(), |mut bom, planned| {
            tracing::trace!(
                layer = ?planned.layer,
                source = %planned.source,
                step = ?planned.step,
                "applying bom step"
            );
            bom.apply(&planned.step);
            bom
        })
    }

    pub fn apply(&mut self, step: &BomStep) {
        match step {
            BomStep::Seed {
                material,
                quantity,
                unit,
            }
            | BomStep::Merge {
                material,
                quantity,
                unit,
            } => self.merge(material, *quantity, unit),
            BomStep::Multiply { material, factor } => {
                if let Some(line) = self.line_mut(material) {
                    line.quantity = clamped_mul(line.quantity, *factor);
                }
            }
            BomStep::Add { material, amount } => {
                if let Some(line) = self.line_mut(material) {
                    line.quantity = clamped_add(line.quantity, *amount);
                }
            }
            BomStep::Set { material, quantity } => {
                if let Some(line) = self.line_mut(material) {
                    line.quantity = *quantity;
                }
            }
            BomStep::Replace {
                from,
                to,
                quantity,
                unit,
            } => {
                let removed = self.remove(from);
                let Some(qty) = quantity.or(removed.as_ref().map(|l| l.quantity)) else {
                    return;
                };
                let unit = unit
                    .clone()
                    .or_else(|| removed.map(|l| l.unit))
                    .unwrap_or_default();
                self.merge(to, qty, &unit);
            }
            BomStep::Remove { material } => {
                self.remove(material);
            }
            BomStep::SetQuantity {
                material,
                quantity,
                unit,
            } => match self.line_mut(material) {
                Some(line) => {
                    line.quantity = *quantity;
                    if let Some(unit) = unit {
                        line.unit = unit.clone();
                    }
                }
                None => self.lines.push(WorkingLine {
                    material: material.clone(),
                    quantity: *quantity,
                    unit: unit.clone().unwrap_or_default(),
                }),
            },
        }
    }

    pub fn lines(&self) -> &[WorkingLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<WorkingLine> {
        self.lines
    }

    pub fn quantity(&self, material: &RawMaterialId) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|l| &l.material == material)
            .map(|l| l.quantity)
    }

    fn line_mut(&mut self, material: &RawMaterialId) -> Option<&mut WorkingLine> {
        self.lines.iter_mut().find(|l| &l.material == material)
    }

    fn merge(&mut self, material: &RawMaterialId, quantity: Decimal, unit: &str) {
        match self.line_mut(material) {
            Some(line) => line.quantity = clamped_add(line.quantity, quantity),
            None => self.lines.push(WorkingLine {
                material: material.clone(),
                quantity,
                unit: unit.to_string(),
            }),
        }
    }

    fn remove(&mut self, material: &RawMaterialId) -> Option<WorkingLine> {
        let index = self.lines.iter().position(|l| &l.material == material)?;
        Some(self.lines.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn m(id: &str) -> RawMaterialId {
        RawMaterialId::new(id)
    }

    fn seeded() -> WorkingBom {
        let mut bom = WorkingBom::new();
        bom.apply(&BomStep::Seed {
            material: m("leather"),
            quantity: dec!(1.0),
            unit: "m2".to_string(),
        });
        bom
    }

    #[test]
    fn test_modifiers_apply_to_existing_line() {
        let mut bom = seeded();
        bom.apply(&BomStep::Multiply {
            material: m("leather"),
            factor: dec!(1.4),
        });
        assert_eq!(bom.quantity(&m("leather")), Some(dec!(1.4)));

        bom.apply(&BomStep::Add {
            material: m("leather"),
            amount: dec!(0.25),
        });
        assert_eq!(bom.quantity(&m("leather")), Some(dec!(1.65)));

        bom.apply(&BomStep::Set {
            material: m("leather"),
            quantity: dec!(2),
        });
        assert_eq!(bom.quantity(&m("leather")), Some(dec!(2)));
    }

    #[test]
    fn test_modifier_on_missing_line_is_noop() {
        let mut bom = seeded();
        bom.apply(&BomStep::Multiply {
            material: m("canvas"),
            factor: dec!(3),
        });
        assert_eq!(bom.lines().len(), 1);
    }

    #[test]
    fn test_merge_sums() {
        let mut bom = seeded();
        bom.apply(&BomStep::Merge {
            material: m("leather"),
            quantity: dec!(0.5),
            unit: "m2".to_string(),
        });
        assert_eq!(bom.quantity(&m("leather")), Some(dec!(1.5)));
    }

    #[test]
    fn test_replace_uses_removed_quantity_when_unset() {
        let mut bom = seeded();
        bom.apply(&BomStep::Replace {
            from: m("leather"),
            to: m("vegan-leather"),
            quantity: None,
            unit: None,
        });
        assert_eq!(bom.quantity(&m("leather")), None);
        assert_eq!(bom.quantity(&m("vegan-leather")), Some(dec!(1.0)));
        assert_eq!(bom.lines()[0].unit, "m2");
    }

    #[test]
    fn test_replace_of_absent_material() {
        let mut bom = seeded();
        bom.apply(&BomStep::Replace {
            from: m("canvas"),
            to: m("cotton"),
            quantity: None,
            unit: None,
        });
        assert_eq!(bom, seeded());

        bom.apply(&BomStep::Replace {
            from: m("canvas"),
            to: m("cotton"),
            quantity: Some(dec!(2)),
            unit: Some("m".to_string()),
        });
        assert_eq!(bom.quantity(&m("cotton")), Some(dec!(2)));
    }

    #[test]
    fn test_overflowing_steps_clamp() {
        let steps: Vec<PlannedStep> = [
            BomStep::Seed {
                material: m("leather"),
                quantity: dec!(100000000000000),
                unit: "m2".to_string(),
            },
            BomStep::Multiply {
                material: m("leather"),
                factor: dec!(100000000000000),
            },
            BomStep::Multiply {
                material: m("leather"),
                factor: dec!(100000000000000),
            },
            BomStep::Merge {
                material: m("leather"),
                quantity: dec!(1),
                unit: "m2".to_string(),
            },
        ]
        .into_iter()
        .map(|step| PlannedStep {
            layer: Layer::OptionModifier,
            source: "m1".to_string(),
            step,
        })
        .collect();

        let bom = WorkingBom::fold(&steps);
        assert_eq!(bom.quantity(&m("leather")), Some(Decimal::MAX));
    }

    #[test]
    fn test_set_quantity_creates_line() {
        let mut bom = seeded();
        bom.apply(&BomStep::SetQuantity {
            material: m("rivets"),
            quantity: dec!(8),
            unit: Some("pcs".to_string()),
        });
        assert_eq!(bom.quantity(&m("rivets")), Some(dec!(8)));
    }

    #[test]
    fn test_fold_in_order() {
        let steps = vec![
            PlannedStep {
                layer: Layer::Baseline,
                source: "e1".to_string(),
                step: BomStep::Seed {
                    material: m("thread"),
                    quantity: dec!(3),
                    unit: "m".to_string(),
                },
            },
            PlannedStep {
                layer: Layer::VariantOverride,
                source: "o1".to_string(),
                step: BomStep::Remove {
                    material: m("thread"),
                },
            },
        ];
        let bom = WorkingBom::fold(&steps);
        assert!(bom.lines().is_empty());
    }
}
