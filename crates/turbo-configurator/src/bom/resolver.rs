//! Four-layer BOM resolution for one variant.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pipeline::{BomStep, Layer, PlannedStep, WorkingBom};
use super::rules::{BomRules, ModifierType, OverrideType, VariantBomOverride};
use crate::axis::AxisResolution;
use crate::catalog::Variant;
use crate::error::ConfiguratorError;
use crate::ids::{OptionRef, RawMaterialId, VariantId};
use crate::quantity::round_for_display;

/// A required material line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub raw_material_id: RawMaterialId,
    pub quantity: Decimal,
    pub unit: String,
}

/// The materials one unit of a variant needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBom {
    pub variant_id: VariantId,
    /// Lines with a non-zero quantity, in first-insertion order.
    pub lines: Vec<ResolvedLine>,
}

impl ResolvedBom {
    /// Material to quantity map.
    pub fn quantities(&self) -> BTreeMap<RawMaterialId, Decimal> {
        self.lines
            .iter()
            .map(|l| (l.raw_material_id.clone(), l.quantity))
            .collect()
    }

    pub fn quantity(&self, material: &RawMaterialId) -> Option<Decimal> {
        self.lines
            .iter()
            .find(|l| &l.raw_material_id == material)
            .map(|l| l.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Copy with every quantity rounded to `scale` places, for display or persistence.
    pub fn rounded(&self, scale: u32) -> ResolvedBom {
        ResolvedBom {
            variant_id: self.variant_id.clone(),
            lines: self
                .lines
                .iter()
                .map(|l| ResolvedLine {
                    quantity: round_for_display(l.quantity, scale),
                    ..l.clone()
                })
                .collect(),
        }
    }

    /// Quantities needed for `units` units.
    ///
    /// Fails with `InvalidQuantity` when a line's total is not representable.
    pub fn scaled(&self, units: u64) -> Result<Vec<ResolvedLine>, ConfiguratorError> {
        let factor = Decimal::from(units);
        self.lines
            .iter()
            .map(|l| {
                let quantity = l.quantity.checked_mul(factor).ok_or_else(|| {
                    ConfiguratorError::InvalidQuantity(format!(
                        "{} units need more {} than can be represented",
                        units, l.raw_material_id
                    ))
                })?;
                Ok(ResolvedLine {
                    quantity,
                    ..l.clone()
                })
            })
            .collect()
    }
}

/// Folds BOM rule layers into a [`ResolvedBom`].
///
/// Resolution is a pure function of the variant, its product's axes, the
/// product's rules and the variant's overrides.
#[derive(Debug, Default, Clone, Copy)]
pub struct BomResolver;

impl BomResolver {
    pub fn new() -> Self {
        Self
    }

    /// Build the ordered step list.
    ///
    /// Layer order is baseline, option modifiers, option additions, variant
    /// overrides. Within layers 2b and 2a, selected options are visited by axis
    /// position then option position, whatever order the variant lists them
    /// in. Options no longer on any axis come last, by canonical id.
    pub fn plan(
        &self,
        variant: &Variant,
        axes: &AxisResolution,
        rules: &BomRules,
        overrides: &[VariantBomOverride],
    ) -> Vec<PlannedStep> {
        let entries: Vec<_> = rules
            .entries
            .iter()
            .filter(|e| e.product_id == variant.product_id)
            .collect();

        let mut steps: Vec<PlannedStep> = entries
            .iter()
            .map(|e| PlannedStep {
                layer: Layer::Baseline,
                source: e.id.to_string(),
                step: BomStep::Seed {
                    material: e.raw_material_id.clone(),
                    quantity: e.quantity,
                    unit: e.unit.clone(),
                },
            })
            .collect();

        let options = ordered_options(&variant.selected_options, axes);

        for option in &options {
            for modifier in rules.modifiers.iter().filter(|m| &m.option == *option) {
                let Some(target) = entries
                    .iter()
                    .find(|e| e.id == modifier.product_bom_entry_id)
                else {
                    continue;
                };
                let material = target.raw_material_id.clone();
                let value = modifier.modifier_value;
                steps.push(PlannedStep {
                    layer: Layer::OptionModifier,
                    source: modifier.id.to_string(),
                    step: match modifier.modifier_type {
                        ModifierType::Multiply => BomStep::Multiply {
                            material,
                            factor: value,
                        },
                        ModifierType::Add => BomStep::Add {
                            material,
                            amount: value,
                        },
                        ModifierType::Set => BomStep::Set {
                            material,
                            quantity: value,
                        },
                    },
                });
            }
        }

        for option in &options {
            for addition in rules.option_entries.iter().filter(|a| &a.option == *option) {
                steps.push(PlannedStep {
                    layer: Layer::OptionAddition,
                    source: addition.id.to_string(),
                    step: BomStep::Merge {
                        material: addition.raw_material_id.clone(),
                        quantity: addition.quantity,
                        unit: addition.unit.clone(),
                    },
                });
            }
        }

        steps.extend(
            overrides
                .iter()
                .filter(|o| o.variant_id == variant.id)
                .filter_map(|o| {
                    override_step(o).map(|step| PlannedStep {
                        layer: Layer::VariantOverride,
                        source: o.id.to_string(),
                        step,
                    })
                }),
        );

        steps
    }

    /// Resolve the variant's materials. Lines that end at exactly zero are dropped.
    pub fn resolve(
        &self,
        variant: &Variant,
        axes: &AxisResolution,
        rules: &BomRules,
        overrides: &[VariantBomOverride],
    ) -> ResolvedBom {
        let steps = self.plan(variant, axes, rules, overrides);
        let lines = WorkingBom::fold(&steps)
            .into_lines()
            .into_iter()
            .filter(|l| !l.quantity.is_zero())
            .map(|l| ResolvedLine {
                raw_material_id: l.material,
                quantity: l.quantity,
                unit: l.unit,
            })
            .collect();

        ResolvedBom {
            variant_id: variant.id.clone(),
            lines,
        }
    }
}

fn ordered_options<'a>(selected: &'a [OptionRef], axes: &AxisResolution) -> Vec<&'a OptionRef> {
    let mut keyed: Vec<((usize, i32, String), &OptionRef)> = selected
        .iter()
        .map(|option| {
            let key = match axes.locate(option) {
                Some((axis, resolved)) => (axis, resolved.position, option.canonical()),
                None => (usize::MAX, i32::MAX, option.canonical()),
            };
            (key, option)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, option)| option).collect()
}

fn override_step(o: &VariantBomOverride) -> Option<BomStep> {
    let material = o.raw_material_id.clone();
    match o.override_type {
        OverrideType::Replace => Some(BomStep::Replace {
            from: o.replaces_material_id.clone()?,
            to: material,
            quantity: o.quantity,
            unit: o.unit.clone(),
        }),
        OverrideType::Add => Some(BomStep::Merge {
            material,
            quantity: o.quantity?,
            unit: o.unit.clone().unwrap_or_default(),
        }),
        OverrideType::Remove => Some(BomStep::Remove { material }),
        OverrideType::SetQuantity => Some(BomStep::SetQuantity {
            material,
            quantity: o.quantity?,
            unit: o.unit.clone(),
        }),
    }
}
