//! Variant generation.
//!
//! Generation computes the Cartesian product of a product's axes, keeps the
//! combinations that have no variant yet, assigns SKUs and inserts the rest
//! in one transaction. It only ever adds variants.
//!
//! Idempotence rests on the unique identity hash in storage rather than on
//! any in-process lock: a concurrent generator that loses the race for a
//! combination sees its row skipped and treats it as already present.

mod identity;
mod sku;

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use turbo_observability::StructuredLogger;

use crate::axis::{Axis, AxisOption, AxisResolver};
use crate::catalog::{Product, Variant};
use crate::config::{GenerationConfig, SkuConfig};
use crate::error::ConfiguratorError;
use crate::events::{DomainEvent, EventSink};
use crate::ids::{OptionRef, ProductId, VariantId};
use crate::store::CatalogStore;

pub use identity::VariantIdentity;
pub use sku::{abbreviate, SkuAllocator};

/// Every combination of one option per axis, in axis order.
///
/// The first axis varies slowest.
pub fn cartesian(axes: &[Axis]) -> Vec<Vec<&AxisOption>> {
    axes.iter().fold(vec![Vec::new()], |combos, axis| {
        combos
            .iter()
            .flat_map(|prefix| {
                axis.options.iter().map(move |option| {
                    let mut next = prefix.clone();
                    next.push(option);
                    next
                })
            })
            .collect()
    })
}

/// What a generation run would insert.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPlan {
    /// Size of the Cartesian product.
    pub candidates: usize,
    /// Candidates that already have a variant.
    pub existing: usize,
    /// New variants, in candidate order.
    pub to_create: Vec<Variant>,
}

/// Diff the Cartesian product of `axes` against `existing` and build the
/// missing variants.
///
/// New variants have no fixed price or weight, zero stock, and positions
/// after the current maximum. SKUs avoid everything in `taken_skus`.
pub fn plan_generation(
    product: &Product,
    axes: &[Axis],
    existing: &[Variant],
    taken_skus: impl IntoIterator<Item = String>,
    config: &SkuConfig,
) -> Result<GenerationPlan, ConfiguratorError> {
    let known: HashSet<String> = existing
        .iter()
        .map(|v| VariantIdentity::of(&v.selected_options).hash().to_string())
        .collect();

    let mut next_position = existing
        .iter()
        .map(|v| v.position + 1)
        .max()
        .unwrap_or(0);

    let mut skus = SkuAllocator::new(config, taken_skus);
    let combos = cartesian(axes);
    let candidates = combos.len();
    let mut to_create = Vec::new();

    for combo in combos {
        let selected: Vec<OptionRef> = combo.iter().map(|o| o.option.clone()).collect();
        let identity = VariantIdentity::of(&selected);
        if known.contains(identity.hash()) {
            continue;
        }

        let values: Vec<&str> = combo.iter().map(|o| o.value.as_str()).collect();
        let sku = skus.allocate(&product.sku_prefix, &values)?;

        to_create.push(Variant {
            id: VariantId::generate(),
            product_id: product.id.clone(),
            sku,
            selected_options: selected,
            identity_hash: identity.hash().to_string(),
            price: None,
            weight: None,
            stock_quantity: 0,
            is_active: true,
            position: next_position,
            created_at: Utc::now(),
        });
        next_position += 1;
    }

    Ok(GenerationPlan {
        candidates,
        existing: candidates - to_create.len(),
        to_create,
    })
}

/// Result of [`VariantGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub product_id: ProductId,
    /// Variants this call created.
    pub created: Vec<Variant>,
    /// Combinations that already had a variant, including any created
    /// concurrently by another caller.
    pub existing: usize,
    /// Size of the Cartesian product.
    pub candidates: usize,
    /// Read-plan-insert attempts used.
    pub attempts: u32,
}

/// Runs generation against a [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct VariantGenerator {
    sku: SkuConfig,
    generation: GenerationConfig,
    logger: StructuredLogger,
}

impl VariantGenerator {
    pub fn new(sku: SkuConfig, generation: GenerationConfig, logger: StructuredLogger) -> Self {
        Self {
            sku,
            generation,
            logger,
        }
    }

    /// Create the variants `product_id` is missing.
    ///
    /// Validation errors are raised before anything is written. A SKU taken
    /// between planning and insert reruns the whole step, up to
    /// `generation.max_retries` times.
    pub fn generate(
        &self,
        store: &dyn CatalogStore,
        events: &dyn EventSink,
        product_id: &ProductId,
    ) -> Result<GenerationOutcome, ConfiguratorError> {
        let max_attempts = self.generation.max_retries.saturating_add(1);

        for attempt in 1..=max_attempts {
            let product = store.load_product(product_id)?;
            let rows = store.load_axes(product_id)?;
            let axes = AxisResolver::new()
                .resolve(product_id, &rows)?
                .require_axes(product_id)?;
            let existing = store.load_existing_variants(product_id)?;
            let taken = store.load_taken_skus()?;

            let plan = plan_generation(&product, &axes, &existing, taken, &self.sku)?;

            if plan.to_create.is_empty() {
                self.logger
                    .debug_builder("variants up to date")
                    .field("product_id", product_id.as_str())
                    .field_i64("candidates", plan.candidates as i64)
                    .emit();
                return Ok(GenerationOutcome {
                    product_id: product_id.clone(),
                    created: Vec::new(),
                    existing: plan.existing,
                    candidates: plan.candidates,
                    attempts: attempt,
                });
            }

            match store.insert_variants(&plan.to_create) {
                Ok(report) => {
                    let created = report.inserted;
                    if !created.is_empty() {
                        events.emit(DomainEvent::VariantsGenerated {
                            product_id: product_id.clone(),
                            variant_ids: created.iter().map(|v| v.id.clone()).collect(),
                            occurred_at: Utc::now(),
                        });
                    }

                    self.logger
                        .info_builder("variants generated")
                        .field("product_id", product_id.as_str())
                        .field_i64("created", created.len() as i64)
                        .field_i64("already_present", report.already_present as i64)
                        .field_i64("candidates", plan.candidates as i64)
                        .field_i64("attempt", attempt as i64)
                        .emit();

                    return Ok(GenerationOutcome {
                        product_id: product_id.clone(),
                        existing: plan.candidates - created.len(),
                        created,
                        candidates: plan.candidates,
                        attempts: attempt,
                    });
                }
                Err(ConfiguratorError::SkuConflict(sku)) => {
                    self.logger
                        .warn_builder("sku taken during generation, retrying")
                        .field("product_id", product_id.as_str())
                        .field("sku", sku)
                        .field_i64("attempt", attempt as i64)
                        .emit();
                }
                Err(e) => return Err(e),
            }
        }

        self.logger
            .error_builder("variant generation gave up")
            .field("product_id", product_id.as_str())
            .field_i64("attempts", max_attempts as i64)
            .emit();

        Err(ConfiguratorError::GenerationContention {
            product_id: product_id.to_string(),
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::AxisSource;
    use crate::ids::{AttributeId, OptionId};
    use rust_decimal::Decimal;

    fn axis(key: &str, position: i32, values: &[&str]) -> Axis {
        Axis {
            source: AxisSource::Product {
                attribute_id: AttributeId::new(key),
            },
            key: key.to_string(),
            display_name: key.to_string(),
            position,
            options: values
                .iter()
                .enumerate()
                .map(|(i, v)| AxisOption {
                    option: OptionRef::Product(OptionId::new(*v)),
                    value: v.to_string(),
                    display_value: v.to_string(),
                    price_modifier: None,
                    weight_modifier: None,
                    position: i as i32,
                })
                .collect(),
        }
    }

    fn product() -> Product {
        Product::new("Tote", "TOTE").with_id("tote")
    }

    #[test]
    fn test_cartesian_product() {
        let axes = vec![
            axis("color", 0, &["black", "tan", "olive"]),
            axis("size", 1, &["small", "large"]),
        ];
        let combos = cartesian(&axes);
        assert_eq!(combos.len(), 6);
        assert_eq!(combos[0][0].value, "black");
        assert_eq!(combos[0][1].value, "small");
        assert_eq!(combos[1][1].value, "large");
        assert!(cartesian(&[]).len() == 1);
    }

    #[test]
    fn test_plan_creates_all_then_nothing() {
        let axes = vec![
            axis("color", 0, &["black", "tan", "olive"]),
            axis("size", 1, &["small", "large"]),
        ];
        let config = SkuConfig::default();

        let plan = plan_generation(&product(), &axes, &[], Vec::new(), &config).unwrap();
        assert_eq!(plan.to_create.len(), 6);
        assert_eq!(plan.to_create[0].sku, "TOTE-BLA-SMA");
        assert_eq!(plan.to_create[5].position, 5);
        assert!(plan.to_create.iter().all(|v| v.price.is_none() && v.stock_quantity == 0));

        let again = plan_generation(&product(), &axes, &plan.to_create, Vec::new(), &config)
            .unwrap();
        assert!(again.to_create.is_empty());
        assert_eq!(again.existing, 6);
    }

    #[test]
    fn test_plan_recognizes_reordered_axes() {
        let color = axis("color", 0, &["black"]);
        let size = axis("size", 1, &["small", "large"]);
        let config = SkuConfig::default();

        let first =
            plan_generation(&product(), &[color.clone(), size.clone()], &[], Vec::new(), &config)
                .unwrap();
        let reordered =
            plan_generation(&product(), &[size, color], &first.to_create, Vec::new(), &config)
                .unwrap();
        assert!(reordered.to_create.is_empty());
    }

    #[test]
    fn test_plan_skus_unique_under_collisions() {
        let axes = vec![axis("finish", 0, &["black", "blank", "blacken"])];
        let taken = vec!["TOTE-BLA".to_string()];
        let plan = plan_generation(&product(), &axes, &[], taken, &SkuConfig::default()).unwrap();

        let skus: Vec<&str> = plan.to_create.iter().map(|v| v.sku.as_str()).collect();
        assert_eq!(skus, vec!["TOTE-BLA-2", "TOTE-BLA-3", "TOTE-BLA-4"]);
    }

    #[test]
    fn test_plan_positions_follow_existing() {
        let axes = vec![axis("color", 0, &["black", "tan"])];
        let config = SkuConfig::default();
        let mut first = plan_generation(&product(), &axes[..], &[], Vec::new(), &config)
            .unwrap()
            .to_create;
        first.truncate(1);
        first[0].position = 7;
        first[0].price = Some(Decimal::ONE);

        let plan = plan_generation(&product(), &axes, &first, Vec::new(), &config).unwrap();
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].position, 8);
    }
}
