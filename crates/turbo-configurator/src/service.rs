//! Operations exposed to callers.

use std::sync::Arc;

use chrono::Utc;
use turbo_observability::{OperationId, StructuredLogger};

use crate::axis::{AxisResolution, AxisResolver};
use crate::bom::{BomResolver, ResolvedBom};
use crate::catalog::MaterialDraw;
use crate::config::ConfiguratorConfig;
use crate::error::ConfiguratorError;
use crate::events::{DomainEvent, EventSink, NullEventSink};
use crate::generator::{GenerationOutcome, VariantGenerator};
use crate::ids::{ProductId, RawMaterialId, VariantId};
use crate::pricing::{variant_pricing, VariantPricing};
use crate::producibility::{producibility_report, Producibility, ProducibilityReport};
use crate::store::CatalogStore;

/// Entry point tying a store, configuration, logger and event sink together.
///
/// Each call logs under a fresh operation id.
pub struct ConfiguratorService<S> {
    store: S,
    config: ConfiguratorConfig,
    logger: StructuredLogger,
    events: Arc<dyn EventSink>,
}

impl<S: CatalogStore> ConfiguratorService<S> {
    pub fn new(store: S, config: ConfiguratorConfig, logger: StructuredLogger) -> Self {
        Self {
            store,
            config,
            logger,
            events: Arc::new(NullEventSink),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ConfiguratorConfig {
        &self.config
    }

    /// Ordered axes of a product.
    pub fn resolve_axes(&self, product_id: &ProductId) -> Result<AxisResolution, ConfiguratorError> {
        let rows = self.store.load_axes(product_id)?;
        AxisResolver::new().resolve(product_id, &rows)
    }

    /// Create the variants a product is missing. Idempotent.
    pub fn generate_variants(
        &self,
        product_id: &ProductId,
    ) -> Result<GenerationOutcome, ConfiguratorError> {
        let logger = self.operation_logger("generator");
        let generator = VariantGenerator::new(
            self.config.sku.clone(),
            self.config.generation.clone(),
            logger.clone(),
        );

        generator
            .generate(&self.store, self.events.as_ref(), product_id)
            .inspect_err(|e| {
                logger
                    .warn_builder("variant generation failed")
                    .field("product_id", product_id.as_str())
                    .field_display("error", e)
                    .emit();
            })
    }

    /// Materials one unit of a variant needs, at full precision.
    pub fn resolve_bom(&self, variant_id: &VariantId) -> Result<ResolvedBom, ConfiguratorError> {
        let variant = self.store.load_variant(variant_id)?;
        let axes = self.resolve_axes(&variant.product_id)?;
        let rules = self.store.load_bom_rules(&variant.product_id)?;
        let overrides = self.store.load_variant_overrides(variant_id)?;

        let bom = BomResolver::new().resolve(&variant, &axes, &rules, &overrides);

        self.operation_logger("bom")
            .debug_builder("bom resolved")
            .field("variant_id", variant_id.as_str())
            .field_i64("lines", bom.lines.len() as i64)
            .emit();

        Ok(bom)
    }

    /// Units buildable from current stock.
    pub fn compute_producibility(
        &self,
        variant_id: &VariantId,
    ) -> Result<Producibility, ConfiguratorError> {
        Ok(self.producibility_report(variant_id)?.producibility)
    }

    /// Producibility with its per-material breakdown.
    pub fn producibility_report(
        &self,
        variant_id: &VariantId,
    ) -> Result<ProducibilityReport, ConfiguratorError> {
        let bom = self.resolve_bom(variant_id)?;
        let materials: Vec<RawMaterialId> =
            bom.lines.iter().map(|l| l.raw_material_id.clone()).collect();
        let stock = self.store.load_stock(&materials)?;

        let report = producibility_report(
            bom.lines.iter().map(|l| (&l.raw_material_id, l.quantity)),
            &stock,
        );

        let missing: Vec<&str> = report
            .materials
            .iter()
            .filter(|m| m.missing)
            .map(|m| m.raw_material_id.as_str())
            .collect();
        if !missing.is_empty() {
            self.operation_logger("producibility")
                .warn_builder("stock missing for required materials")
                .field("variant_id", variant_id.as_str())
                .field("materials", missing.join(","))
                .emit();
        }

        Ok(report)
    }

    /// Effective price and weight of a variant.
    pub fn variant_pricing(
        &self,
        variant_id: &VariantId,
    ) -> Result<VariantPricing, ConfiguratorError> {
        let variant = self.store.load_variant(variant_id)?;
        let product = self.store.load_product(&variant.product_id)?;
        let axes = self.resolve_axes(&variant.product_id)?;
        Ok(variant_pricing(&product, &variant, &axes))
    }

    /// Draw the materials for `units` units of a variant from stock.
    ///
    /// All draws happen or none do.
    pub fn consume_for_production(
        &self,
        variant_id: &VariantId,
        units: u64,
    ) -> Result<Vec<MaterialDraw>, ConfiguratorError> {
        if units == 0 {
            return Err(ConfiguratorError::InvalidQuantity(
                "production batch needs at least one unit".to_string(),
            ));
        }

        let bom = self.resolve_bom(variant_id)?;
        let draws: Vec<MaterialDraw> = bom
            .scaled(units)?
            .into_iter()
            .map(|l| MaterialDraw {
                raw_material_id: l.raw_material_id,
                quantity: l.quantity,
            })
            .collect();

        self.store.consume_stock(&draws)?;

        self.operation_logger("production")
            .info_builder("stock consumed")
            .field("variant_id", variant_id.as_str())
            .field_i64("units", units as i64)
            .field_json("draws", &draws)
            .emit();

        self.events.emit(DomainEvent::StockConsumed {
            variant_id: variant_id.clone(),
            units,
            draws: draws.clone(),
            occurred_at: Utc::now(),
        });

        Ok(draws)
    }

    fn operation_logger(&self, component: &str) -> StructuredLogger {
        self.logger
            .child(component)
            .with_operation_id(OperationId::generate())
    }
}

#[cfg(all(test, feature = "storage"))]
mod tests {
    use super::*;
    use crate::store::DbCatalog;

    #[test]
    fn test_unknown_product_and_variant() {
        let service = ConfiguratorService::new(
            DbCatalog::open_in_memory().unwrap(),
            ConfiguratorConfig::default(),
            StructuredLogger::discard(),
        );

        assert!(matches!(
            service.generate_variants(&ProductId::new("missing")),
            Err(ConfiguratorError::ProductNotFound(_))
        ));
        assert!(matches!(
            service.resolve_bom(&VariantId::new("missing")),
            Err(ConfiguratorError::VariantNotFound(_))
        ));
    }

    #[test]
    fn test_zero_unit_batch_rejected() {
        let service = ConfiguratorService::new(
            DbCatalog::open_in_memory().unwrap(),
            ConfiguratorConfig::default(),
            StructuredLogger::discard(),
        );
        assert!(matches!(
            service.consume_for_production(&VariantId::new("v"), 0),
            Err(ConfiguratorError::InvalidQuantity(_))
        ));
    }
}
