//! Product configuration for made-to-order goods.
//!
//! This crate turns a product's attributes into sellable variants and works
//! out what each variant is made of:
//!
//! - **Axes**: product attributes and linked global attributes, resolved
//!   into an ordered list of option sets
//! - **Generation**: the Cartesian product of the axes, inserted as variants
//!   with unique SKUs; rerunning only fills gaps
//! - **BOM**: baseline entries, option modifiers and additions, and
//!   per-variant overrides folded into a material list
//! - **Producibility**: how many units current stock supports
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_configurator::prelude::*;
//!
//! let store = DbCatalog::open_in_memory()?;
//! let admin = CatalogAdmin::new(store.clone(), StructuredLogger::discard());
//! admin.create_product(&Product::new("Tote", "TOTE").with_id("tote"))?;
//! // ... attributes, options, BOM rules ...
//!
//! let service = ConfiguratorService::new(store, ConfiguratorConfig::default(), StructuredLogger::stderr());
//! let outcome = service.generate_variants(&ProductId::new("tote"))?;
//! for variant in &outcome.created {
//!     println!("{} -> {}", variant.sku, service.compute_producibility(&variant.id)?);
//! }
//! ```

pub mod admin;
pub mod axis;
pub mod bom;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod ids;
pub mod pricing;
pub mod producibility;
pub mod quantity;
pub mod service;
pub mod store;

pub use admin::CatalogAdmin;
pub use config::ConfiguratorConfig;
pub use error::ConfiguratorError;
pub use ids::*;
pub use service::ConfiguratorService;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::admin::CatalogAdmin;
    pub use crate::config::{ConfiguratorConfig, GenerationConfig, ResolutionConfig, SkuConfig};
    pub use crate::error::ConfiguratorError;
    pub use crate::events::{DomainEvent, EventSink, MemoryEventSink, NullEventSink};
    pub use crate::ids::*;
    pub use crate::service::ConfiguratorService;

    // Catalog
    pub use crate::catalog::{
        FieldDefinition, FieldScope, FieldType, FieldValue, GlobalAttribute,
        GlobalAttributeOption, MaterialDraw, MetadataMap, Product, ProductAttribute,
        ProductAttributeOption, ProductGlobalAttributeLink, ProductGlobalOptionSelection,
        RawMaterial, Variant,
    };

    // Resolution
    pub use crate::axis::{Axis, AxisOption, AxisResolution, AxisResolver, AxisSource};
    pub use crate::bom::{
        BomResolver, ModifierType, OptionBomEntry, OptionBomModifier, OverrideType,
        ProductBomEntry, ResolvedBom, ResolvedLine, VariantBomOverride,
    };
    pub use crate::generator::{GenerationOutcome, VariantGenerator, VariantIdentity};
    pub use crate::pricing::VariantPricing;
    pub use crate::producibility::{Producibility, ProducibilityReport};

    // Storage
    pub use crate::store::{CatalogStore, CatalogWriter};
    #[cfg(feature = "storage")]
    pub use crate::store::DbCatalog;

    pub use turbo_observability::StructuredLogger;
}
