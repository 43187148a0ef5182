//! Storage contract.
//!
//! The configurator computes over data it does not own. [`CatalogStore`] is
//! what the resolvers and the generator read from, plus the two writes they
//! need. [`CatalogWriter`] is the authoring side used by
//! [`CatalogAdmin`](crate::admin::CatalogAdmin).

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::axis::AxisRows;
use crate::bom::{
    BomRules, OptionBomEntry, OptionBomModifier, ProductBomEntry, VariantBomOverride,
};
use crate::catalog::{
    FieldDefinition, GlobalAttribute, GlobalAttributeOption, MaterialDraw, Product,
    ProductAttribute, ProductAttributeOption, ProductGlobalAttributeLink,
    ProductGlobalOptionSelection, RawMaterial, Variant,
};
use crate::error::ConfiguratorError;
use crate::ids::{
    AttributeId, BomEntryId, GlobalAttributeId, GlobalLinkId, GlobalOptionId, ModifierId,
    OptionBomEntryId, OptionId, OverrideId, ProductId, RawMaterialId, VariantId,
};

#[cfg(feature = "storage")]
mod db;

#[cfg(feature = "storage")]
pub use db::DbCatalog;

/// Result of [`CatalogStore::insert_variants`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertReport {
    /// Rows committed by this call.
    pub inserted: Vec<Variant>,
    /// Rows skipped because a variant with the same identity already existed.
    pub already_present: usize,
}

/// Read side of the catalog, plus variant insertion and stock consumption.
pub trait CatalogStore: Send + Sync {
    /// `ProductNotFound` if absent.
    fn load_product(&self, product_id: &ProductId) -> Result<Product, ConfiguratorError>;

    /// Attribute rows for a product, including its global links and selections.
    fn load_axes(&self, product_id: &ProductId) -> Result<AxisRows, ConfiguratorError>;

    fn load_existing_variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Variant>, ConfiguratorError>;

    /// `VariantNotFound` if absent.
    fn load_variant(&self, variant_id: &VariantId) -> Result<Variant, ConfiguratorError>;

    /// Every SKU in use, across all products.
    fn load_taken_skus(&self) -> Result<Vec<String>, ConfiguratorError>;

    /// Layers 1, 2a and 2b for a product.
    fn load_bom_rules(&self, product_id: &ProductId) -> Result<BomRules, ConfiguratorError>;

    /// Layer 3 for a variant, in insertion order.
    fn load_variant_overrides(
        &self,
        variant_id: &VariantId,
    ) -> Result<Vec<VariantBomOverride>, ConfiguratorError>;

    /// Stock of the given materials. Unknown materials are left out.
    fn load_stock(
        &self,
        material_ids: &[RawMaterialId],
    ) -> Result<HashMap<RawMaterialId, Decimal>, ConfiguratorError>;

    fn load_field_definitions(&self) -> Result<Vec<FieldDefinition>, ConfiguratorError>;

    /// Insert a batch in one transaction.
    ///
    /// A row whose identity hash already exists is skipped. A row whose SKU is
    /// taken aborts the whole batch with `SkuConflict`.
    fn insert_variants(&self, batch: &[Variant]) -> Result<InsertReport, ConfiguratorError>;

    /// Decrement stock for every draw, or for none.
    ///
    /// Fails with `InsufficientStock` for the first draw that exceeds its
    /// material's stock; a material without a stock row has none.
    fn consume_stock(&self, draws: &[MaterialDraw]) -> Result<(), ConfiguratorError>;
}

/// Authoring writes. Validation lives in `CatalogAdmin`; implementations only
/// enforce storage constraints.
pub trait CatalogWriter: CatalogStore {
    fn put_product(&self, product: &Product) -> Result<(), ConfiguratorError>;
    fn put_attribute(&self, attribute: &ProductAttribute) -> Result<(), ConfiguratorError>;
    fn put_option(&self, option: &ProductAttributeOption) -> Result<(), ConfiguratorError>;
    fn put_global_attribute(&self, attribute: &GlobalAttribute) -> Result<(), ConfiguratorError>;
    fn put_global_option(&self, option: &GlobalAttributeOption) -> Result<(), ConfiguratorError>;
    fn put_global_link(&self, link: &ProductGlobalAttributeLink)
        -> Result<(), ConfiguratorError>;
    fn put_global_selection(
        &self,
        selection: &ProductGlobalOptionSelection,
    ) -> Result<(), ConfiguratorError>;
    fn put_raw_material(&self, material: &RawMaterial) -> Result<(), ConfiguratorError>;
    fn set_stock(&self, material_id: &RawMaterialId, quantity: Decimal)
        -> Result<(), ConfiguratorError>;
    fn put_field_definition(&self, definition: &FieldDefinition)
        -> Result<(), ConfiguratorError>;
    fn put_bom_entry(&self, entry: &ProductBomEntry) -> Result<(), ConfiguratorError>;
    fn put_option_bom_entry(&self, entry: &OptionBomEntry) -> Result<(), ConfiguratorError>;
    fn put_modifier(&self, modifier: &OptionBomModifier) -> Result<(), ConfiguratorError>;
    fn put_override(&self, item: &VariantBomOverride) -> Result<(), ConfiguratorError>;

    fn find_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Option<ProductAttribute>, ConfiguratorError>;
    fn find_option(&self, id: &OptionId)
        -> Result<Option<ProductAttributeOption>, ConfiguratorError>;
    fn find_global_attribute(
        &self,
        id: &GlobalAttributeId,
    ) -> Result<Option<GlobalAttribute>, ConfiguratorError>;
    fn find_global_option(
        &self,
        id: &GlobalOptionId,
    ) -> Result<Option<GlobalAttributeOption>, ConfiguratorError>;
    fn find_global_link(
        &self,
        id: &GlobalLinkId,
    ) -> Result<Option<ProductGlobalAttributeLink>, ConfiguratorError>;
    fn find_raw_material(
        &self,
        id: &RawMaterialId,
    ) -> Result<Option<RawMaterial>, ConfiguratorError>;
    fn find_bom_entry(&self, id: &BomEntryId)
        -> Result<Option<ProductBomEntry>, ConfiguratorError>;

    /// Delete a baseline entry and every modifier targeting it. Returns rows deleted.
    fn delete_bom_entry(&self, id: &BomEntryId) -> Result<usize, ConfiguratorError>;
    fn delete_option_bom_entry(&self, id: &OptionBomEntryId) -> Result<usize, ConfiguratorError>;
    fn delete_modifier(&self, id: &ModifierId) -> Result<usize, ConfiguratorError>;
    fn delete_override(&self, id: &OverrideId) -> Result<usize, ConfiguratorError>;
}
