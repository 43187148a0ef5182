//! Catalog rows.
//!
//! Contains products, attributes and options (product-specific and global),
//! generated variants, raw materials and typed metadata.

mod attribute;
mod material;
mod metadata;
mod product;
mod variant;

pub use attribute::{
    GlobalAttribute, GlobalAttributeOption, ProductAttribute, ProductAttributeOption,
    ProductGlobalAttributeLink, ProductGlobalOptionSelection,
};
pub use material::{MaterialDraw, RawMaterial};
pub use metadata::{
    validate_metadata, FieldDefinition, FieldScope, FieldType, FieldValue, MetadataMap,
};
pub use product::Product;
pub use variant::Variant;

pub(crate) fn default_true() -> bool {
    true
}
