//! Catalog authoring with write-time validation.
//!
//! Malformed rule data is rejected here, when it is written, so that
//! resolution never has to fail on it.

use rust_decimal::Decimal;
use turbo_observability::StructuredLogger;

use crate::bom::{
    OptionBomEntry, OptionBomModifier, OverrideType, ProductBomEntry, VariantBomOverride,
};
use crate::catalog::{
    validate_metadata, FieldDefinition, FieldScope, FieldType, GlobalAttribute,
    GlobalAttributeOption, MetadataMap, Product, ProductAttribute, ProductAttributeOption,
    ProductGlobalAttributeLink, ProductGlobalOptionSelection, RawMaterial, Variant,
};
use crate::error::ConfiguratorError;
use crate::generator::VariantIdentity;
use crate::ids::{
    BomEntryId, ModifierId, OptionBomEntryId, OptionRef, OverrideId, ProductId, RawMaterialId,
};
use crate::quantity::ensure_non_negative;
use crate::store::{CatalogWriter, InsertReport};

/// Validating front of a [`CatalogWriter`].
#[derive(Debug, Clone)]
pub struct CatalogAdmin<W> {
    store: W,
    logger: StructuredLogger,
}

impl<W: CatalogWriter> CatalogAdmin<W> {
    pub fn new(store: W, logger: StructuredLogger) -> Self {
        Self { store, logger }
    }

    pub fn store(&self) -> &W {
        &self.store
    }

    pub fn create_product(&self, product: &Product) -> Result<(), ConfiguratorError> {
        self.check_metadata(FieldScope::Product, &product.metadata)?;
        self.store.put_product(product)
    }

    /// Add a product attribute. Its key must not clash with another axis of
    /// the product, product-specific or linked.
    pub fn add_attribute(&self, attribute: &ProductAttribute) -> Result<(), ConfiguratorError> {
        self.store.load_product(&attribute.product_id)?;
        self.check_axis_key(&attribute.product_id, &attribute.key, Some(attribute.id.as_str()))?;
        self.store.put_attribute(attribute)
    }

    pub fn add_option(&self, option: &ProductAttributeOption) -> Result<(), ConfiguratorError> {
        if self.store.find_attribute(&option.attribute_id)?.is_none() {
            return Err(ConfiguratorError::AttributeNotFound(
                option.attribute_id.to_string(),
            ));
        }
        self.check_metadata(FieldScope::Option, &option.metadata)?;
        self.store.put_option(option)
    }

    pub fn add_global_attribute(
        &self,
        attribute: &GlobalAttribute,
    ) -> Result<(), ConfiguratorError> {
        self.store.put_global_attribute(attribute)
    }

    pub fn add_global_option(
        &self,
        option: &GlobalAttributeOption,
    ) -> Result<(), ConfiguratorError> {
        if self
            .store
            .find_global_attribute(&option.global_attribute_id)?
            .is_none()
        {
            return Err(ConfiguratorError::AttributeNotFound(
                option.global_attribute_id.to_string(),
            ));
        }
        self.check_metadata(FieldScope::Option, &option.metadata)?;
        self.store.put_global_option(option)
    }

    pub fn link_global_attribute(
        &self,
        link: &ProductGlobalAttributeLink,
    ) -> Result<(), ConfiguratorError> {
        self.store.load_product(&link.product_id)?;
        let global = self
            .store
            .find_global_attribute(&link.global_attribute_id)?
            .ok_or_else(|| {
                ConfiguratorError::AttributeNotFound(link.global_attribute_id.to_string())
            })?;
        self.check_axis_key(&link.product_id, &global.key, Some(link.id.as_str()))?;
        self.store.put_global_link(link)
    }

    /// Restrict a link to a global option, optionally overriding its deltas.
    pub fn select_global_option(
        &self,
        selection: &ProductGlobalOptionSelection,
    ) -> Result<(), ConfiguratorError> {
        let link = self
            .store
            .find_global_link(&selection.link_id)?
            .ok_or_else(|| {
                ConfiguratorError::AttributeNotFound(format!("global link {}", selection.link_id))
            })?;
        let option = self
            .store
            .find_global_option(&selection.global_option_id)?
            .ok_or_else(|| {
                ConfiguratorError::OptionNotFound(selection.global_option_id.to_string())
            })?;
        if option.global_attribute_id != link.global_attribute_id {
            return Err(ConfiguratorError::OptionNotFound(format!(
                "{} is not an option of global attribute {}",
                option.id, link.global_attribute_id
            )));
        }
        self.store.put_global_selection(selection)
    }

    pub fn add_raw_material(&self, material: &RawMaterial) -> Result<(), ConfiguratorError> {
        ensure_non_negative("stock_quantity", material.stock_quantity)?;
        self.store.put_raw_material(material)
    }

    pub fn set_stock(
        &self,
        material_id: &RawMaterialId,
        quantity: Decimal,
    ) -> Result<(), ConfiguratorError> {
        ensure_non_negative("stock_quantity", quantity)?;
        self.store.set_stock(material_id, quantity)
    }

    pub fn define_field(&self, definition: &FieldDefinition) -> Result<(), ConfiguratorError> {
        if let FieldType::Select { choices } = &definition.field_type {
            if choices.is_empty() {
                return Err(ConfiguratorError::InvalidMetadata {
                    field: definition.key.clone(),
                    reason: "select field needs at least one choice".to_string(),
                });
            }
        }
        self.store.put_field_definition(definition)
    }

    /// Add a Layer 1 line.
    pub fn add_bom_entry(&self, entry: &ProductBomEntry) -> Result<(), ConfiguratorError> {
        ensure_non_negative("quantity", entry.quantity)?;
        self.store.load_product(&entry.product_id)?;
        self.require_material(&entry.raw_material_id)?;
        self.store.put_bom_entry(entry)
    }

    /// Add a Layer 2a line.
    pub fn add_option_bom_entry(&self, entry: &OptionBomEntry) -> Result<(), ConfiguratorError> {
        ensure_non_negative("quantity", entry.quantity)?;
        self.require_option(&entry.option)?;
        self.require_material(&entry.raw_material_id)?;
        self.store.put_option_bom_entry(entry)
    }

    /// Add a Layer 2b modifier.
    ///
    /// The target entry must belong to the option's product. For a global
    /// option, the entry's product must link the option's global attribute.
    pub fn add_modifier(&self, modifier: &OptionBomModifier) -> Result<(), ConfiguratorError> {
        ensure_non_negative("modifier_value", modifier.modifier_value)?;

        let entry = self
            .store
            .find_bom_entry(&modifier.product_bom_entry_id)?
            .ok_or_else(|| {
                ConfiguratorError::BomEntryNotFound(modifier.product_bom_entry_id.to_string())
            })?;

        let invalid = |reason: String| ConfiguratorError::InvalidModifierReference {
            option: modifier.option.to_string(),
            entry_id: entry.id.to_string(),
            reason,
        };

        match &modifier.option {
            OptionRef::Product(id) => {
                let option = self
                    .store
                    .find_option(id)?
                    .ok_or_else(|| ConfiguratorError::OptionNotFound(id.to_string()))?;
                let attribute = self
                    .store
                    .find_attribute(&option.attribute_id)?
                    .ok_or_else(|| {
                        ConfiguratorError::AttributeNotFound(option.attribute_id.to_string())
                    })?;
                if attribute.product_id != entry.product_id {
                    return Err(invalid(format!(
                        "entry belongs to product {}, option to product {}",
                        entry.product_id, attribute.product_id
                    )));
                }
            }
            OptionRef::Global(id) => {
                let option = self
                    .store
                    .find_global_option(id)?
                    .ok_or_else(|| ConfiguratorError::OptionNotFound(id.to_string()))?;
                let linked = self
                    .store
                    .load_axes(&entry.product_id)?
                    .links
                    .iter()
                    .any(|l| l.global_attribute_id == option.global_attribute_id);
                if !linked {
                    return Err(invalid(format!(
                        "product {} does not link global attribute {}",
                        entry.product_id, option.global_attribute_id
                    )));
                }
            }
        }

        self.store.put_modifier(modifier)
    }

    /// Add a Layer 3 override.
    pub fn add_override(&self, item: &VariantBomOverride) -> Result<(), ConfiguratorError> {
        if let Some(quantity) = item.quantity {
            ensure_non_negative("quantity", quantity)?;
        }
        self.store.load_variant(&item.variant_id)?;

        match item.override_type {
            OverrideType::Replace => {
                if item.replaces_material_id.is_none() {
                    return Err(ConfiguratorError::InvalidOverride(format!(
                        "replace override {} needs replaces_material_id",
                        item.id
                    )));
                }
                self.require_material(&item.raw_material_id)?;
            }
            OverrideType::Add | OverrideType::SetQuantity => {
                if item.quantity.is_none() {
                    return Err(ConfiguratorError::InvalidOverride(format!(
                        "{} override {} needs a quantity",
                        item.override_type.as_str(),
                        item.id
                    )));
                }
                self.require_material(&item.raw_material_id)?;
            }
            OverrideType::Remove => {}
        }

        self.store.put_override(item)
    }

    /// Load variants that were generated earlier, e.g. from a saved catalog.
    ///
    /// Each variant's identity hash must match its option set.
    pub fn import_variants(&self, variants: &[Variant]) -> Result<InsertReport, ConfiguratorError> {
        for variant in variants {
            self.store.load_product(&variant.product_id)?;
            for option in &variant.selected_options {
                self.require_option(option)?;
            }
            if VariantIdentity::of(&variant.selected_options).hash() != variant.identity_hash {
                return Err(ConfiguratorError::InvalidVariant(format!(
                    "{} identity hash does not match its options",
                    variant.id
                )));
            }
        }
        self.store.insert_variants(variants)
    }

    /// Delete a Layer 1 line together with the modifiers that target it.
    pub fn delete_bom_entry(&self, id: &BomEntryId) -> Result<usize, ConfiguratorError> {
        let deleted = self.store.delete_bom_entry(id)?;
        if deleted == 0 {
            return Err(ConfiguratorError::BomEntryNotFound(id.to_string()));
        }
        self.logger
            .info_builder("bom entry deleted")
            .field("entry_id", id.as_str())
            .field_i64("rows", deleted as i64)
            .emit();
        Ok(deleted)
    }

    pub fn delete_option_bom_entry(
        &self,
        id: &OptionBomEntryId,
    ) -> Result<usize, ConfiguratorError> {
        self.store.delete_option_bom_entry(id)
    }

    pub fn delete_modifier(&self, id: &ModifierId) -> Result<usize, ConfiguratorError> {
        self.store.delete_modifier(id)
    }

    pub fn delete_override(&self, id: &OverrideId) -> Result<usize, ConfiguratorError> {
        self.store.delete_override(id)
    }

    fn check_metadata(
        &self,
        scope: FieldScope,
        metadata: &MetadataMap,
    ) -> Result<(), ConfiguratorError> {
        let definitions = self.store.load_field_definitions()?;
        validate_metadata(&definitions, scope, metadata)
    }

    /// Reject `key` if another axis of the product already uses it. `own_id`
    /// is the id of the row being written, which may already exist.
    fn check_axis_key(
        &self,
        product_id: &ProductId,
        key: &str,
        own_id: Option<&str>,
    ) -> Result<(), ConfiguratorError> {
        let rows = self.store.load_axes(product_id)?;
        let normalized = key.trim().to_lowercase();

        let attribute_keys = rows
            .attributes
            .iter()
            .filter(|a| Some(a.id.as_str()) != own_id)
            .map(|a| a.key.as_str());
        let linked_keys = rows
            .links
            .iter()
            .filter(|l| Some(l.id.as_str()) != own_id)
            .filter_map(|l| {
                rows.global_attributes
                    .iter()
                    .find(|g| g.id == l.global_attribute_id)
                    .map(|g| g.key.as_str())
            });

        if attribute_keys
            .chain(linked_keys)
            .any(|k| k.trim().to_lowercase() == normalized)
        {
            return Err(ConfiguratorError::DuplicateAxisKey {
                product_id: product_id.to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    fn require_material(&self, id: &RawMaterialId) -> Result<(), ConfiguratorError> {
        match self.store.find_raw_material(id)? {
            Some(_) => Ok(()),
            None => Err(ConfiguratorError::MaterialNotFound(id.to_string())),
        }
    }

    fn require_option(&self, option: &OptionRef) -> Result<(), ConfiguratorError> {
        let found = match option {
            OptionRef::Product(id) => self.store.find_option(id)?.is_some(),
            OptionRef::Global(id) => self.store.find_global_option(id)?.is_some(),
        };
        if found {
            Ok(())
        } else {
            Err(ConfiguratorError::OptionNotFound(option.to_string()))
        }
    }
}

#[cfg(all(test, feature = "storage"))]
mod tests {
    use super::*;
    use crate::ids::{AttributeId, OptionId, VariantId};
    use crate::store::{CatalogStore, DbCatalog};
    use rust_decimal_macros::dec;

    fn admin() -> CatalogAdmin<DbCatalog> {
        CatalogAdmin::new(DbCatalog::open_in_memory().unwrap(), StructuredLogger::discard())
    }

    fn seed_product(admin: &CatalogAdmin<DbCatalog>, id: &str) {
        admin
            .create_product(&Product::new(id, id.to_uppercase()).with_id(id))
            .unwrap();
        admin
            .add_attribute(&ProductAttribute {
                id: AttributeId::new(format!("{id}-color")),
                product_id: ProductId::new(id),
                key: "color".to_string(),
                display_name: "Color".to_string(),
                position: 0,
                is_active: true,
            })
            .unwrap();
        admin
            .add_option(&ProductAttributeOption {
                id: OptionId::new(format!("{id}-black")),
                attribute_id: AttributeId::new(format!("{id}-color")),
                value: "black".to_string(),
                display_value: "Black".to_string(),
                price_modifier: None,
                weight_modifier: None,
                position: 0,
                is_active: true,
                metadata: MetadataMap::new(),
            })
            .unwrap();
    }

    fn entry(id: &str, product: &str, material: &str) -> ProductBomEntry {
        ProductBomEntry {
            id: BomEntryId::new(id),
            product_id: ProductId::new(product),
            raw_material_id: RawMaterialId::new(material),
            quantity: dec!(2),
            unit: "m".to_string(),
            is_required: true,
        }
    }

    #[test]
    fn test_duplicate_axis_key_rejected() {
        let admin = admin();
        seed_product(&admin, "tote");

        let err = admin
            .add_attribute(&ProductAttribute {
                id: AttributeId::new("tote-color-2"),
                product_id: ProductId::new("tote"),
                key: " Color ".to_string(),
                display_name: "Colour".to_string(),
                position: 1,
                is_active: true,
            })
            .unwrap_err();
        assert!(matches!(err, ConfiguratorError::DuplicateAxisKey { .. }));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let admin = admin();
        seed_product(&admin, "tote");
        admin
            .add_raw_material(&RawMaterial::new("canvas", "m", dec!(10)))
            .unwrap();

        let mut bad = entry("e1", "tote", "canvas");
        bad.quantity = dec!(-1);
        assert!(matches!(
            admin.add_bom_entry(&bad),
            Err(ConfiguratorError::NegativeQuantity { .. })
        ));
        assert!(admin
            .add_raw_material(&RawMaterial::new("thread", "m", dec!(-0.5)))
            .is_err());
    }

    #[test]
    fn test_modifier_must_share_product() {
        let admin = admin();
        seed_product(&admin, "tote");
        seed_product(&admin, "duffel");
        admin
            .add_raw_material(&RawMaterial::new("canvas", "m", dec!(10)))
            .unwrap();
        admin.add_bom_entry(&entry("e1", "tote", "canvas")).unwrap();

        let err = admin
            .add_modifier(&OptionBomModifier {
                id: ModifierId::new("m1"),
                option: OptionRef::Product(OptionId::new("duffel-black")),
                product_bom_entry_id: BomEntryId::new("e1"),
                modifier_type: crate::bom::ModifierType::Multiply,
                modifier_value: dec!(1.4),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            ConfiguratorError::InvalidModifierReference { .. }
        ));

        admin
            .add_modifier(&OptionBomModifier {
                id: ModifierId::new("m2"),
                option: OptionRef::Product(OptionId::new("tote-black")),
                product_bom_entry_id: BomEntryId::new("e1"),
                modifier_type: crate::bom::ModifierType::Multiply,
                modifier_value: dec!(1.4),
            })
            .unwrap();
        assert_eq!(
            admin.store().load_bom_rules(&ProductId::new("tote")).unwrap().modifiers.len(),
            1
        );
    }

    #[test]
    fn test_override_shape_checked() {
        let admin = admin();
        seed_product(&admin, "tote");
        admin
            .add_raw_material(&RawMaterial::new("leather", "m", dec!(10)))
            .unwrap();

        let variant = {
            let options = vec![OptionRef::Product(OptionId::new("tote-black"))];
            let identity = VariantIdentity::of(&options);
            Variant {
                id: VariantId::new("v1"),
                product_id: ProductId::new("tote"),
                sku: "TOTE-BLA".to_string(),
                selected_options: options,
                identity_hash: identity.hash().to_string(),
                price: None,
                weight: None,
                stock_quantity: 0,
                is_active: true,
                position: 0,
                created_at: chrono::Utc::now(),
            }
        };
        assert_eq!(admin.import_variants(&[variant]).unwrap().inserted.len(), 1);

        let replace = VariantBomOverride {
            id: OverrideId::new("o1"),
            variant_id: VariantId::new("v1"),
            raw_material_id: RawMaterialId::new("leather"),
            override_type: OverrideType::Replace,
            replaces_material_id: None,
            quantity: None,
            unit: None,
        };
        assert!(matches!(
            admin.add_override(&replace),
            Err(ConfiguratorError::InvalidOverride(_))
        ));

        let set = VariantBomOverride {
            override_type: OverrideType::SetQuantity,
            ..replace.clone()
        };
        assert!(matches!(
            admin.add_override(&set),
            Err(ConfiguratorError::InvalidOverride(_))
        ));

        let remove = VariantBomOverride {
            override_type: OverrideType::Remove,
            raw_material_id: RawMaterialId::new("not-stocked"),
            ..replace
        };
        admin.add_override(&remove).unwrap();
    }

    #[test]
    fn test_import_rejects_tampered_identity() {
        let admin = admin();
        seed_product(&admin, "tote");
        let variant = Variant {
            id: VariantId::new("v1"),
            product_id: ProductId::new("tote"),
            sku: "TOTE-BLA".to_string(),
            selected_options: vec![OptionRef::Product(OptionId::new("tote-black"))],
            identity_hash: "deadbeef".to_string(),
            price: None,
            weight: None,
            stock_quantity: 0,
            is_active: true,
            position: 0,
            created_at: chrono::Utc::now(),
        };
        assert!(matches!(
            admin.import_variants(&[variant]),
            Err(ConfiguratorError::InvalidVariant(_))
        ));
    }

    #[test]
    fn test_delete_bom_entry_cascades() {
        let admin = admin();
        seed_product(&admin, "tote");
        admin
            .add_raw_material(&RawMaterial::new("canvas", "m", dec!(10)))
            .unwrap();
        admin.add_bom_entry(&entry("e1", "tote", "canvas")).unwrap();
        admin
            .add_modifier(&OptionBomModifier {
                id: ModifierId::new("m1"),
                option: OptionRef::Product(OptionId::new("tote-black")),
                product_bom_entry_id: BomEntryId::new("e1"),
                modifier_type: crate::bom::ModifierType::Add,
                modifier_value: dec!(0.5),
            })
            .unwrap();

        assert_eq!(admin.delete_bom_entry(&BomEntryId::new("e1")).unwrap(), 2);
        let rules = admin.store().load_bom_rules(&ProductId::new("tote")).unwrap();
        assert!(rules.entries.is_empty());
        assert!(rules.modifiers.is_empty());

        assert!(matches!(
            admin.delete_bom_entry(&BomEntryId::new("e1")),
            Err(ConfiguratorError::BomEntryNotFound(_))
        ));
    }
}
