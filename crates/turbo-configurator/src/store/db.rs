//! Catalog storage on `turbo-db`.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use turbo_db::{Db, DbError, Filter, TableSchema, Value};

use super::{CatalogStore, CatalogWriter, InsertReport};
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
    OptionBomEntryId, OptionId, OptionRef, OverrideId, ProductId, RawMaterialId, VariantId,
};

const PRODUCTS: &str = "products";
const ATTRIBUTES: &str = "product_attributes";
const OPTIONS: &str = "product_attribute_options";
const GLOBAL_ATTRIBUTES: &str = "global_attributes";
const GLOBAL_OPTIONS: &str = "global_attribute_options";
const GLOBAL_LINKS: &str = "product_global_attribute_links";
const GLOBAL_SELECTIONS: &str = "product_global_option_selections";
const VARIANTS: &str = "variants";
const RAW_MATERIALS: &str = "raw_materials";
const FIELD_DEFINITIONS: &str = "field_definitions";
const BOM_ENTRIES: &str = "product_bom_entries";
const OPTION_BOM_ENTRIES: &str = "option_bom_entries";
const MODIFIERS: &str = "option_bom_modifiers";
const OVERRIDES: &str = "variant_bom_overrides";

/// Unique index on (product, identity hash). Global options are shared, so
/// two products can select the same combination.
pub const VARIANTS_IDENTITY: &str = "variants_identity";
/// Unique index on variant SKUs.
pub const VARIANTS_SKU: &str = "variants_sku";

const ATTRIBUTES_KEY: &str = "product_attributes_key";
const GLOBAL_LINKS_ATTRIBUTE: &str = "product_global_attribute_links_attribute";
const GLOBAL_SELECTIONS_OPTION: &str = "product_global_option_selections_option";
const BOM_ENTRIES_MATERIAL: &str = "product_bom_entries_material";
const OPTION_BOM_ENTRIES_MATERIAL: &str = "option_bom_entries_material";
const MODIFIERS_TARGET: &str = "option_bom_modifiers_target";

/// Catalog tables in a [`Db`].
///
/// Cloning shares the database, so clones on different threads see and
/// contend on the same rows.
#[derive(Debug, Clone)]
pub struct DbCatalog {
    db: Arc<Db>,
}

impl DbCatalog {
    /// Open a fresh in-memory catalog.
    pub fn open_in_memory() -> Result<Self, ConfiguratorError> {
        Self::with_db(Arc::new(Db::open_in_memory()))
    }

    /// Create the catalog tables in `db`.
    pub fn with_db(db: Arc<Db>) -> Result<Self, ConfiguratorError> {
        for schema in schemas() {
            db.create_table(schema)?;
        }
        Ok(Self { db })
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    fn find<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Option<T>, ConfiguratorError> {
        Ok(self.db.query_optional(table, &[Filter::eq("id", id)])?)
    }

    /// Update the row with `id`, or insert it.
    fn upsert<T: Serialize>(
        &self,
        table: &str,
        filters: &[Filter],
        value: &T,
    ) -> Result<(), DbError> {
        self.db.transaction(|tx| {
            if tx.update(table, filters, value)? == 0 {
                tx.insert(table, value)?;
            }
            Ok(())
        })
    }

    fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize, ConfiguratorError> {
        Ok(self.db.transaction(|tx| tx.delete(table, filters))?)
    }

    fn product_option_refs(
        &self,
        attributes: &[ProductAttribute],
    ) -> Result<Vec<OptionRef>, ConfiguratorError> {
        let options: Vec<ProductAttributeOption> = self.db.query_as(
            OPTIONS,
            &[Filter::is_in(
                "attribute_id",
                attributes.iter().map(|a| a.id.as_str()),
            )],
        )?;
        Ok(options.into_iter().map(|o| OptionRef::Product(o.id)).collect())
    }
}

fn schemas() -> Vec<TableSchema> {
    vec![
        TableSchema::new(PRODUCTS).unique("products_pk", &["id"]),
        TableSchema::new(ATTRIBUTES)
            .unique("product_attributes_pk", &["id"])
            .unique(ATTRIBUTES_KEY, &["product_id", "key"]),
        TableSchema::new(OPTIONS).unique("product_attribute_options_pk", &["id"]),
        TableSchema::new(GLOBAL_ATTRIBUTES)
            .unique("global_attributes_pk", &["id"])
            .unique("global_attributes_key", &["key"]),
        TableSchema::new(GLOBAL_OPTIONS).unique("global_attribute_options_pk", &["id"]),
        TableSchema::new(GLOBAL_LINKS)
            .unique("product_global_attribute_links_pk", &["id"])
            .unique(GLOBAL_LINKS_ATTRIBUTE, &["product_id", "global_attribute_id"]),
        TableSchema::new(GLOBAL_SELECTIONS)
            .unique(GLOBAL_SELECTIONS_OPTION, &["link_id", "global_option_id"]),
        // Identity is checked first so a lost race on an existing combination
        // reports as already present even when its SKU matches too.
        TableSchema::new(VARIANTS)
            .unique(VARIANTS_IDENTITY, &["product_id", "identity_hash"])
            .unique(VARIANTS_SKU, &["sku"])
            .unique("variants_pk", &["id"]),
        TableSchema::new(RAW_MATERIALS).unique("raw_materials_pk", &["id"]),
        TableSchema::new(FIELD_DEFINITIONS)
            .unique("field_definitions_pk", &["id"])
            .unique("field_definitions_key", &["key", "scope"]),
        TableSchema::new(BOM_ENTRIES)
            .unique("product_bom_entries_pk", &["id"])
            .unique(BOM_ENTRIES_MATERIAL, &["product_id", "raw_material_id"]),
        TableSchema::new(OPTION_BOM_ENTRIES)
            .unique("option_bom_entries_pk", &["id"])
            .unique(OPTION_BOM_ENTRIES_MATERIAL, &["option", "raw_material_id"]),
        TableSchema::new(MODIFIERS)
            .unique("option_bom_modifiers_pk", &["id"])
            .unique(MODIFIERS_TARGET, &["option", "product_bom_entry_id"]),
        TableSchema::new(OVERRIDES).unique("variant_bom_overrides_pk", &["id"]),
    ]
}

fn option_value(option: &OptionRef) -> Result<Value, ConfiguratorError> {
    Ok(Value::from(serde_json::to_value(option)?))
}

impl CatalogStore for DbCatalog {
    fn load_product(&self, product_id: &ProductId) -> Result<Product, ConfiguratorError> {
        self.find(PRODUCTS, product_id.as_str())?
            .ok_or_else(|| ConfiguratorError::ProductNotFound(product_id.to_string()))
    }

    fn load_axes(&self, product_id: &ProductId) -> Result<AxisRows, ConfiguratorError> {
        let attributes: Vec<ProductAttribute> = self
            .db
            .query_as(ATTRIBUTES, &[Filter::eq("product_id", product_id.as_str())])?;
        let options = self.db.query_as(
            OPTIONS,
            &[Filter::is_in("attribute_id", attributes.iter().map(|a| a.id.as_str()))],
        )?;

        let links: Vec<ProductGlobalAttributeLink> = self
            .db
            .query_as(GLOBAL_LINKS, &[Filter::eq("product_id", product_id.as_str())])?;
        let global_ids: Vec<&str> = links.iter().map(|l| l.global_attribute_id.as_str()).collect();

        let global_attributes = self
            .db
            .query_as(GLOBAL_ATTRIBUTES, &[Filter::is_in("id", global_ids.iter().copied())])?;
        let global_options = self.db.query_as(
            GLOBAL_OPTIONS,
            &[Filter::is_in("global_attribute_id", global_ids.iter().copied())],
        )?;
        let selections = self.db.query_as(
            GLOBAL_SELECTIONS,
            &[Filter::is_in("link_id", links.iter().map(|l| l.id.as_str()))],
        )?;

        Ok(AxisRows {
            attributes,
            options,
            global_attributes,
            global_options,
            links,
            selections,
        })
    }

    fn load_existing_variants(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<Variant>, ConfiguratorError> {
        Ok(self
            .db
            .query_as(VARIANTS, &[Filter::eq("product_id", product_id.as_str())])?)
    }

    fn load_variant(&self, variant_id: &VariantId) -> Result<Variant, ConfiguratorError> {
        self.find(VARIANTS, variant_id.as_str())?
            .ok_or_else(|| ConfiguratorError::VariantNotFound(variant_id.to_string()))
    }

    fn load_taken_skus(&self) -> Result<Vec<String>, ConfiguratorError> {
        Ok(self
            .db
            .query(VARIANTS, &[])?
            .iter()
            .filter_map(|row| row.get("sku").and_then(Value::as_text).map(str::to_string))
            .collect())
    }

    fn load_bom_rules(&self, product_id: &ProductId) -> Result<BomRules, ConfiguratorError> {
        let entries: Vec<ProductBomEntry> = self
            .db
            .query_as(BOM_ENTRIES, &[Filter::eq("product_id", product_id.as_str())])?;

        let attributes: Vec<ProductAttribute> = self
            .db
            .query_as(ATTRIBUTES, &[Filter::eq("product_id", product_id.as_str())])?;
        let mut refs = self.product_option_refs(&attributes)?;

        let links: Vec<ProductGlobalAttributeLink> = self
            .db
            .query_as(GLOBAL_LINKS, &[Filter::eq("product_id", product_id.as_str())])?;
        let global_options: Vec<GlobalAttributeOption> = self.db.query_as(
            GLOBAL_OPTIONS,
            &[Filter::is_in(
                "global_attribute_id",
                links.iter().map(|l| l.global_attribute_id.as_str()),
            )],
        )?;
        refs.extend(global_options.into_iter().map(|o| OptionRef::Global(o.id)));

        let option_values = refs
            .iter()
            .map(option_value)
            .collect::<Result<Vec<_>, _>>()?;

        let option_entries = self.db.query_as(
            OPTION_BOM_ENTRIES,
            &[Filter::is_in("option", option_values)],
        )?;
        let modifiers = self.db.query_as(
            MODIFIERS,
            &[Filter::is_in(
                "product_bom_entry_id",
                entries.iter().map(|e| e.id.as_str()),
            )],
        )?;

        Ok(BomRules {
            entries,
            option_entries,
            modifiers,
        })
    }

    fn load_variant_overrides(
        &self,
        variant_id: &VariantId,
    ) -> Result<Vec<VariantBomOverride>, ConfiguratorError> {
        Ok(self
            .db
            .query_as(OVERRIDES, &[Filter::eq("variant_id", variant_id.as_str())])?)
    }

    fn load_stock(
        &self,
        material_ids: &[RawMaterialId],
    ) -> Result<HashMap<RawMaterialId, Decimal>, ConfiguratorError> {
        let materials: Vec<RawMaterial> = self.db.query_as(
            RAW_MATERIALS,
            &[Filter::is_in("id", material_ids.iter().map(|m| m.as_str()))],
        )?;
        Ok(materials
            .into_iter()
            .map(|m| (m.id, m.stock_quantity))
            .collect())
    }

    fn load_field_definitions(&self) -> Result<Vec<FieldDefinition>, ConfiguratorError> {
        Ok(self.db.query_as(FIELD_DEFINITIONS, &[])?)
    }

    fn insert_variants(&self, batch: &[Variant]) -> Result<InsertReport, ConfiguratorError> {
        self.db.transaction(|tx| {
            let mut report = InsertReport::default();
            for variant in batch {
                match tx.insert(VARIANTS, variant) {
                    Ok(()) => report.inserted.push(variant.clone()),
                    Err(e) if e.is_unique_violation_on(VARIANTS_IDENTITY) => {
                        report.already_present += 1;
                    }
                    Err(e) if e.is_unique_violation_on(VARIANTS_SKU) => {
                        return Err(ConfiguratorError::SkuConflict(variant.sku.clone()));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Ok(report)
        })
    }

    fn consume_stock(&self, draws: &[MaterialDraw]) -> Result<(), ConfiguratorError> {
        self.db.transaction(|tx| {
            for draw in draws {
                let filter = [Filter::eq("id", draw.raw_material_id.as_str())];
                let current: Option<RawMaterial> = tx.query_optional(RAW_MATERIALS, &filter)?;
                let available = current
                    .as_ref()
                    .map(|m| m.stock_quantity)
                    .unwrap_or(Decimal::ZERO);

                let Some(mut material) = current.filter(|_| available >= draw.quantity) else {
                    return Err(ConfiguratorError::InsufficientStock {
                        material: draw.raw_material_id.to_string(),
                        required: draw.quantity,
                        available,
                    });
                };

                material.stock_quantity -= draw.quantity;
                tx.update(RAW_MATERIALS, &filter, &material)?;
            }
            Ok(())
        })
    }
}

impl CatalogWriter for DbCatalog {
    fn put_product(&self, product: &Product) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(PRODUCTS, &[Filter::eq("id", product.id.as_str())], product)?)
    }

    fn put_attribute(&self, attribute: &ProductAttribute) -> Result<(), ConfiguratorError> {
        self.upsert(ATTRIBUTES, &[Filter::eq("id", attribute.id.as_str())], attribute)
            .map_err(|e| {
                if e.is_unique_violation_on(ATTRIBUTES_KEY) {
                    ConfiguratorError::DuplicateAxisKey {
                        product_id: attribute.product_id.to_string(),
                        key: attribute.key.clone(),
                    }
                } else {
                    e.into()
                }
            })
    }

    fn put_option(&self, option: &ProductAttributeOption) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(OPTIONS, &[Filter::eq("id", option.id.as_str())], option)?)
    }

    fn put_global_attribute(&self, attribute: &GlobalAttribute) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(
            GLOBAL_ATTRIBUTES,
            &[Filter::eq("id", attribute.id.as_str())],
            attribute,
        )?)
    }

    fn put_global_option(&self, option: &GlobalAttributeOption) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(GLOBAL_OPTIONS, &[Filter::eq("id", option.id.as_str())], option)?)
    }

    fn put_global_link(
        &self,
        link: &ProductGlobalAttributeLink,
    ) -> Result<(), ConfiguratorError> {
        self.upsert(GLOBAL_LINKS, &[Filter::eq("id", link.id.as_str())], link)
            .map_err(|e| {
                if e.is_unique_violation_on(GLOBAL_LINKS_ATTRIBUTE) {
                    ConfiguratorError::DuplicateLink(format!(
                        "product {} already links global attribute {}",
                        link.product_id, link.global_attribute_id
                    ))
                } else {
                    e.into()
                }
            })
    }

    fn put_global_selection(
        &self,
        selection: &ProductGlobalOptionSelection,
    ) -> Result<(), ConfiguratorError> {
        let filters = [
            Filter::eq("link_id", selection.link_id.as_str()),
            Filter::eq("global_option_id", selection.global_option_id.as_str()),
        ];
        Ok(self.upsert(GLOBAL_SELECTIONS, &filters, selection)?)
    }

    fn put_raw_material(&self, material: &RawMaterial) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(RAW_MATERIALS, &[Filter::eq("id", material.id.as_str())], material)?)
    }

    fn set_stock(
        &self,
        material_id: &RawMaterialId,
        quantity: Decimal,
    ) -> Result<(), ConfiguratorError> {
        self.db.transaction(|tx| {
            let filter = [Filter::eq("id", material_id.as_str())];
            let mut material: RawMaterial = tx
                .query_optional(RAW_MATERIALS, &filter)?
                .ok_or_else(|| ConfiguratorError::MaterialNotFound(material_id.to_string()))?;
            material.stock_quantity = quantity;
            tx.update(RAW_MATERIALS, &filter, &material)?;
            Ok(())
        })
    }

    fn put_field_definition(
        &self,
        definition: &FieldDefinition,
    ) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(
            FIELD_DEFINITIONS,
            &[Filter::eq("id", definition.id.as_str())],
            definition,
        )?)
    }

    fn put_bom_entry(&self, entry: &ProductBomEntry) -> Result<(), ConfiguratorError> {
        self.upsert(BOM_ENTRIES, &[Filter::eq("id", entry.id.as_str())], entry)
            .map_err(|e| {
                if e.is_unique_violation_on(BOM_ENTRIES_MATERIAL) {
                    ConfiguratorError::DuplicateBomEntry {
                        owner: format!("product {}", entry.product_id),
                        material: entry.raw_material_id.to_string(),
                    }
                } else {
                    e.into()
                }
            })
    }

    fn put_option_bom_entry(&self, entry: &OptionBomEntry) -> Result<(), ConfiguratorError> {
        self.upsert(OPTION_BOM_ENTRIES, &[Filter::eq("id", entry.id.as_str())], entry)
            .map_err(|e| {
                if e.is_unique_violation_on(OPTION_BOM_ENTRIES_MATERIAL) {
                    ConfiguratorError::DuplicateBomEntry {
                        owner: format!("option {}", entry.option),
                        material: entry.raw_material_id.to_string(),
                    }
                } else {
                    e.into()
                }
            })
    }

    fn put_modifier(&self, modifier: &OptionBomModifier) -> Result<(), ConfiguratorError> {
        self.upsert(MODIFIERS, &[Filter::eq("id", modifier.id.as_str())], modifier)
            .map_err(|e| {
                if e.is_unique_violation_on(MODIFIERS_TARGET) {
                    ConfiguratorError::DuplicateBomEntry {
                        owner: format!("option {}", modifier.option),
                        material: format!("entry {}", modifier.product_bom_entry_id),
                    }
                } else {
                    e.into()
                }
            })
    }

    fn put_override(&self, item: &VariantBomOverride) -> Result<(), ConfiguratorError> {
        Ok(self.upsert(OVERRIDES, &[Filter::eq("id", item.id.as_str())], item)?)
    }

    fn find_attribute(
        &self,
        id: &AttributeId,
    ) -> Result<Option<ProductAttribute>, ConfiguratorError> {
        self.find(ATTRIBUTES, id.as_str())
    }

    fn find_option(
        &self,
        id: &OptionId,
    ) -> Result<Option<ProductAttributeOption>, ConfiguratorError> {
        self.find(OPTIONS, id.as_str())
    }

    fn find_global_attribute(
        &self,
        id: &GlobalAttributeId,
    ) -> Result<Option<GlobalAttribute>, ConfiguratorError> {
        self.find(GLOBAL_ATTRIBUTES, id.as_str())
    }

    fn find_global_option(
        &self,
        id: &GlobalOptionId,
    ) -> Result<Option<GlobalAttributeOption>, ConfiguratorError> {
        self.find(GLOBAL_OPTIONS, id.as_str())
    }

    fn find_global_link(
        &self,
        id: &GlobalLinkId,
    ) -> Result<Option<ProductGlobalAttributeLink>, ConfiguratorError> {
        self.find(GLOBAL_LINKS, id.as_str())
    }

    fn find_raw_material(
        &self,
        id: &RawMaterialId,
    ) -> Result<Option<RawMaterial>, ConfiguratorError> {
        self.find(RAW_MATERIALS, id.as_str())
    }

    fn find_bom_entry(
        &self,
        id: &BomEntryId,
    ) -> Result<Option<ProductBomEntry>, ConfiguratorError> {
        self.find(BOM_ENTRIES, id.as_str())
    }

    fn delete_bom_entry(&self, id: &BomEntryId) -> Result<usize, ConfiguratorError> {
        Ok(self.db.transaction(|tx| {
            let modifiers =
                tx.delete(MODIFIERS, &[Filter::eq("product_bom_entry_id", id.as_str())])?;
            let entries = tx.delete(BOM_ENTRIES, &[Filter::eq("id", id.as_str())])?;
            Ok::<_, DbError>(modifiers + entries)
        })?)
    }

    fn delete_option_bom_entry(&self, id: &OptionBomEntryId) -> Result<usize, ConfiguratorError> {
        self.delete(OPTION_BOM_ENTRIES, &[Filter::eq("id", id.as_str())])
    }

    fn delete_modifier(&self, id: &ModifierId) -> Result<usize, ConfiguratorError> {
        self.delete(MODIFIERS, &[Filter::eq("id", id.as_str())])
    }

    fn delete_override(&self, id: &OverrideId) -> Result<usize, ConfiguratorError> {
        self.delete(OVERRIDES, &[Filter::eq("id", id.as_str())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::VariantIdentity;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn variant(id: &str, sku: &str, option: &str) -> Variant {
        let selected = vec![OptionRef::Product(OptionId::new(option))];
        Variant {
            id: VariantId::new(id),
            product_id: ProductId::new("tote"),
            sku: sku.to_string(),
            identity_hash: VariantIdentity::of(&selected).hash().to_string(),
            selected_options: selected,
            price: None,
            weight: None,
            stock_quantity: 0,
            is_active: true,
            position: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_skips_existing_identity() {
        let catalog = DbCatalog::open_in_memory().unwrap();
        catalog
            .insert_variants(&[variant("v-1", "TOTE-BLA", "black")])
            .unwrap();

        let report = catalog
            .insert_variants(&[
                variant("v-2", "TOTE-BLA", "black"),
                variant("v-3", "TOTE-TAN", "tan"),
            ])
            .unwrap();

        assert_eq!(report.already_present, 1);
        assert_eq!(report.inserted.len(), 1);
        assert_eq!(report.inserted[0].id, VariantId::new("v-3"));
        assert_eq!(
            catalog
                .load_existing_variants(&ProductId::new("tote"))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_same_identity_in_other_product_is_inserted() {
        let catalog = DbCatalog::open_in_memory().unwrap();
        catalog
            .insert_variants(&[variant("v-1", "TOTE-BLA", "black")])
            .unwrap();

        let mut bag = variant("v-2", "BAG-BLA", "black");
        bag.product_id = ProductId::new("bag");
        let report = catalog.insert_variants(&[bag]).unwrap();

        assert_eq!(report.already_present, 0);
        assert_eq!(report.inserted.len(), 1);
        assert_eq!(
            catalog
                .load_existing_variants(&ProductId::new("bag"))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_sku_conflict_aborts_batch() {
        let catalog = DbCatalog::open_in_memory().unwrap();
        catalog
            .insert_variants(&[variant("v-1", "TOTE-BLA", "black")])
            .unwrap();

        let err = catalog
            .insert_variants(&[
                variant("v-2", "TOTE-TAN", "tan"),
                variant("v-3", "TOTE-BLA", "blank"),
            ])
            .unwrap_err();

        assert_eq!(err, ConfiguratorError::SkuConflict("TOTE-BLA".to_string()));
        assert_eq!(catalog.load_taken_skus().unwrap(), vec!["TOTE-BLA".to_string()]);
    }

    #[test]
    fn test_consume_stock_is_all_or_nothing() {
        let catalog = DbCatalog::open_in_memory().unwrap();
        catalog
            .put_raw_material(&RawMaterial::new("leather", "m2", dec!(10)))
            .unwrap();
        catalog
            .put_raw_material(&RawMaterial::new("thread", "m", dec!(2)))
            .unwrap();

        let draws = vec![
            MaterialDraw {
                raw_material_id: RawMaterialId::new("leather"),
                quantity: dec!(4),
            },
            MaterialDraw {
                raw_material_id: RawMaterialId::new("thread"),
                quantity: dec!(3),
            },
        ];
        let err = catalog.consume_stock(&draws).unwrap_err();
        assert!(matches!(err, ConfiguratorError::InsufficientStock { .. }));

        let stock = catalog
            .load_stock(&[RawMaterialId::new("leather"), RawMaterialId::new("thread")])
            .unwrap();
        assert_eq!(stock[&RawMaterialId::new("leather")], dec!(10));

        catalog.consume_stock(&draws[..1]).unwrap();
        let stock = catalog.load_stock(&[RawMaterialId::new("leather")]).unwrap();
        assert_eq!(stock[&RawMaterialId::new("leather")], dec!(6));
    }

    #[test]
    fn test_consume_missing_material() {
        let catalog = DbCatalog::open_in_memory().unwrap();
        let err = catalog
            .consume_stock(&[MaterialDraw {
                raw_material_id: RawMaterialId::new("ghost"),
                quantity: dec!(1),
            }])
            .unwrap_err();
        assert_eq!(
            err,
            ConfiguratorError::InsufficientStock {
                material: "ghost".to_string(),
                required: dec!(1),
                available: Decimal::ZERO,
            }
        );
    }

    #[test]
    fn test_duplicate_bom_entry_rejected() {
        let catalog = DbCatalog::open_in_memory().unwrap();
        let entry = ProductBomEntry {
            id: BomEntryId::new("e1"),
            product_id: ProductId::new("tote"),
            raw_material_id: RawMaterialId::new("leather"),
            quantity: dec!(1),
            unit: "m2".to_string(),
            is_required: true,
        };
        catalog.put_bom_entry(&entry).unwrap();
        // Same id updates in place.
        catalog.put_bom_entry(&entry).unwrap();

        let duplicate = ProductBomEntry {
            id: BomEntryId::new("e2"),
            ..entry
        };
        let err = catalog.put_bom_entry(&duplicate).unwrap_err();
        assert!(matches!(err, ConfiguratorError::DuplicateBomEntry { .. }));
    }
}
