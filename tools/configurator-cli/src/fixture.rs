//! Catalog files.
//!
//! A catalog file is one JSON or TOML document (chosen by extension) holding
//! every row the configurator reads. It is loaded into an in-memory store
//! through [`CatalogAdmin`], so a malformed file is rejected with the same
//! errors authoring would raise.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};
use turbo_configurator::prelude::*;

/// Rows of a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub field_definitions: Vec<FieldDefinition>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub options: Vec<ProductAttributeOption>,
    #[serde(default)]
    pub global_attributes: Vec<GlobalAttribute>,
    #[serde(default)]
    pub global_options: Vec<GlobalAttributeOption>,
    #[serde(default)]
    pub global_links: Vec<ProductGlobalAttributeLink>,
    #[serde(default)]
    pub global_selections: Vec<ProductGlobalOptionSelection>,
    #[serde(default)]
    pub raw_materials: Vec<RawMaterial>,
    #[serde(default)]
    pub bom_entries: Vec<ProductBomEntry>,
    #[serde(default)]
    pub option_bom_entries: Vec<OptionBomEntry>,
    #[serde(default)]
    pub modifiers: Vec<OptionBomModifier>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub overrides: Vec<VariantBomOverride>,
}

/// A catalog file loaded into a store.
pub struct LoadedCatalog {
    pub path: PathBuf,
    pub fixture: CatalogFixture,
    pub store: DbCatalog,
}

impl CatalogFixture {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        if is_toml(path) {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML catalog: {}", path.display()))
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON catalog: {}", path.display()))
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let content = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write catalog: {}", path.display()))
    }

    /// Write every row into `admin`, referenced rows first.
    pub fn install<W: CatalogWriter>(&self, admin: &CatalogAdmin<W>) -> Result<()> {
        for definition in &self.field_definitions {
            admin
                .define_field(definition)
                .with_context(|| format!("field definition {}", definition.key))?;
        }
        for product in &self.products {
            admin
                .create_product(product)
                .with_context(|| format!("product {}", product.id))?;
        }
        for attribute in &self.attributes {
            admin
                .add_attribute(attribute)
                .with_context(|| format!("attribute {}", attribute.id))?;
        }
        for option in &self.options {
            admin
                .add_option(option)
                .with_context(|| format!("option {}", option.id))?;
        }
        for attribute in &self.global_attributes {
            admin
                .add_global_attribute(attribute)
                .with_context(|| format!("global attribute {}", attribute.id))?;
        }
        for option in &self.global_options {
            admin
                .add_global_option(option)
                .with_context(|| format!("global option {}", option.id))?;
        }
        for link in &self.global_links {
            admin
                .link_global_attribute(link)
                .with_context(|| format!("global link {}", link.id))?;
        }
        for selection in &self.global_selections {
            admin.select_global_option(selection).with_context(|| {
                format!(
                    "selection of {} on {}",
                    selection.global_option_id, selection.link_id
                )
            })?;
        }
        for material in &self.raw_materials {
            admin
                .add_raw_material(material)
                .with_context(|| format!("raw material {}", material.id))?;
        }
        for entry in &self.bom_entries {
            admin
                .add_bom_entry(entry)
                .with_context(|| format!("bom entry {}", entry.id))?;
        }
        for entry in &self.option_bom_entries {
            admin
                .add_option_bom_entry(entry)
                .with_context(|| format!("option bom entry {}", entry.id))?;
        }
        for modifier in &self.modifiers {
            admin
                .add_modifier(modifier)
                .with_context(|| format!("modifier {}", modifier.id))?;
        }
        admin
            .import_variants(&self.variants)
            .context("variants")?;
        for item in &self.overrides {
            admin
                .add_override(item)
                .with_context(|| format!("override {}", item.id))?;
        }
        Ok(())
    }

    /// Id of the variant whose id or SKU is `key`.
    pub fn find_variant(&self, key: &str) -> Result<VariantId> {
        match self.variants.iter().find(|v| v.id.as_str() == key || v.sku == key) {
            Some(variant) => Ok(variant.id.clone()),
            None => bail!("No variant with id or SKU '{}' in catalog", key),
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "toml")
}

impl LoadedCatalog {
    /// Read `path` and install it into a fresh in-memory store.
    pub fn open(path: PathBuf, logger: StructuredLogger) -> Result<Self> {
        let fixture = CatalogFixture::read(&path)?;
        let store = DbCatalog::open_in_memory()?;
        let admin = CatalogAdmin::new(store.clone(), logger);
        fixture
            .install(&admin)
            .with_context(|| format!("Invalid catalog: {}", path.display()))?;
        Ok(Self {
            path,
            fixture,
            store,
        })
    }

    /// Append `created` to the file's variants and write it back.
    pub fn save_variants(&mut self, created: &[Variant]) -> Result<()> {
        self.fixture.variants.extend_from_slice(created);
        self.fixture.write(&self.path)
    }
}
