//! Attribute axis resolution.
//!
//! Assembles the ordered axes a product varies by from its own attributes and
//! the global attributes it links. Global options are filtered and overridden
//! per product by selection rows.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{
    GlobalAttribute, GlobalAttributeOption, ProductAttribute, ProductAttributeOption,
    ProductGlobalAttributeLink, ProductGlobalOptionSelection,
};
use crate::error::ConfiguratorError;
use crate::ids::{AttributeId, GlobalAttributeId, GlobalLinkId, OptionRef, ProductId};

/// Where an axis comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AxisSource {
    Product {
        attribute_id: AttributeId,
    },
    Global {
        link_id: GlobalLinkId,
        global_attribute_id: GlobalAttributeId,
    },
}

impl AxisSource {
    fn rank(&self) -> u8 {
        match self {
            AxisSource::Product { .. } => 0,
            AxisSource::Global { .. } => 1,
        }
    }
}

/// An active option on a resolved axis, with product-specific overrides applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisOption {
    pub option: OptionRef,
    pub value: String,
    pub display_value: String,
    pub price_modifier: Option<Decimal>,
    pub weight_modifier: Option<Decimal>,
    pub position: i32,
}

/// One configurable dimension of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub source: AxisSource,
    pub key: String,
    pub display_name: String,
    pub position: i32,
    /// Active options in position order. Never empty.
    pub options: Vec<AxisOption>,
}

/// Raw attribute rows for one product, as loaded from storage.
///
/// Global attributes and options may include rows unrelated to the product;
/// only those reached through the product's links are used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisRows {
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub options: Vec<ProductAttributeOption>,
    #[serde(default)]
    pub global_attributes: Vec<GlobalAttribute>,
    #[serde(default)]
    pub global_options: Vec<GlobalAttributeOption>,
    #[serde(default)]
    pub links: Vec<ProductGlobalAttributeLink>,
    #[serde(default)]
    pub selections: Vec<ProductGlobalOptionSelection>,
}

/// Resolved axes of a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisResolution {
    /// Axes with at least one active option, sorted by position.
    pub axes: Vec<Axis>,
    /// Keys of axes dropped because they had no active options.
    pub empty_axes: Vec<String>,
}

impl AxisResolution {
    /// The axes, or `NoAttributeAxes` naming the empty ones if there are none.
    pub fn require_axes(self, product_id: &ProductId) -> Result<Vec<Axis>, ConfiguratorError> {
        if self.axes.is_empty() {
            return Err(ConfiguratorError::NoAttributeAxes {
                product_id: product_id.to_string(),
                empty_axes: self.empty_axes,
            });
        }
        Ok(self.axes)
    }

    /// Find an option, returning its axis index and the resolved option.
    pub fn locate(&self, option: &OptionRef) -> Option<(usize, &AxisOption)> {
        self.axes.iter().enumerate().find_map(|(index, axis)| {
            axis.options
                .iter()
                .find(|o| &o.option == option)
                .map(|o| (index, o))
        })
    }
}

/// Builds [`AxisResolution`]s from attribute rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct AxisResolver;

impl AxisResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the axes of `product_id`.
    ///
    /// Inactive attributes and links to inactive or unknown global attributes
    /// are ignored. Axis keys must be unique (trimmed, case-insensitive) across
    /// both sources; this is checked before empty axes are dropped.
    pub fn resolve(
        &self,
        product_id: &ProductId,
        rows: &AxisRows,
    ) -> Result<AxisResolution, ConfiguratorError> {
        let mut axes = Vec::new();

        for attribute in rows
            .attributes
            .iter()
            .filter(|a| &a.product_id == product_id && a.is_active)
        {
            axes.push(product_axis(attribute, &rows.options));
        }

        let global_attributes: HashMap<&GlobalAttributeId, &GlobalAttribute> = rows
            .global_attributes
            .iter()
            .map(|g| (&g.id, g))
            .collect();

        for link in rows.links.iter().filter(|l| &l.product_id == product_id) {
            let Some(global) = global_attributes
                .get(&link.global_attribute_id)
                .filter(|g| g.is_active)
            else {
                continue;
            };
            axes.push(global_axis(link, global, rows));
        }

        check_unique_keys(product_id, &axes)?;

        axes.sort_by(|a, b| {
            (a.position, a.source.rank(), &a.key).cmp(&(b.position, b.source.rank(), &b.key))
        });

        let (axes, empty): (Vec<Axis>, Vec<Axis>) =
            axes.into_iter().partition(|a| !a.options.is_empty());

        Ok(AxisResolution {
            axes,
            empty_axes: empty.into_iter().map(|a| a.key).collect(),
        })
    }
}

fn product_axis(attribute: &ProductAttribute, options: &[ProductAttributeOption]) -> Axis {
    let options = options
        .iter()
        .filter(|o| o.attribute_id == attribute.id && o.is_active)
        .map(|o| AxisOption {
            option: OptionRef::Product(o.id.clone()),
            value: o.value.clone(),
            display_value: o.display_value.clone(),
            price_modifier: o.price_modifier,
            weight_modifier: o.weight_modifier,
            position: o.position,
        })
        .collect();

    Axis {
        source: AxisSource::Product {
            attribute_id: attribute.id.clone(),
        },
        key: attribute.key.clone(),
        display_name: attribute.display_name.clone(),
        position: attribute.position,
        options: sorted(options),
    }
}

fn global_axis(
    link: &ProductGlobalAttributeLink,
    global: &GlobalAttribute,
    rows: &AxisRows,
) -> Axis {
    let candidates: Vec<&GlobalAttributeOption> = rows
        .global_options
        .iter()
        .filter(|o| o.global_attribute_id == global.id && o.is_active)
        .collect();

    let selections: Vec<&ProductGlobalOptionSelection> = rows
        .selections
        .iter()
        .filter(|s| s.link_id == link.id)
        .collect();

    let options = if selections.is_empty() {
        candidates
            .iter()
            .map(|o| global_option(o, None))
            .collect()
    } else {
        selections
            .iter()
            .filter_map(|s| {
                candidates
                    .iter()
                    .find(|o| o.id == s.global_option_id)
                    .map(|o| global_option(o, Some(s)))
            })
            .collect()
    };

    Axis {
        source: AxisSource::Global {
            link_id: link.id.clone(),
            global_attribute_id: global.id.clone(),
        },
        key: global.key.clone(),
        display_name: global.display_name.clone(),
        position: link.position,
        options: sorted(options),
    }
}

fn global_option(
    option: &GlobalAttributeOption,
    selection: Option<&ProductGlobalOptionSelection>,
) -> AxisOption {
    let (price, weight, position) = match selection {
        Some(s) => (
            s.price_modifier.or(option.price_modifier),
            s.weight_modifier.or(option.weight_modifier),
            s.position_override.unwrap_or(option.position),
        ),
        None => (option.price_modifier, option.weight_modifier, option.position),
    };

    AxisOption {
        option: OptionRef::Global(option.id.clone()),
        value: option.value.clone(),
        display_value: option.display_value.clone(),
        price_modifier: price,
        weight_modifier: weight,
        position,
    }
}

fn sorted(mut options: Vec<AxisOption>) -> Vec<AxisOption> {
    options.sort_by(|a, b| (a.position, &a.option).cmp(&(b.position, &b.option)));
    options
}

fn check_unique_keys(product_id: &ProductId, axes: &[Axis]) -> Result<(), ConfiguratorError> {
    let mut seen = HashSet::new();
    for axis in axes {
        if !seen.insert(axis.key.trim().to_lowercase()) {
            return Err(ConfiguratorError::DuplicateAxisKey {
                product_id: product_id.to_string(),
                key: axis.key.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetadataMap;
    use crate::ids::{GlobalOptionId, OptionId};
    use rust_decimal_macros::dec;

    fn product() -> ProductId {
        ProductId::new("tote")
    }

    fn attribute(id: &str, key: &str, position: i32) -> ProductAttribute {
        ProductAttribute {
            id: AttributeId::new(id),
            product_id: product(),
            key: key.to_string(),
            display_name: key.to_string(),
            position,
            is_active: true,
        }
    }

    fn option(id: &str, attribute_id: &str, position: i32) -> ProductAttributeOption {
        ProductAttributeOption {
            id: OptionId::new(id),
            attribute_id: AttributeId::new(attribute_id),
            value: id.to_string(),
            display_value: id.to_string(),
            price_modifier: None,
            weight_modifier: None,
            position,
            is_active: true,
            metadata: MetadataMap::new(),
        }
    }

    fn global_option(id: &str, position: i32, price: Option<Decimal>) -> GlobalAttributeOption {
        GlobalAttributeOption {
            id: GlobalOptionId::new(id),
            global_attribute_id: GlobalAttributeId::new("size"),
            value: id.to_string(),
            display_value: id.to_string(),
            price_modifier: price,
            weight_modifier: None,
            position,
            is_active: true,
            metadata: MetadataMap::new(),
        }
    }

    fn rows_with_global(position: i32) -> AxisRows {
        AxisRows {
            attributes: vec![attribute("color", "color", 0)],
            options: vec![option("black", "color", 1), option("tan", "color", 0)],
            global_attributes: vec![GlobalAttribute {
                id: GlobalAttributeId::new("size"),
                key: "size".to_string(),
                display_name: "Size".to_string(),
                is_active: true,
            }],
            global_options: vec![
                global_option("s", 0, Some(dec!(0))),
                global_option("m", 1, Some(dec!(5))),
                global_option("l", 2, Some(dec!(10))),
            ],
            links: vec![ProductGlobalAttributeLink {
                id: GlobalLinkId::new("tote-size"),
                product_id: product(),
                global_attribute_id: GlobalAttributeId::new("size"),
                position,
            }],
            selections: vec![],
        }
    }

    fn option_ids(axis: &Axis) -> Vec<String> {
        axis.options.iter().map(|o| o.option.canonical()).collect()
    }

    #[test]
    fn test_resolves_product_and_global_axes() {
        let resolution = AxisResolver::new()
            .resolve(&product(), &rows_with_global(1))
            .unwrap();

        assert_eq!(resolution.axes.len(), 2);
        assert_eq!(resolution.axes[0].key, "color");
        assert_eq!(option_ids(&resolution.axes[0]), vec!["p:tan", "p:black"]);
        assert_eq!(resolution.axes[1].key, "size");
        assert_eq!(option_ids(&resolution.axes[1]), vec!["g:s", "g:m", "g:l"]);
    }

    #[test]
    fn test_axes_interleave_by_position() {
        let mut rows = rows_with_global(0);
        rows.attributes[0].position = 5;

        let resolution = AxisResolver::new().resolve(&product(), &rows).unwrap();
        let keys: Vec<&str> = resolution.axes.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["size", "color"]);
    }

    #[test]
    fn test_selections_filter_and_override() {
        let mut rows = rows_with_global(1);
        rows.selections = vec![
            ProductGlobalOptionSelection {
                price_modifier: Some(dec!(7.50)),
                position_override: Some(9),
                ..ProductGlobalOptionSelection::new(
                    GlobalLinkId::new("tote-size"),
                    GlobalOptionId::new("m"),
                )
            },
            ProductGlobalOptionSelection::new(
                GlobalLinkId::new("tote-size"),
                GlobalOptionId::new("l"),
            ),
        ];

        let resolution = AxisResolver::new().resolve(&product(), &rows).unwrap();
        let size = &resolution.axes[1];
        assert_eq!(option_ids(size), vec!["g:l", "g:m"]);
        assert_eq!(size.options[1].price_modifier, Some(dec!(7.50)));
        assert_eq!(size.options[0].price_modifier, Some(dec!(10)));
    }

    #[test]
    fn test_inactive_options_excluded_and_empty_axis_dropped() {
        let mut rows = rows_with_global(1);
        for o in &mut rows.options {
            o.is_active = false;
        }

        let resolution = AxisResolver::new().resolve(&product(), &rows).unwrap();
        assert_eq!(resolution.axes.len(), 1);
        assert_eq!(resolution.empty_axes, vec!["color".to_string()]);
    }

    #[test]
    fn test_no_axes_requires_error() {
        let resolution = AxisResolver::new()
            .resolve(&product(), &AxisRows::default())
            .unwrap();
        let err = resolution.require_axes(&product()).unwrap_err();
        assert!(matches!(err, ConfiguratorError::NoAttributeAxes { .. }));
    }

    #[test]
    fn test_duplicate_key_across_sources() {
        let mut rows = rows_with_global(1);
        rows.attributes.push(attribute("size-own", " Size ", 2));

        let err = AxisResolver::new().resolve(&product(), &rows).unwrap_err();
        assert!(matches!(err, ConfiguratorError::DuplicateAxisKey { .. }));
    }

    #[test]
    fn test_locate_option() {
        let resolution = AxisResolver::new()
            .resolve(&product(), &rows_with_global(1))
            .unwrap();
        let (index, option) = resolution
            .locate(&OptionRef::Global(GlobalOptionId::new("m")))
            .unwrap();
        assert_eq!(index, 1);
        assert_eq!(option.price_modifier, Some(dec!(5)));
        assert!(resolution
            .locate(&OptionRef::Product(OptionId::new("missing")))
            .is_none());
    }
}
