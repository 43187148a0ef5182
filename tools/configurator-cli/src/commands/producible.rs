//! Producibility command.

use anyhow::Result;
use serde::Serialize;
use turbo_configurator::prelude::*;

use super::{open_catalog, ProducibleArgs};
use crate::context::Context;
use crate::output::{format_quantity, producibility_badge};

#[derive(Serialize)]
struct Row<'a> {
    sku: &'a str,
    #[serde(flatten)]
    report: ProducibilityReport,
}

/// Run the producible command.
pub fn run(args: ProducibleArgs, ctx: &Context) -> Result<()> {
    let (catalog, service) = open_catalog(&args.catalog, ctx)?;

    let variants: Vec<&Variant> = match &args.variant {
        Some(key) => {
            let id = catalog.fixture.find_variant(key)?;
            catalog.fixture.variants.iter().filter(|v| v.id == id).collect()
        }
        None => catalog.fixture.variants.iter().collect(),
    };

    if variants.is_empty() {
        ctx.output
            .warn("Catalog has no variants. Run `configurator generate --save` first.");
        return Ok(());
    }

    let mut rows = Vec::with_capacity(variants.len());
    for variant in variants {
        rows.push(Row {
            sku: &variant.sku,
            report: service.producibility_report(&variant.id)?,
        });
    }

    if ctx.output.is_json() {
        ctx.output.json(&rows);
        return Ok(());
    }

    ctx.output.header("Producible units");
    let scale = ctx.config.resolution.display_scale;
    for row in &rows {
        ctx.output
            .kv(row.sku, &producibility_badge(&row.report.producibility));
        for material in &row.report.materials {
            let note = if material.missing {
                " (no stock record)"
            } else if row.report.limiting.contains(&material.raw_material_id) {
                " (limiting)"
            } else {
                ""
            };
            ctx.output.table_row(
                &[
                    &format!("  {}", material.raw_material_id),
                    &format!(
                        "{} / {}",
                        format_quantity(material.available, scale),
                        format_quantity(material.required, scale)
                    ),
                    &format!("{}{}", material.units, note),
                ],
                &[24, 20, 24],
            );
        }
    }

    Ok(())
}
