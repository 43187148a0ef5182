//! Bill of materials command.

use anyhow::{bail, Result};
use serde::Serialize;
use turbo_configurator::bom::ResolvedLine;
use turbo_configurator::quantity::round_for_display;

use super::{open_catalog, BomArgs};
use crate::context::Context;
use crate::output::format_quantity;

#[derive(Serialize)]
struct BomReport<'a> {
    variant_id: &'a str,
    units: u64,
    lines: Vec<ResolvedLine>,
}

/// Run the bom command.
pub fn run(args: BomArgs, ctx: &Context) -> Result<()> {
    if args.units == 0 {
        bail!("--units must be at least 1");
    }

    let (catalog, service) = open_catalog(&args.catalog, ctx)?;
    let variant_id = catalog.fixture.find_variant(&args.variant)?;
    let bom = service.resolve_bom(&variant_id)?;

    let scale = ctx.config.resolution.display_scale;
    let mut lines = bom.scaled(args.units)?;
    if !args.exact {
        lines = lines
            .into_iter()
            .map(|mut line| {
                line.quantity = round_for_display(line.quantity, scale);
                line
            })
            .collect();
    }

    if ctx.output.is_json() {
        ctx.output.json(&BomReport {
            variant_id: variant_id.as_str(),
            units: args.units,
            lines,
        });
        return Ok(());
    }

    ctx.output
        .header(&format!("Materials for {} x {}", args.units, args.variant));
    if lines.is_empty() {
        ctx.output.info("No materials required");
        return Ok(());
    }

    let widths = [24, 14, 6];
    ctx.output.table_row(&["MATERIAL", "QUANTITY", "UNIT"], &widths);
    for line in &lines {
        let quantity = if args.exact {
            line.quantity.normalize().to_string()
        } else {
            format_quantity(line.quantity, scale)
        };
        ctx.output.table_row(
            &[line.raw_material_id.as_str(), &quantity, &line.unit],
            &widths,
        );
    }

    Ok(())
}
