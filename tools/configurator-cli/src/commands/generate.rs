//! Variant generation command.

use anyhow::Result;
use turbo_configurator::prelude::*;

use super::{open_catalog, GenerateArgs};
use crate::context::Context;

/// Run the generate command.
pub fn run(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let (mut catalog, service) = open_catalog(&args.catalog, ctx)?;
    let product_id = ProductId::new(&args.product);

    let axes = service.resolve_axes(&product_id)?;
    for key in &axes.empty_axes {
        ctx.output
            .warn(&format!("Axis '{}' has no active options and is skipped", key));
    }

    let outcome = service.generate_variants(&product_id)?;

    if args.save && !outcome.created.is_empty() {
        catalog.save_variants(&outcome.created)?;
        ctx.output
            .debug(&format!("Saved variants to {}", catalog.path.display()));
    }

    if ctx.output.is_json() {
        ctx.output.json(&outcome);
        return Ok(());
    }

    ctx.output.header(&format!("Variants for {}", product_id));
    ctx.output.kv(
        "axes",
        &axes
            .axes
            .iter()
            .map(|a| format!("{} ({})", a.key, a.options.len()))
            .collect::<Vec<_>>()
            .join(" x "),
    );
    ctx.output.kv("combinations", &outcome.candidates.to_string());
    ctx.output.kv("already present", &outcome.existing.to_string());

    if outcome.created.is_empty() {
        ctx.output.success("Variants are up to date");
        return Ok(());
    }

    let widths = [24, 8];
    ctx.output.table_row(&["SKU", "POSITION"], &widths);
    for variant in &outcome.created {
        ctx.output
            .table_row(&[&variant.sku, &variant.position.to_string()], &widths);
    }

    ctx.output
        .success(&format!("Created {} variant(s)", outcome.created.len()));
    if !args.save {
        ctx.output.info("Run with --save to keep them in the catalog file");
    }

    Ok(())
}
