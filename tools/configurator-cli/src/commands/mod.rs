//! CLI command implementations.

pub mod bom;
pub mod config;
pub mod generate;
pub mod producible;

use anyhow::Result;
use clap::{Args, Subcommand};
use turbo_configurator::prelude::*;

use crate::context::Context;
use crate::fixture::LoadedCatalog;

/// Arguments for the generate command.
#[derive(Args)]
pub struct GenerateArgs {
    /// Catalog file (JSON or TOML).
    pub catalog: String,

    /// Product to generate variants for.
    #[arg(short, long)]
    pub product: String,

    /// Write created variants back into the catalog file.
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the bom command.
#[derive(Args)]
pub struct BomArgs {
    /// Catalog file (JSON or TOML).
    pub catalog: String,

    /// Variant id or SKU.
    #[arg(long)]
    pub variant: String,

    /// Multiply quantities for a batch of this many units.
    #[arg(short, long, default_value = "1")]
    pub units: u64,

    /// Print full-precision quantities instead of rounding.
    #[arg(long)]
    pub exact: bool,
}

/// Arguments for the producible command.
#[derive(Args)]
pub struct ProducibleArgs {
    /// Catalog file (JSON or TOML).
    pub catalog: String,

    /// Variant id or SKU. Omit to report every variant in the catalog.
    #[arg(long)]
    pub variant: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Get a config value.
    Get {
        /// Config key (dot-separated).
        key: String,
    },
    /// Set a config value.
    Set {
        /// Config key (dot-separated).
        key: String,
        /// Value to set.
        value: String,
    },
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}

/// Load a catalog file and wrap its store in a service.
fn open_catalog(
    path: &str,
    ctx: &Context,
) -> Result<(LoadedCatalog, ConfiguratorService<DbCatalog>)> {
    let path = ctx.resolve_path(path);
    ctx.output.debug(&format!("Loading catalog {}", path.display()));

    let catalog = LoadedCatalog::open(path, ctx.logger())?;
    let service = ConfiguratorService::new(
        catalog.store.clone(),
        ctx.config.clone(),
        ctx.logger(),
    );
    Ok((catalog, service))
}
