//! Configurator CLI - Work with a product catalog file from the command line.
//!
//! Commands:
//! - `configurator generate` - Generate missing variants for a product
//! - `configurator bom` - Resolve a variant's bill of materials
//! - `configurator producible` - Show how many units stock supports
//! - `configurator config` - Manage configuration

mod commands;
mod context;
mod fixture;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BomArgs, ConfigArgs, GenerateArgs, ProducibleArgs};

/// Configurator CLI - Generate variants and resolve materials for a catalog
#[derive(Parser)]
#[command(name = "configurator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate missing variants for a product
    Generate(GenerateArgs),

    /// Resolve the bill of materials of a variant
    Bom(BomArgs),

    /// Compute how many units of a variant current stock supports
    Producible(ProducibleArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args, &ctx),
        Commands::Bom(args) => commands::bom::run(args, &ctx),
        Commands::Producible(args) => commands::producible::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
