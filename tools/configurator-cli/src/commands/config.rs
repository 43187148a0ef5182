//! Configuration management commands.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Result};
use turbo_configurator::ConfiguratorConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::{Context, CONFIG_NAMES};

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Get { key } => get_config(&key, ctx),
        ConfigCommand::Set { key, value } => set_config(&key, &value, ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    if let Some(path) = &ctx.config_path {
        ctx.output.kv("file", &path.display().to_string());
    }

    ctx.output.info("[sku]");
    ctx.output.kv("separator", &ctx.config.sku.separator);
    ctx.output
        .kv("abbreviation_len", &ctx.config.sku.abbreviation_len.to_string());
    ctx.output
        .kv("max_attempts", &ctx.config.sku.max_attempts.to_string());

    ctx.output.info("[generation]");
    ctx.output
        .kv("max_retries", &ctx.config.generation.max_retries.to_string());

    ctx.output.info("[resolution]");
    ctx.output.kv(
        "display_scale",
        &ctx.config.resolution.display_scale.to_string(),
    );

    ctx.output.info("[logging]");
    ctx.output.kv("level", &ctx.config.logging.level.to_string());
    ctx.output
        .kv("format", &format!("{:?}", ctx.config.logging.format).to_lowercase());

    Ok(())
}

fn get_config(key: &str, ctx: &Context) -> Result<()> {
    let value = get_config_value(&ctx.config, key)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "key": key, "value": value }));
    } else {
        println!("{}", value);
    }

    Ok(())
}

fn set_config(key: &str, value: &str, ctx: &Context) -> Result<()> {
    let Some(config_path) = ctx.config_path.clone() else {
        bail!("No config file found. Run `configurator config init` to create one.");
    };

    let mut config = ctx.config.clone();
    set_config_value(&mut config, key, value)?;
    config.validate()?;

    let content = if config_path.extension().is_some_and(|e| e == "json") {
        serde_json::to_string_pretty(&config)?
    } else {
        config.to_toml_string()?
    };
    fs::write(&config_path, content)?;

    ctx.output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path: PathBuf = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, ConfiguratorConfig::default().to_toml_string()?)?;

    ctx.output
        .success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    ctx.config.validate()?;

    if ctx.config.generation.max_retries == 0 {
        ctx.output.warn(
            "generation.max_retries is 0: a SKU taken concurrently fails generation immediately",
        );
    }
    if ctx.config.resolution.display_scale == 0 {
        ctx.output
            .warn("resolution.display_scale is 0: quantities display as whole numbers");
    }

    ctx.output.success("Configuration is valid");

    Ok(())
}

fn get_config_value(config: &ConfiguratorConfig, key: &str) -> Result<String> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["sku", "separator"] => Ok(config.sku.separator.clone()),
        ["sku", "abbreviation_len"] => Ok(config.sku.abbreviation_len.to_string()),
        ["sku", "max_attempts"] => Ok(config.sku.max_attempts.to_string()),
        ["generation", "max_retries"] => Ok(config.generation.max_retries.to_string()),
        ["resolution", "display_scale"] => Ok(config.resolution.display_scale.to_string()),
        ["logging", "level"] => Ok(config.logging.level.to_string().to_lowercase()),
        ["logging", "format"] => Ok(format!("{:?}", config.logging.format).to_lowercase()),
        _ => bail!("Unknown config key: {}", key),
    }
}

fn set_config_value(config: &mut ConfiguratorConfig, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["sku", "separator"] => config.sku.separator = value.to_string(),
        ["sku", "abbreviation_len"] => config.sku.abbreviation_len = value.parse()?,
        ["sku", "max_attempts"] => config.sku.max_attempts = value.parse()?,
        ["generation", "max_retries"] => config.generation.max_retries = value.parse()?,
        ["resolution", "display_scale"] => config.resolution.display_scale = value.parse()?,
        ["logging", "level"] => {
            config.logging.level = value.parse().map_err(anyhow::Error::msg)?
        }
        ["logging", "format"] => {
            config.logging.format = value.parse().map_err(anyhow::Error::msg)?
        }
        _ => bail!("Unknown config key: {}", key),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_set_values() {
        let mut config = ConfiguratorConfig::default();
        assert_eq!(get_config_value(&config, "sku.separator").unwrap(), "-");

        set_config_value(&mut config, "sku.abbreviation_len", "4").unwrap();
        set_config_value(&mut config, "logging.level", "debug").unwrap();
        assert_eq!(get_config_value(&config, "sku.abbreviation_len").unwrap(), "4");
        assert_eq!(get_config_value(&config, "logging.level").unwrap(), "debug");

        assert!(set_config_value(&mut config, "sku.max_attempts", "many").is_err());
        assert!(set_config_value(&mut config, "logging.level", "loud").is_err());
        assert!(get_config_value(&config, "deploy.canary").is_err());
    }
}
