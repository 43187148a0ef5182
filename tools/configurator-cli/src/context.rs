//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use turbo_configurator::ConfiguratorConfig;
use turbo_observability::{StructuredLogger, TracingSink};

use crate::output::Output;

/// File names searched for, nearest directory first.
pub const CONFIG_NAMES: [&str; 3] = ["configurator.toml", ".configurator.toml", "configurator.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Configurator configuration.
    pub config: ConfiguratorConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let config = ConfiguratorConfig::load(path)
                    .with_context(|| format!("Failed to load config file: {}", path))?;
                (config, Some(PathBuf::from(path)))
            }
            None => match Self::find_config(&cwd) {
                Some(path) => {
                    let config = ConfiguratorConfig::load(&path)
                        .with_context(|| format!("Failed to load config file: {}", path.display()))?;
                    (config, Some(path))
                }
                None => (ConfiguratorConfig::default(), None),
            },
        };

        output.debug(&match &config_path {
            Some(path) => format!("Using config {}", path.display()),
            None => "Using default config".to_string(),
        });

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let candidate = current.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Logger for library calls. Entries go through `tracing`.
    pub fn logger(&self) -> StructuredLogger {
        self.config.logger(Arc::new(TracingSink), "configurator-cli")
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
