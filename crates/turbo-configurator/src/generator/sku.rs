//! SKU assignment.

use std::collections::HashSet;

use crate::config::SkuConfig;
use crate::error::ConfiguratorError;

/// Uppercase the first `len` ASCII alphanumerics of `value`.
///
/// A value without any alphanumerics abbreviates to `X`.
pub fn abbreviate(value: &str, len: usize) -> String {
    let abbr: String = value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(len)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if abbr.is_empty() {
        "X".to_string()
    } else {
        abbr
    }
}

/// Hands out SKUs that are unique against a set of already-taken ones.
///
/// Every SKU returned is added to the taken set, so a batch never assigns the
/// same SKU twice.
#[derive(Debug)]
pub struct SkuAllocator<'a> {
    config: &'a SkuConfig,
    taken: HashSet<String>,
}

impl<'a> SkuAllocator<'a> {
    pub fn new(config: &'a SkuConfig, taken: impl IntoIterator<Item = String>) -> Self {
        Self {
            config,
            taken: taken.into_iter().collect(),
        }
    }

    /// The SKU before collision handling.
    pub fn base_sku<S: AsRef<str>>(&self, prefix: &str, values: &[S]) -> String {
        let sep = &self.config.separator;
        let body = values
            .iter()
            .map(|v| abbreviate(v.as_ref(), self.config.abbreviation_len))
            .collect::<Vec<_>>()
            .join(sep);

        if prefix.is_empty() {
            body
        } else {
            format!("{}{}{}", prefix, sep, body)
        }
    }

    /// Allocate a SKU for the option values, suffixing `-2`, `-3`, ... on collision.
    pub fn allocate<S: AsRef<str>>(
        &mut self,
        prefix: &str,
        values: &[S],
    ) -> Result<String, ConfiguratorError> {
        let base = self.base_sku(prefix, values);
        if self.taken.insert(base.clone()) {
            return Ok(base);
        }

        let attempts = self.config.max_attempts;
        for n in 2..=attempts.saturating_add(1) {
            let candidate = format!("{}{}{}", base, self.config.separator, n);
            if self.taken.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }

        Err(ConfiguratorError::SkuCollisionUnresolved {
            sku: base,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate("black", 3), "BLA");
        assert_eq!(abbreviate("x-large", 4), "XLAR");
        assert_eq!(abbreviate("ok", 3), "OK");
        assert_eq!(abbreviate("+++", 3), "X");
    }

    #[test]
    fn test_base_sku() {
        let config = SkuConfig::default();
        let allocator = SkuAllocator::new(&config, Vec::new());
        assert_eq!(allocator.base_sku("TOTE", &["black", "large"]), "TOTE-BLA-LAR");
        assert_eq!(allocator.base_sku("", &["black"]), "BLA");
    }

    #[test]
    fn test_collisions_get_numeric_suffix() {
        let config = SkuConfig::default();
        let mut allocator = SkuAllocator::new(&config, vec!["TOTE-BLA".to_string()]);

        assert_eq!(allocator.allocate("TOTE", &["black"]).unwrap(), "TOTE-BLA-2");
        assert_eq!(allocator.allocate("TOTE", &["blank"]).unwrap(), "TOTE-BLA-3");
        assert_eq!(allocator.allocate("TOTE", &["blue"]).unwrap(), "TOTE-BLU");
    }

    #[test]
    fn test_unresolved_collision() {
        let config = SkuConfig {
            max_attempts: 1,
            ..SkuConfig::default()
        };
        let mut allocator = SkuAllocator::new(
            &config,
            vec!["P-BLA".to_string(), "P-BLA-2".to_string()],
        );

        let err = allocator.allocate("P", &["black"]).unwrap_err();
        assert_eq!(
            err,
            ConfiguratorError::SkuCollisionUnresolved {
                sku: "P-BLA".to_string(),
                attempts: 1
            }
        );
    }
}
