//! Generation settings loaded from `generation.toml`.
//!
//! Every field has a default, so the file is optional and may set only the
//! values it wants to change.

use crate::core::load::DEFAULT_BATCH_SIZE;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the generation settings file
pub const DEFAULT_CONFIG_PATH: &str = "generation.toml";

/// Volumes and knobs for a single generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Number of customers to generate
    pub customers: usize,
    /// Number of products to generate
    pub products: usize,
    /// Number of orders to generate
    pub orders: usize,
    /// Fewest distinct products on one order
    pub min_items_per_order: usize,
    /// Most distinct products on one order
    pub max_items_per_order: usize,
    /// Rows per insert statement, and rows per committed `OrderItems` batch
    pub batch_size: usize,
    /// Directory the CSV backups are written to
    pub output_dir: PathBuf,
    /// Fixed seed for reproducible runs; a random one is drawn when absent
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            customers: 2000,
            products: 100,
            orders: 10_000,
            min_items_per_order: 1,
            max_items_per_order: 5,
            batch_size: DEFAULT_BATCH_SIZE,
            output_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

impl GenerationConfig {
    /// Checks the settings that would make generation or loading impossible.
    ///
    /// # Errors
    /// Returns `Error::Config` if the item range is empty or starts at zero, or
    /// if `batch_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.min_items_per_order == 0 {
            return Err(Error::Config {
                message: "min_items_per_order must be at least 1".to_string(),
            });
        }
        if self.min_items_per_order > self.max_items_per_order {
            return Err(Error::Config {
                message: format!(
                    "min_items_per_order ({}) exceeds max_items_per_order ({})",
                    self.min_items_per_order, self.max_items_per_order
                ),
            });
        }
        if self.batch_size == 0 {
            return Err(Error::Config {
                message: "batch_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads and validates generation settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or names an unknown field
/// - The settings fail [`GenerationConfig::validate`]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GenerationConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load generation settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    let config: GenerationConfig = toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads `./generation.toml` if it exists, otherwise the built-in defaults.
pub fn load_default_config() -> Result<GenerationConfig> {
    let path = Path::new(DEFAULT_CONFIG_PATH);
    if path.exists() {
        load_config(path)
    } else {
        info!("No {DEFAULT_CONFIG_PATH} found, using built-in generation settings.");
        Ok(GenerationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_str = r#"
            customers = 5
            products = 3
            orders = 10
            seed = 42
        "#;

        let config: GenerationConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.customers, 5);
        assert_eq!(config.products, 3);
        assert_eq!(config.orders, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.min_items_per_order, 1);
        assert_eq!(config.max_items_per_order, 5);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<GenerationConfig, _> = toml::from_str("custmers = 5");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let zero_min = GenerationConfig {
            min_items_per_order: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(zero_min.validate(), Err(Error::Config { .. })));

        let inverted = GenerationConfig {
            min_items_per_order: 4,
            max_items_per_order: 2,
            ..GenerationConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(Error::Config { .. })));

        let no_batch = GenerationConfig {
            batch_size: 0,
            ..GenerationConfig::default()
        };
        assert!(matches!(no_batch.validate(), Err(Error::Config { .. })));

        assert!(GenerationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "orders = 25\nbatch_size = 10\noutput_dir = \"backups\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.orders, 25);
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.output_dir, PathBuf::from("backups"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
