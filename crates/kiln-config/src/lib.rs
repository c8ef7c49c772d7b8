//! Kiln host configuration.
//!
//! TOML-based configuration with full validation. All sections use
//! `serde(default)` so a partial (or empty) config file works.
//!
//! ```rust,no_run
//! let config = kiln_config::load_config().expect("failed to load config");
//! println!("{}", kiln_config::config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::*;

use kiln_common::ConfigError;

/// Load config from the platform default path, creating a documented
/// default file when none exists, and validate the result.
pub fn load_config() -> Result<KilnConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &KilnConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
