use std::path::Path;

use kiln_common::ConfigError;
use tracing::{info, warn};

use super::template::write_template;
use super::default_config_path;
use crate::schema::KilnConfig;
use crate::validation;

/// Read and parse one config file.
///
/// Missing fields take serde defaults. Validation failures are logged and
/// the parsed config is returned as-is.
pub fn load_from_path(path: &Path) -> Result<KilnConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!("failed to read {}: {e}", path.display())));
        }
    };

    let config: KilnConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "config has impossible values, using them anyway: {e}");
    }
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Like [`load_from_path`], but a missing file is replaced by the
/// documented template and defaults are returned.
pub(super) fn load_or_seed(path: &Path) -> Result<KilnConfig, ConfigError> {
    match load_from_path(path) {
        Err(ConfigError::FileNotFound(_)) => {
            write_template(path)?;
            Ok(KilnConfig::default())
        }
        other => other,
    }
}

/// Load from the per-user location, seeding it on first run.
pub fn load_default() -> Result<KilnConfig, ConfigError> {
    load_or_seed(&default_config_path()?)
}
