//! Finding, reading, and seeding the TOML config file.
//!
//! A path given on the command line must exist. The per-user location is
//! seeded with a commented template the first time it is read.

mod loader;
mod template;


use std::path::{Path, PathBuf};

use kiln_common::ConfigError;

use crate::schema::KilnConfig;

pub use loader::{load_default, load_from_path};
pub use template::write_template;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Where the config comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config`; a missing file is an error.
    Explicit(PathBuf),
    /// The per-user location; a missing file is seeded.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Ok(Self::Explicit(path.to_path_buf())),
            None => default_config_path().map(Self::Default),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Explicit(path) | Self::Default(path) => path,
        }
    }

    pub fn load(&self) -> Result<KilnConfig, ConfigError> {
        match self {
            Self::Explicit(path) => load_from_path(path),
            Self::Default(path) => loader::load_or_seed(path),
        }
    }
}

/// `<config dir>/kiln/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("kiln").join(CONFIG_FILE_NAME))
        .ok_or_else(|| ConfigError::ParseError("no per-user config directory on this platform".into()))
}
