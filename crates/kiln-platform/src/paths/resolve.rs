use std::path::{Path, PathBuf};

use kiln_common::PlatformError;

pub(super) const APP_NAME: &str = "kiln";

/// Returns the platform-specific configuration directory for Kiln.
///
/// - macOS: `~/Library/Application Support/kiln`
/// - Linux: `$XDG_CONFIG_HOME/kiln` (defaults to `~/.config/kiln`)
/// - Windows: `%APPDATA%\kiln`
pub fn config_dir() -> Result<PathBuf, PlatformError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory for Kiln.
///
/// - Linux: `$XDG_DATA_HOME/kiln` (defaults to `~/.local/share/kiln`)
pub fn data_dir() -> Result<PathBuf, PlatformError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| PlatformError::PathError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Directory holding all per-user host state. `--user-data-dir` relocates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataDir(PathBuf);

impl UserDataDir {
    /// Resolve the directory, preferring an explicit override.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, PlatformError> {
        match override_dir {
            Some(dir) => Ok(Self(dir.to_path_buf())),
            None => Ok(Self(data_dir()?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Returns the keyed JSON state store inside the user data directory.
pub fn state_file(dir: &UserDataDir) -> PathBuf {
    dir.path().join("state.json")
}

/// Returns the socket the primary instance listens on for second launches.
pub fn instance_socket(dir: &UserDataDir) -> PathBuf {
    dir.path().join("kiln.sock")
}
