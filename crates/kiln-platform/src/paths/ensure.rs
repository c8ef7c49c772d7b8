use std::fs;

use kiln_common::PlatformError;

use super::resolve::{config_dir, UserDataDir};

/// Creates the config and user data directories if they do not already exist.
pub fn ensure_dirs(user_data: &UserDataDir) -> Result<(), PlatformError> {
    fs::create_dir_all(config_dir()?).map_err(|e| PlatformError::PathError(e.to_string()))?;
    fs::create_dir_all(user_data.path()).map_err(|e| PlatformError::PathError(e.to_string()))?;
    Ok(())
}
