//! The keyed JSON state file under the user-data directory.

use std::fs;
use std::path::{Path, PathBuf};

use kiln_common::PersistenceError;
use serde_json::{Map, Value};

use super::PersistedWindowGeometry;

/// Key the window record lives under.
pub const WINDOW_STATE_KEY: &str = "windowState";

/// A small JSON object on disk. Other keys written by other parts of the
/// host are preserved on every write.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "state store is not a JSON object; starting fresh");
                Ok(Map::new())
            }
        }
    }

    /// The saved window record, if any. Shape mismatches read as "none".
    pub fn load_window_state(&self) -> Result<Option<PersistedWindowGeometry>, PersistenceError> {
        let mut map = self.read_map()?;
        let Some(value) = map.remove(WINDOW_STATE_KEY) else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(geometry) => Ok(Some(geometry)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable window state");
                Ok(None)
            }
        }
    }

    /// Replace the window record, writing through a temp file.
    pub fn save_window_state(&self, geometry: &PersistedWindowGeometry) -> Result<(), PersistenceError> {
        let mut map = self.read_map()?;
        let value =
            serde_json::to_value(geometry).map_err(|e| PersistenceError::Serialize(e.to_string()))?;
        map.insert(WINDOW_STATE_KEY.to_string(), value);
        let json = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| PersistenceError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.write_error(&e))?;
        }
        let temp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp, json) {
            cleanup_temp_file(&temp, &e);
            return Err(self.write_error(&e));
        }
        if let Err(e) = fs::rename(&temp, &self.path) {
            cleanup_temp_file(&temp, &e);
            return Err(self.write_error(&e));
        }
        Ok(())
    }

    fn write_error(&self, e: &std::io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

fn cleanup_temp_file(temp: &Path, original: &std::io::Error) {
    if let Err(cleanup) = fs::remove_file(temp) {
        tracing::warn!(
            temp = %temp.display(),
            original_error = %original,
            cleanup_error = %cleanup,
            "failed to clean up temp state file"
        );
    }
}
