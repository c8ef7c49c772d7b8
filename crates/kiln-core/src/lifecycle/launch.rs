//! What a launch asks for, and turning its resource path into a real one.

use std::path::{Path, PathBuf};

use kiln_common::ResolutionError;
use serde::{Deserialize, Serialize};

/// The parts of a command line the host acts on. A second instance sends
/// one of these to the primary instead of starting up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchRequest {
    /// Positional path to open a workspace on.
    pub resource: Option<String>,
    /// One-shot URL handed to the first window that accepts it.
    pub open_url: Option<String>,
    /// Working directory relative resources are resolved against.
    pub cwd: Option<PathBuf>,
}

impl LaunchRequest {
    pub fn is_url_only(&self) -> bool {
        self.resource.is_none() && self.open_url.is_some()
    }
}

/// Canonicalize `raw`, joining it onto `cwd` first when it is relative.
pub fn resolve_resource(raw: &str, cwd: Option<&Path>) -> Result<PathBuf, ResolutionError> {
    let path = Path::new(raw);
    let joined = match cwd {
        Some(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    };
    joined
        .canonicalize()
        .map_err(|source| ResolutionError { path: joined, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_use_the_sender_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("project")).unwrap();
        let resolved = resolve_resource("project", Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path().join("project").canonicalize().unwrap());
    }

    #[test]
    fn absolute_paths_ignore_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let raw = dir.path().to_string_lossy().into_owned();
        let resolved = resolve_resource(&raw, Some(other.path())).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn missing_path_is_a_resolution_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_resource("nope/nothing", Some(dir.path())).unwrap_err();
        assert_eq!(err.path, dir.path().join("nope/nothing"));
    }

    #[test]
    fn request_wire_shape() {
        let request = LaunchRequest {
            resource: Some("a".into()),
            open_url: None,
            cwd: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"resource":"a","openUrl":null,"cwd":null}"#);
        let back: LaunchRequest = serde_json::from_str(r#"{"openUrl":"kiln://x"}"#).unwrap();
        assert!(back.is_url_only());
    }
}
