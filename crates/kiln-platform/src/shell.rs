//! Hand paths and URLs to the desktop environment.

use std::path::Path;

use kiln_common::PlatformError;
use tracing::debug;

/// Only these URL schemes are ever passed to the system opener.
const OPENABLE_SCHEMES: &[&str] = &["http://", "https://", "mailto:"];

pub fn is_openable_url(url: &str) -> bool {
    OPENABLE_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

/// Open a URL in the user's default browser / mail client.
pub fn open_url(url: &str) -> Result<(), PlatformError> {
    if !is_openable_url(url) {
        return Err(PlatformError::OpenError(format!(
            "refusing to open url with unsupported scheme: {url}"
        )));
    }
    debug!(url, "opening url");
    open::that_detached(url).map_err(|e| PlatformError::OpenError(format!("{url}: {e}")))
}

/// Open a file or folder with its default system application.
pub fn open_path(path: &Path) -> Result<(), PlatformError> {
    if !path.exists() {
        return Err(PlatformError::OpenError(format!(
            "{} does not exist",
            path.display()
        )));
    }
    debug!(path = %path.display(), "opening path");
    open::that_detached(path).map_err(|e| PlatformError::OpenError(format!("{}: {e}", path.display())))
}

/// Reveal a file in the platform file manager.
pub fn show_in_folder(path: &Path) -> Result<(), PlatformError> {
    #[cfg(target_os = "macos")]
    {
        reveal(std::process::Command::new("open").arg("-R").arg(path))
    }
    #[cfg(target_os = "windows")]
    {
        reveal(std::process::Command::new("explorer").arg(format!("/select,{}", path.display())))
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        // No portable "select" on freedesktop; open the parent directory.
        let dir = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        open_path(dir)
    }
}

#[cfg(any(target_os = "macos", target_os = "windows"))]
fn reveal(cmd: &mut std::process::Command) -> Result<(), PlatformError> {
    debug!(?cmd, "revealing in file manager");
    cmd.spawn()
        .map(|_| ())
        .map_err(|e| PlatformError::OpenError(e.to_string()))
}
