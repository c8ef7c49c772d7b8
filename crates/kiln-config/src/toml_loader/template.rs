//! Default TOML config template with inline documentation comments.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;

use kiln_common::ConfigError;
use tracing::info;

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Kiln Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[window]
# title = "Kiln"
# min_width = 400
# min_height = 270
# background_color = "#1e1e1e"
# save_debounce_ms = 400     # quiet period before move/resize is persisted
# show_early = true          # create the first window before the worker is up
# entry_path = "/"

[splash]
# content = "splash.html"    # enables the splash surface
# show_window_early = false
# min_duration_ms = 1000
# max_duration_ms = 10000
# width = 640
# height = 480

[worker]
# mode = "forked"            # forked | in-process
# command = "/path/to/worker"
# args = []
# startup_timeout_ms = 30000 # 0 waits forever

[chrome]
# preference = "native"      # native | custom

[ipc]
# reply_timeout_ms = 10000

[logging]
# level = "info"             # trace | debug | info | warn | error
"##
    .to_string()
}

/// Seed `path` with the documented template. An existing file, even one
/// created a moment ago by another launch, is left alone.
pub fn write_template(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(()),
        Err(e) => {
            return Err(ConfigError::ParseError(format!("cannot create {}: {e}", path.display())));
        }
    };
    file.write_all(default_config_toml().as_bytes())
        .map_err(|e| ConfigError::ParseError(format!("cannot write {}: {e}", path.display())))?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}
