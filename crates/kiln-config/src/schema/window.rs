//! Window configuration types.

use serde::{Deserialize, Serialize};

/// Defaults for every presentation window the host creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Static window title.
    pub title: String,
    pub min_width: u32,
    pub min_height: u32,
    /// Background painted before the first frame (`#rrggbb`).
    pub background_color: String,
    /// Quiet period after the last move/resize before geometry is saved.
    pub save_debounce_ms: u64,
    /// Create the first window before the worker is ready and load the
    /// worker URL into it once it is.
    pub show_early: bool,
    /// Path on the worker origin loaded into new windows.
    pub entry_path: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Kiln".into(),
            min_width: 400,
            min_height: 270,
            background_color: "#1e1e1e".into(),
            save_debounce_ms: 400,
            show_early: true,
            entry_path: "/".into(),
        }
    }
}
