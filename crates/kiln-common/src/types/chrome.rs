use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who draws the window decorations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChromeMode {
    /// The OS draws the title bar and borders.
    Native,
    /// The application draws its own title bar inside the window.
    Custom,
}

impl ChromeMode {
    pub fn is_native(self) -> bool {
        self == ChromeMode::Native
    }
}

impl fmt::Display for ChromeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChromeMode::Native => f.write_str("native"),
            ChromeMode::Custom => f.write_str("custom"),
        }
    }
}

impl FromStr for ChromeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(ChromeMode::Native),
            "custom" => Ok(ChromeMode::Custom),
            other => Err(format!("unknown chrome mode '{other}'")),
        }
    }
}

/// Host lifecycle phase, pushed to windows as `app-state-changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppState {
    Booting,
    Running,
    Stopping,
}
