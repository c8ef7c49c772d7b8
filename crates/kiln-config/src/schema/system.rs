//! Chrome, IPC, and logging settings.

use kiln_common::ChromeMode;
use serde::{Deserialize, Serialize};

/// Title bar preference. Lower priority than the environment override,
/// the macOS platform default, and the persisted prior choice.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ChromeConfig {
    pub preference: Option<ChromeMode>,
}

/// Control-plane settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Pending host-to-window requests are abandoned after this long.
    pub reply_timeout_ms: u64,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            reply_timeout_ms: 10_000,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// `EnvFilter` directive for the host's own crates.
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "kiln=trace",
            LogLevel::Debug => "kiln=debug",
            LogLevel::Info => "kiln=info",
            LogLevel::Warn => "kiln=warn",
            LogLevel::Error => "kiln=error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_preference_from_toml() {
        let config: ChromeConfig = toml::from_str(r#"preference = "custom""#).unwrap();
        assert_eq!(config.preference, Some(ChromeMode::Custom));

        let config: ChromeConfig = toml::from_str("").unwrap();
        assert_eq!(config.preference, None);
    }

    #[test]
    fn log_level_directive() {
        assert_eq!(LogLevel::default().directive(), "kiln=info");
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level.directive(), "kiln=debug");
    }
}
