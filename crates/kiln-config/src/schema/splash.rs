//! Splash screen configuration.

use serde::{Deserialize, Serialize};

/// Splash surface shown while the worker starts.
///
/// The splash is only used when `content` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    /// URL or file path rendered inside the splash surface.
    pub content: Option<String>,
    /// Show the target window as soon as it can be constructed instead of
    /// waiting for its first paint.
    pub show_window_early: bool,
    /// The splash never closes before this elapses.
    pub min_duration_ms: u64,
    /// The splash always closes once this elapses.
    pub max_duration_ms: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            content: None,
            show_window_early: false,
            min_duration_ms: 1000,
            max_duration_ms: 10_000,
            width: None,
            height: None,
        }
    }
}

impl SplashConfig {
    pub fn is_enabled(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splash_disabled_without_content() {
        let config = SplashConfig::default();
        assert!(!config.is_enabled());

        let config = SplashConfig {
            content: Some("  ".into()),
            ..Default::default()
        };
        assert!(!config.is_enabled());
    }

    #[test]
    fn splash_partial_toml() {
        let config: SplashConfig = toml::from_str(
            r#"
content = "splash.html"
max_duration_ms = 3000
"#,
        )
        .unwrap();
        assert!(config.is_enabled());
        assert_eq!(config.max_duration_ms, 3000);
        assert_eq!(config.min_duration_ms, 1000);
        assert_eq!(config.width, None);
    }
}
