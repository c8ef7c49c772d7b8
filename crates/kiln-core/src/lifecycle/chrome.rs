//! Which chrome mode new windows get.
//!
//! Sources are consulted in a fixed order and the first one with an
//! opinion wins:
//!
//! 1. `KILN_TITLE_BAR` environment override
//! 2. platform default (custom on macOS)
//! 3. the choice persisted from a previous session
//! 4. `chrome.preference` from the config file
//! 5. native

use kiln_common::ChromeMode;

/// Environment variable overriding every other chrome source.
pub const CHROME_ENV_VAR: &str = "KILN_TITLE_BAR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeSource {
    Environment,
    Platform,
    Persisted,
    Configured,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ChromeResolver {
    sources: [(ChromeSource, Option<ChromeMode>); 4],
}

impl ChromeResolver {
    pub fn new(
        environment: Option<ChromeMode>,
        platform: Option<ChromeMode>,
        persisted: Option<ChromeMode>,
        configured: Option<ChromeMode>,
    ) -> Self {
        Self {
            sources: [
                (ChromeSource::Environment, environment),
                (ChromeSource::Platform, platform),
                (ChromeSource::Persisted, persisted),
                (ChromeSource::Configured, configured),
            ],
        }
    }

    /// Read the environment and platform sources from the running process.
    pub fn from_process(persisted: Option<ChromeMode>, configured: Option<ChromeMode>) -> Self {
        let environment = std::env::var(CHROME_ENV_VAR)
            .ok()
            .and_then(|raw| match raw.parse::<ChromeMode>() {
                Ok(mode) => Some(mode),
                Err(e) => {
                    tracing::warn!(var = CHROME_ENV_VAR, error = %e, "ignoring chrome override");
                    None
                }
            });
        Self::new(environment, platform_default(), persisted, configured)
    }

    pub fn resolve(&self) -> (ChromeMode, ChromeSource) {
        self.sources
            .iter()
            .find_map(|(source, mode)| mode.map(|m| (m, *source)))
            .unwrap_or((ChromeMode::Native, ChromeSource::Fallback))
    }

    pub fn mode(&self) -> ChromeMode {
        self.resolve().0
    }

    pub fn persisted(&self) -> Option<ChromeMode> {
        self.sources[2].1
    }

    pub fn set_persisted(&mut self, mode: ChromeMode) {
        self.sources[2].1 = Some(mode);
    }
}

fn platform_default() -> Option<ChromeMode> {
    cfg!(target_os = "macos").then_some(ChromeMode::Custom)
}
