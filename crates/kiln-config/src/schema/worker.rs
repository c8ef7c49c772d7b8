//! Worker process configuration.

use serde::{Deserialize, Serialize};

/// How the worker is hosted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[derive(Default)]
pub enum WorkerMode {
    /// Separate child process in its own process group.
    #[default]
    Forked,
    /// Runs on the host's async runtime.
    InProcess,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub mode: WorkerMode,
    /// Executable started in forked mode.
    pub command: Option<String>,
    /// Extra arguments placed before the forwarded startup arguments.
    pub args: Vec<String>,
    /// Give up waiting for the port announcement after this long (0 = wait forever).
    pub startup_timeout_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mode: WorkerMode::Forked,
            command: None,
            args: Vec::new(),
            startup_timeout_ms: 30_000,
        }
    }
}
