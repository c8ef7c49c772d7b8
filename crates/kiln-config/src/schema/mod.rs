//! Configuration schema types for Kiln.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod splash;
mod system;
mod window;
mod worker;

pub use splash::*;
pub use system::*;
pub use window::*;
pub use worker::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct KilnConfig {
    pub window: WindowConfig,
    pub splash: SplashConfig,
    pub worker: WorkerConfig,
    pub chrome: ChromeConfig,
    pub ipc: IpcConfig,
    pub logging: LoggingConfig,
}
