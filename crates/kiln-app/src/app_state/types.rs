//! Internal constants for the app state module.

use std::time::Duration;

/// How often to poll for host and webview events (approx 120 Hz).
pub(super) const POLL_INTERVAL: Duration = Duration::from_millis(8);

/// How long async tasks get to finish once the loop has exited.
pub(super) const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);
