//! KilnApp struct definition.

use std::sync::mpsc;
use std::time::Instant;

use kiln_core::{HostController, HostEvent, InstanceGuard};
use kiln_webview::{MonitorDisplays, WebViewManager};

/// Top-level application state.
pub struct KilnApp {
    pub(super) controller: Option<HostController>,

    // Windowing
    pub(super) webviews: WebViewManager,
    pub(super) displays: MonitorDisplays,

    // Results of async work, drained every poll
    pub(super) host_rx: mpsc::Receiver<HostEvent>,
    pub(super) tokio_runtime: Option<tokio::runtime::Runtime>,

    // Keeps other launches forwarding to us
    pub(super) instance: Option<InstanceGuard>,

    pub(super) booted: bool,
    pub(super) exit_code: Option<i32>,
    pub(super) last_poll: Instant,
}

impl KilnApp {
    /// Process exit code. Zero unless the host failed to start.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
            .or_else(|| self.controller.as_ref().and_then(HostController::exit_code))
            .unwrap_or(0)
    }
}
