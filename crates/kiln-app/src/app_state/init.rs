//! Wiring the controller to the webview backend and the async runtime.

use std::sync::mpsc;
use std::time::Instant;

use kiln_config::KilnConfig;
use kiln_core::{
    HostController, HostEvent, HostServices, InstanceGuard, LaunchOptions, SystemShell,
    WorkerSupervisor,
};
use kiln_webview::{MonitorDisplays, SessionCookies, WebViewConfig, WebViewManager};

use super::core::KilnApp;

// =============================================================================
// INITIALIZATION
// =============================================================================

impl KilnApp {
    pub fn new(
        config: KilnConfig,
        launch: LaunchOptions,
        no_fork: bool,
        runtime: tokio::runtime::Runtime,
        mut instance: InstanceGuard,
    ) -> Self {
        let (host_tx, host_rx) = mpsc::channel();

        if let Err(e) = instance.listen(runtime.handle(), host_tx.clone()) {
            tracing::warn!("Cannot accept launches from other instances: {e}");
        }
        spawn_ctrl_c(&runtime, host_tx.clone());

        let cookies = SessionCookies::new();
        let displays = MonitorDisplays::new();
        let webviews = WebViewManager::new(WebViewConfig::default(), cookies.clone());

        let services = HostServices {
            displays: Box::new(displays.clone()),
            credentials: Box::new(cookies),
            shell: Box::new(SystemShell::new()),
        };
        let supervisor = WorkerSupervisor::from_config(&config.worker, no_fork);
        tracing::info!(mode = ?supervisor.mode(), "Worker supervisor ready");

        let controller = HostController::new(
            config,
            launch,
            services,
            supervisor,
            runtime.handle().clone(),
            host_tx,
        );

        Self {
            controller: Some(controller),
            webviews,
            displays,
            host_rx,
            tokio_runtime: Some(runtime),
            instance: Some(instance),
            booted: false,
            exit_code: None,
            last_poll: Instant::now(),
        }
    }
}

/// Ctrl-C asks every window before quitting, like the app menu does.
fn spawn_ctrl_c(runtime: &tokio::runtime::Runtime, host_tx: mpsc::Sender<HostEvent>) {
    runtime.spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, requesting quit");
            if host_tx.send(HostEvent::QuitRequested).is_err() {
                return;
            }
        }
    });
}
