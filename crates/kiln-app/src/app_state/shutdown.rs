//! Teardown once the event loop has returned.

use super::core::KilnApp;
use super::types::RUNTIME_SHUTDOWN_TIMEOUT;

// =============================================================================
// SHUTDOWN
// =============================================================================

impl KilnApp {
    /// Release everything the host still holds.
    ///
    /// Order matters:
    /// 1. Drop the controller (its worker handle stops the worker group and
    ///    an unfinished worker start is aborted)
    /// 2. Release the instance socket so the next launch becomes primary
    /// 3. Shut down tokio runtime (cancelled tasks drop, so an aborted worker
    ///    start signals whatever it had spawned)
    pub fn shutdown(&mut self) {
        tracing::info!("Initiating graceful shutdown");

        // 1. Remember the outcome, then drop the controller
        if let Some(controller) = self.controller.take() {
            if self.exit_code.is_none() {
                self.exit_code = controller.exit_code();
            }
        }

        // 2. Removes the socket file
        self.instance = None;

        // 3. Shut down tokio runtime (cancels reply waits, timers, the writer)
        if let Some(rt) = self.tokio_runtime.take() {
            rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
        }

        tracing::info!("Graceful shutdown complete");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use kiln_config::KilnConfig;
    use kiln_core::{InstanceRole, LaunchOptions, LaunchRequest};
    use kiln_platform::UserDataDir;

    use crate::app_state::core::KilnApp;

    fn fresh_app(dir: &tempfile::TempDir) -> KilnApp {
        let user_data_dir = UserDataDir::resolve(Some(dir.path())).unwrap();
        let InstanceRole::Primary(guard) = kiln_core::acquire(&user_data_dir, &LaunchRequest::default()).unwrap()
        else {
            panic!("a fresh profile must be primary");
        };
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let launch = LaunchOptions {
            request: LaunchRequest::default(),
            user_data_dir,
            no_early_window: true,
            worker_args: Vec::new(),
        };
        KilnApp::new(KilnConfig::default(), launch, true, runtime, guard)
    }

    #[test]
    fn shutdown_on_fresh_app_releases_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = fresh_app(&dir);

        app.shutdown();

        assert!(app.controller.is_none());
        assert!(app.instance.is_none());
        assert!(app.tokio_runtime.is_none());
        assert_eq!(app.exit_code(), 0);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = fresh_app(&dir);

        app.shutdown();
        app.shutdown(); // second call must not panic

        assert!(app.controller.is_none());
        assert!(app.tokio_runtime.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn shutdown_frees_the_instance_socket() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = fresh_app(&dir);
        let socket = kiln_platform::instance_socket(&UserDataDir::resolve(Some(dir.path())).unwrap());
        assert!(socket.exists());

        app.shutdown();
        assert!(!socket.exists());
    }
}
