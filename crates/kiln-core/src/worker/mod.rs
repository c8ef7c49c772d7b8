//! Worker supervision: start the worker, learn its port, stop it again.
//!
//! A [`WorkerSupervisor`] is consumed by [`WorkerSupervisor::start`], which
//! resolves to a [`WorkerHandle`]. The handle owns the reaper and offers an
//! idempotent [`WorkerHandle::terminate`].

mod args;
mod forked;
mod in_process;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kiln_common::{SignalError, StartupError};
use kiln_config::{WorkerConfig, WorkerMode};
use tokio::task::JoinHandle;

use crate::trust::TrustToken;

pub use args::filter_forwarded_args;
pub use forked::parse_port_announcement;
pub use in_process::{InProcessWorker, PortPublisher, WorkerEnv};

/// Environment variable pointing a forked worker at the user-data dir.
pub const USER_DATA_ENV_VAR: &str = "KILN_USER_DATA_DIR";

/// Per-launch inputs.
#[derive(Debug, Clone)]
pub struct WorkerLaunch {
    pub token: TrustToken,
    pub user_data_dir: PathBuf,
    /// Launch arguments, already stripped of host-only flags.
    pub args: Vec<String>,
}

pub struct WorkerSupervisor {
    mode: WorkerMode,
    command: Option<String>,
    command_args: Vec<String>,
    startup_timeout: Option<Duration>,
    in_process: Option<Box<dyn InProcessWorker>>,
}

impl WorkerSupervisor {
    /// `no_fork` forces in-process mode regardless of configuration.
    pub fn from_config(config: &WorkerConfig, no_fork: bool) -> Self {
        let mode = if no_fork {
            WorkerMode::InProcess
        } else {
            config.mode
        };
        let startup_timeout =
            (config.startup_timeout_ms > 0).then(|| Duration::from_millis(config.startup_timeout_ms));
        Self {
            mode,
            command: config.command.clone(),
            command_args: config.args.clone(),
            startup_timeout,
            in_process: None,
        }
    }

    /// Link an in-process worker implementation.
    pub fn with_in_process(mut self, worker: Box<dyn InProcessWorker>) -> Self {
        self.in_process = Some(worker);
        self
    }

    pub fn mode(&self) -> WorkerMode {
        self.mode
    }

    pub async fn start(self, launch: WorkerLaunch) -> Result<WorkerHandle, StartupError> {
        tracing::info!(mode = ?self.mode, "starting worker");
        match self.mode {
            WorkerMode::InProcess => {
                let worker = self.in_process.ok_or(StartupError::NoInProcessWorker)?;
                let env = WorkerEnv {
                    token: launch.token.as_str().to_string(),
                    user_data_dir: launch.user_data_dir,
                    args: launch.args,
                };
                in_process::start(worker, env, self.startup_timeout).await
            }
            WorkerMode::Forked => {
                let program = self.command.as_deref().ok_or_else(|| {
                    StartupError::Spawn(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "worker.command is not configured",
                    ))
                })?;
                let mut args = self.command_args.clone();
                args.extend(launch.args.iter().cloned());
                forked::spawn(program, &args, &launch, self.startup_timeout).await
            }
        }
    }
}

enum Running {
    Forked {
        pgid: u32,
        exited: Arc<AtomicBool>,
    },
    InProcess {
        task: JoinHandle<()>,
    },
}

/// A started worker.
pub struct WorkerHandle {
    port: u16,
    running: Running,
    terminated: bool,
}

impl WorkerHandle {
    fn forked(port: u16, pgid: u32, exited: Arc<AtomicBool>) -> Self {
        Self {
            port,
            running: Running::Forked { pgid, exited },
            terminated: false,
        }
    }

    fn in_process(port: u16, task: JoinHandle<()>) -> Self {
        Self {
            port,
            running: Running::InProcess { task },
            terminated: false,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn has_exited(&self) -> bool {
        match &self.running {
            Running::Forked { exited, .. } => exited.load(Ordering::SeqCst),
            Running::InProcess { task } => task.is_finished(),
        }
    }

    /// Ask the worker and all its descendants to stop.
    ///
    /// Safe to call any number of times and after the worker has exited on
    /// its own. The group is signalled even then, since descendants outlive
    /// the leader. Only a signal failure other than "no such process" is an
    /// error.
    pub fn terminate(&mut self) -> Result<(), SignalError> {
        if self.terminated {
            return Ok(());
        }
        match &self.running {
            Running::InProcess { task } => task.abort(),
            Running::Forked { pgid, exited } => {
                if exited.load(Ordering::SeqCst) {
                    tracing::debug!(pgid, "worker leader already exited; signalling what is left");
                }
                signal_group(*pgid)?;
            }
        }
        self.terminated = true;
        Ok(())
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            tracing::error!(error = %e, "failed to stop worker on drop");
        }
    }
}

#[cfg(unix)]
fn signal_group(pgid: u32) -> Result<(), SignalError> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let group = i32::try_from(pgid).map_err(|_| SignalError {
        pgid: -1,
        reason: format!("pid {pgid} out of range"),
    })?;
    match killpg(Pid::from_raw(group), Signal::SIGTERM) {
        Ok(()) => {
            tracing::info!(pgid, "sent SIGTERM to worker process group");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            tracing::debug!(pgid, "worker process group already gone");
            Ok(())
        }
        Err(errno) => Err(SignalError {
            pgid: group,
            reason: errno.to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn signal_group(pgid: u32) -> Result<(), SignalError> {
    // No process groups here; /T takes the whole tree down instead.
    std::process::Command::new("taskkill")
        .args(["/PID", &pgid.to_string(), "/T", "/F"])
        .status()
        .map(|_| ())
        .map_err(|e| SignalError {
            pgid: pgid as i32,
            reason: e.to_string(),
        })
}
