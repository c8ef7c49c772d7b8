//! Worker linked into the host and run on its tokio runtime.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use kiln_common::{HostError, StartupError};
use tokio::sync::oneshot;

use super::WorkerHandle;

/// What an in-process worker is told at startup.
#[derive(Debug, Clone)]
pub struct WorkerEnv {
    pub token: String,
    pub user_data_dir: PathBuf,
    pub args: Vec<String>,
}

/// Hands the listening port back to the supervisor. Dropping it without
/// publishing fails the start.
pub struct PortPublisher(oneshot::Sender<u16>);

impl PortPublisher {
    pub fn publish(self, port: u16) {
        if self.0.send(port).is_err() {
            tracing::debug!(port, "port published after supervisor gave up");
        }
    }
}

#[async_trait]
pub trait InProcessWorker: Send {
    /// Bind, publish the port, then serve until cancelled.
    async fn run(self: Box<Self>, env: WorkerEnv, publisher: PortPublisher) -> Result<(), HostError>;
}

pub(super) async fn start(
    worker: Box<dyn InProcessWorker>,
    env: WorkerEnv,
    startup_timeout: Option<Duration>,
) -> Result<WorkerHandle, StartupError> {
    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(async move {
        match worker.run(env, PortPublisher(tx)).await {
            Ok(()) => tracing::info!("in-process worker finished"),
            Err(e) => tracing::error!(error = %e, "in-process worker failed"),
        }
    });

    let published = match startup_timeout {
        Some(limit) => match tokio::time::timeout(limit, rx).await {
            Ok(result) => result,
            Err(_) => {
                task.abort();
                return Err(StartupError::Timeout(limit.as_millis() as u64));
            }
        },
        None => rx.await,
    };

    match published {
        Ok(port) => {
            tracing::info!(port, "in-process worker published its port");
            Ok(WorkerHandle::in_process(port, task))
        }
        Err(_) => Err(StartupError::NoPortReported),
    }
}
