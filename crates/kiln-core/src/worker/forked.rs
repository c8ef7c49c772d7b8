//! Worker running as a child process in its own process group.

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kiln_common::StartupError;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, Command};

use super::{signal_group, WorkerHandle, WorkerLaunch, USER_DATA_ENV_VAR};
use crate::trust::TOKEN_ENV_VAR;

#[derive(Deserialize)]
struct PortAnnouncement {
    port: u16,
}

/// Recognise the worker's one-line `{"port": N}` handshake.
pub fn parse_port_announcement(line: &str) -> Option<u16> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str::<PortAnnouncement>(trimmed)
        .ok()
        .map(|a| a.port)
        .filter(|port| *port != 0)
}

/// Output written just before the worker exited may still sit in the pipe.
const EXIT_DRAIN: Duration = Duration::from_millis(250);

pub(super) async fn spawn(
    program: &str,
    args: &[String],
    launch: &WorkerLaunch,
    startup_timeout: Option<Duration>,
) -> Result<WorkerHandle, StartupError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .env(TOKEN_ENV_VAR, launch.token.as_str())
        .env(USER_DATA_ENV_VAR, &launch.user_data_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(StartupError::Spawn)?;
    let pid = child
        .id()
        .ok_or_else(|| StartupError::Spawn(std::io::Error::other("worker has no pid")))?;
    // Until the port is known, anything that goes wrong (including this
    // future being dropped) takes the whole group down.
    let mut group = GroupGuard::new(pid);
    tracing::info!(pid, program, "worker process spawned");

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| StartupError::Spawn(std::io::Error::other("worker stdout not captured")))?;
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_stderr(stderr));
    }
    let mut lines = BufReader::new(stdout).lines();

    let discovered = match startup_timeout {
        Some(limit) => tokio::time::timeout(limit, await_port(&mut child, &mut lines))
            .await
            .unwrap_or(Err(StartupError::Timeout(limit.as_millis() as u64))),
        None => await_port(&mut child, &mut lines).await,
    };

    match discovered {
        Ok(port) => {
            group.disarm();
            tracing::info!(pid, port, "worker reported its port");
            tokio::spawn(forward_stdout(lines));
            let exited = Arc::new(AtomicBool::new(false));
            tokio::spawn(reap(child, pid, exited.clone()));
            Ok(WorkerHandle::forked(port, pid, exited))
        }
        Err(e) => {
            tracing::error!(pid, error = %e, "worker startup failed");
            drop(group);
            tokio::spawn(reap(child, pid, Arc::new(AtomicBool::new(false))));
            Err(e)
        }
    }
}

/// Wait for the port announcement or for the worker itself to exit,
/// whichever happens first. Descendants holding stdout open do not keep
/// a dead worker looking alive.
async fn await_port<R: AsyncBufRead + Unpin>(
    child: &mut Child,
    lines: &mut Lines<R>,
) -> Result<u16, StartupError> {
    let status = tokio::select! {
        found = read_port(lines) => match found {
            Err(StartupError::NoPortReported) => child.wait().await.map_err(StartupError::Spawn)?,
            other => return other,
        },
        status = child.wait() => status.map_err(StartupError::Spawn)?,
    };
    if let Ok(Ok(port)) = tokio::time::timeout(EXIT_DRAIN, read_port(lines)).await {
        return Ok(port);
    }
    Err(StartupError::WorkerExited {
        code: status.code(),
    })
}

/// Signals the worker's process group on drop unless disarmed.
struct GroupGuard {
    pgid: Option<u32>,
}

impl GroupGuard {
    fn new(pgid: u32) -> Self {
        Self { pgid: Some(pgid) }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            if let Err(e) = signal_group(pgid) {
                tracing::warn!(pgid, error = %e, "failed to stop worker after startup error");
            }
        }
    }
}

async fn read_port<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<u16, StartupError> {
    while let Some(line) = lines.next_line().await.map_err(StartupError::Spawn)? {
        if let Some(port) = parse_port_announcement(&line) {
            return Ok(port);
        }
        tracing::info!(target: "kiln::worker", "{line}");
    }
    Err(StartupError::NoPortReported)
}

async fn forward_stdout<R: AsyncBufRead + Unpin>(mut lines: Lines<R>) {
    while let Ok(Some(line)) = lines.next_line().await {
        if parse_port_announcement(&line).is_some() {
            tracing::warn!(target: "kiln::worker", "duplicate port announcement ignored");
            continue;
        }
        tracing::info!(target: "kiln::worker", "{line}");
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::warn!(target: "kiln::worker", "{line}");
    }
}

/// Owns the child until it exits so it never lingers as a zombie.
async fn reap(mut child: Child, pid: u32, exited: Arc<AtomicBool>) {
    match child.wait().await {
        Ok(status) => tracing::info!(pid, ?status, "worker exited"),
        Err(e) => tracing::warn!(pid, error = %e, "failed to wait for worker"),
    }
    exited.store(true, Ordering::SeqCst);
}
