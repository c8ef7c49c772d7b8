//! Single-instance arbitration.
//!
//! The first process for a user-data dir binds a socket there and becomes
//! the primary. Later launches connect, forward their [`LaunchRequest`] as
//! one JSON line, and exit. A socket file nobody listens on is left over
//! from a crash and gets replaced.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use kiln_common::HostError;
use kiln_platform::{instance_socket, UserDataDir};
use tokio::runtime::Handle;

use crate::lifecycle::{HostEvent, LaunchRequest};

pub enum InstanceRole {
    /// This process owns the user-data dir.
    Primary(InstanceGuard),
    /// Another process owns it and has been handed the request.
    Secondary,
}

/// Held by the primary for as long as it runs. Dropping it removes the
/// socket file.
pub struct InstanceGuard {
    path: PathBuf,
    #[cfg(unix)]
    listener: Option<std::os::unix::net::UnixListener>,
}

impl InstanceGuard {
    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
pub fn acquire(user_data_dir: &UserDataDir, request: &LaunchRequest) -> Result<InstanceRole, HostError> {
    use std::io::{ErrorKind, Write};
    use std::os::unix::net::{UnixListener, UnixStream};

    let path = instance_socket(user_data_dir);
    match UnixStream::connect(&path) {
        Ok(mut stream) => {
            let line = serde_json::to_string(request)
                .map_err(|e| HostError::Ipc(format!("failed to encode launch request: {e}")))?;
            writeln!(stream, "{line}")?;
            stream.flush()?;
            tracing::info!(socket = %path.display(), "forwarded launch to running instance");
            Ok(InstanceRole::Secondary)
        }
        Err(e) if matches!(e.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) => {
            if path.exists() {
                tracing::debug!(socket = %path.display(), "removing stale instance socket");
                std::fs::remove_file(&path)?;
            }
            let listener = UnixListener::bind(&path)?;
            tracing::debug!(socket = %path.display(), "acquired instance lock");
            Ok(InstanceRole::Primary(InstanceGuard {
                path,
                listener: Some(listener),
            }))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(not(unix))]
pub fn acquire(user_data_dir: &UserDataDir, _request: &LaunchRequest) -> Result<InstanceRole, HostError> {
    tracing::debug!("single-instance arbitration unavailable on this platform");
    Ok(InstanceRole::Primary(InstanceGuard {
        path: instance_socket(user_data_dir),
    }))
}

#[cfg(unix)]
impl InstanceGuard {
    /// Start accepting forwarded launches. Each one is posted as
    /// [`HostEvent::SecondInstance`].
    pub fn listen(&mut self, runtime: &Handle, events: mpsc::Sender<HostEvent>) -> Result<(), HostError> {
        let Some(listener) = self.listener.take() else {
            return Ok(());
        };
        listener.set_nonblocking(true)?;
        let _entered = runtime.enter();
        let listener = tokio::net::UnixListener::from_std(listener)?;
        runtime.spawn(accept_loop(listener, events));
        Ok(())
    }
}

#[cfg(not(unix))]
impl InstanceGuard {
    pub fn listen(&mut self, _runtime: &Handle, _events: mpsc::Sender<HostEvent>) -> Result<(), HostError> {
        Ok(())
    }
}

#[cfg(unix)]
impl Drop for InstanceGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!(socket = %self.path.display(), error = %e, "instance socket already gone");
        }
    }
}

#[cfg(unix)]
async fn accept_loop(listener: tokio::net::UnixListener, events: mpsc::Sender<HostEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                tokio::spawn(read_requests(stream, events.clone()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "instance socket accept failed");
                return;
            }
        }
    }
}

#[cfg(unix)]
async fn read_requests(stream: tokio::net::UnixStream, events: mpsc::Sender<HostEvent>) {
    use tokio::io::{AsyncBufReadExt, BufReader};

    let mut lines = BufReader::new(stream).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read forwarded launch");
                return;
            }
        };
        match serde_json::from_str::<LaunchRequest>(&line) {
            Ok(request) => {
                tracing::info!(?request, "launch forwarded from second instance");
                if events.send(HostEvent::SecondInstance(request)).is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!(error = %e, "ignoring malformed forwarded launch"),
        }
    }
}
