//! The single task that writes window geometry to disk.
//!
//! Moves and resizes are debounced: each one replaces the pending record
//! and restarts the quiet-period timer. Closes write straight through.
//! Failures are logged and dropped.

use std::time::Duration;

use kiln_common::WindowId;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::{PersistedWindowGeometry, StateStore};

enum Command {
    Schedule(WindowId, PersistedWindowGeometry),
    Flush(PersistedWindowGeometry),
    WindowClosed(WindowId),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to the writer task. Cloning shares the same task.
#[derive(Clone)]
pub struct GeometryWriter {
    tx: mpsc::UnboundedSender<Command>,
}

impl GeometryWriter {
    pub fn spawn(store: StateStore, debounce: Duration, runtime: &Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        runtime.spawn(run(store, debounce, rx));
        Self { tx }
    }

    /// Save after the quiet period, unless something newer arrives first.
    pub fn schedule(&self, window: WindowId, geometry: PersistedWindowGeometry) {
        self.send(Command::Schedule(window, geometry));
    }

    /// Save now, discarding anything pending.
    pub fn flush(&self, geometry: PersistedWindowGeometry) {
        self.send(Command::Flush(geometry));
    }

    /// Drop a pending save that belongs to a window that is gone.
    pub fn window_closed(&self, window: WindowId) {
        self.send(Command::WindowClosed(window));
    }

    /// Write anything pending and stop the task.
    pub async fn shutdown(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(Command::Shutdown(done_tx));
        let _ = done_rx.await;
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::debug!("geometry writer already stopped");
        }
    }
}

async fn run(store: StateStore, debounce: Duration, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut pending: Option<(WindowId, PersistedWindowGeometry)> = None;
    let timer = tokio::time::sleep(debounce);
    tokio::pin!(timer);

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule(window, geometry)) => {
                    pending = Some((window, geometry));
                    timer.as_mut().reset(Instant::now() + debounce);
                }
                Some(Command::Flush(geometry)) => {
                    pending = None;
                    write(&store, &geometry);
                }
                Some(Command::WindowClosed(window)) => {
                    if pending.as_ref().is_some_and(|(owner, _)| *owner == window) {
                        pending = None;
                    }
                }
                Some(Command::Shutdown(done)) => {
                    if let Some((_, geometry)) = pending.take() {
                        write(&store, &geometry);
                    }
                    let _ = done.send(());
                    break;
                }
                None => {
                    if let Some((_, geometry)) = pending.take() {
                        write(&store, &geometry);
                    }
                    break;
                }
            },
            () = &mut timer, if pending.is_some() => {
                if let Some((_, geometry)) = pending.take() {
                    write(&store, &geometry);
                }
            }
        }
    }
    tracing::debug!("geometry writer stopped");
}

fn write(store: &StateStore, geometry: &PersistedWindowGeometry) {
    match store.save_window_state(geometry) {
        Ok(()) => tracing::debug!(
            x = geometry.x,
            y = geometry.y,
            width = geometry.width,
            height = geometry.height,
            "window state saved"
        ),
        Err(e) => tracing::error!(error = %e, "failed to save window state"),
    }
}
