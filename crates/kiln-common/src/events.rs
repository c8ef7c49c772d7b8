use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::id::WindowId;
use crate::types::AppState;

/// Host-wide events, fanned out to any interested subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AppEvent {
    StateChanged(AppState),
    WindowOpened(WindowId),
    WindowFocused(WindowId),
    WindowClosed(WindowId),
    WorkerReady { port: u16 },
    SecondInstance { args: Vec<String> },
    #[serde(other)]
    Unknown,
}

pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: AppEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
