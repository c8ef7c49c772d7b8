//! WebView event types.

use kiln_common::WindowId;
use serde::{Deserialize, Serialize};

/// State of a page load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLoadState {
    /// Navigation has started.
    Started,
    /// Page has fully loaded (DOMContentLoaded + resources).
    Finished,
}

impl From<wry::PageLoadEvent> for PageLoadState {
    fn from(e: wry::PageLoadEvent) -> Self {
        match e {
            wry::PageLoadEvent::Started => Self::Started,
            wry::PageLoadEvent::Finished => Self::Finished,
        }
    }
}

/// Events emitted by a WebView instance.
#[derive(Debug, Clone, PartialEq)]
pub enum WebViewEvent {
    /// Page load state changed. Carries the URL.
    PageLoad {
        window: WindowId,
        state: PageLoadState,
        url: String,
    },
    /// Document title changed.
    TitleChanged { window: WindowId, title: String },
    /// An IPC message was received from JavaScript.
    IpcMessage { window: WindowId, body: String },
    /// The page tried to leave the allowed origins, or open a new window.
    NavigationBlocked { window: WindowId, url: String },
}
