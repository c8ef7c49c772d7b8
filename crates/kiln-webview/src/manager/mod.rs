//! WebView lifecycle management.
//!
//! `WebViewManager` owns what every window shares: the event sink the
//! handlers write to, the session cookie, and the mapping from winit
//! window ids to host window ids.

use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::{Arc, Mutex};

use kiln_common::{Point, WindowId};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::Window;
use wry::WebView;

use crate::convert::fill_bounds;
use crate::cookies::SessionCookies;
use crate::events::WebViewEvent;

mod factory;
pub mod handlers;
mod surface;
mod types;

pub use factory::WryFactory;
pub use handlers::NavigationPolicy;
pub use surface::WebViewSurface;
pub use types::WebViewConfig;

/// Non-owning view of a window built by [`WryFactory`]. The surface the
/// host holds is the only strong owner.
struct Tracked {
    id: WindowId,
    window: Weak<Window>,
    webview: Weak<WebView>,
}

pub struct WebViewManager {
    /// Handlers push here; the main event loop drains it.
    pub(crate) events: Arc<Mutex<Vec<WebViewEvent>>>,
    pub(crate) cookies: SessionCookies,
    pub(crate) config: WebViewConfig,
    windows: HashMap<winit::window::WindowId, Tracked>,
}

impl WebViewManager {
    pub fn new(config: WebViewConfig, cookies: SessionCookies) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            cookies,
            config,
            windows: HashMap::new(),
        }
    }

    /// Drain all pending events.
    pub fn drain_events(&self) -> Vec<WebViewEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(_) => Vec::new(),
        }
    }

    /// Host id for a native window, if it belongs to a live host window.
    pub fn window_id(&self, native: winit::window::WindowId) -> Option<WindowId> {
        self.windows.get(&native).map(|t| t.id)
    }

    pub fn forget(&mut self, native: winit::window::WindowId) -> Option<WindowId> {
        self.windows.remove(&native).map(|t| t.id)
    }

    /// Keep the child webview covering the client area after a resize.
    pub fn resize_webview(&self, native: winit::window::WindowId, size: PhysicalSize<u32>) {
        let Some(webview) = self.windows.get(&native).and_then(|t| t.webview.upgrade()) else {
            return;
        };
        if let Err(e) = webview.set_bounds(fill_bounds(size)) {
            tracing::warn!(error = %e, "failed to resize webview");
        }
    }

    /// Turn a window-relative cursor position into logical screen coordinates.
    pub fn screen_point(
        &self,
        native: winit::window::WindowId,
        position: PhysicalPosition<f64>,
    ) -> Option<Point> {
        let window = self.windows.get(&native)?.window.upgrade()?;
        let origin = window.inner_position().ok()?;
        let scale = window.scale_factor();
        Some(Point::new(
            ((f64::from(origin.x) + position.x) / scale).round() as i32,
            ((f64::from(origin.y) + position.y) / scale).round() as i32,
        ))
    }

    pub fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    pub(crate) fn track(&mut self, id: WindowId, window: &Rc<Window>, webview: &Rc<WebView>) {
        self.windows.insert(
            window.id(),
            Tracked {
                id,
                window: Rc::downgrade(window),
                webview: Rc::downgrade(webview),
            },
        );
    }
}

impl Default for WebViewManager {
    fn default() -> Self {
        Self::new(WebViewConfig::default(), SessionCookies::new())
    }
}
