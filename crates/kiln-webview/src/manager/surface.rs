//! One host window backed by a winit window and a child webview.

use std::rc::Rc;

use kiln_common::{Color, Rect, WindowId};
use kiln_core::WindowSurface;
use kiln_ipc::{js_dispatch_message, HostPush, IpcMessage};
use tracing::{debug, warn};
use winit::window::Window;
use wry::WebView;

use crate::convert::{fill_bounds, rect_from_physical, rect_to_logical};
use crate::cookies::SessionCookies;

/// Links with this scheme belong to the app and are handed to the page.
pub const APP_URL_SCHEME: &str = "kiln://";

pub struct WebViewSurface {
    id: WindowId,
    // Sole strong owners. Declared webview first so it is torn down first.
    webview: Option<Rc<WebView>>,
    window: Option<Rc<Window>>,
    cookies: SessionCookies,
    zoom: f64,
    devtools_open: bool,
    menu_bar_visible: bool,
}

impl WebViewSurface {
    pub(crate) fn new(
        id: WindowId,
        window: Rc<Window>,
        webview: Rc<WebView>,
        cookies: SessionCookies,
    ) -> Self {
        Self {
            id,
            webview: Some(webview),
            window: Some(window),
            cookies,
            zoom: 1.0,
            devtools_open: false,
            menu_bar_visible: true,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn native_id(&self) -> Option<winit::window::WindowId> {
        self.window.as_ref().map(|w| w.id())
    }

    fn resize_webview(&self) {
        let (Some(window), Some(webview)) = (&self.window, &self.webview) else {
            return;
        };
        if let Err(e) = webview.set_bounds(fill_bounds(window.inner_size())) {
            warn!(window_id = %self.id, error = %e, "failed to resize webview");
        }
    }

    pub fn menu_bar_visible(&self) -> bool {
        self.menu_bar_visible
    }

    fn eval(&self, js: &str) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.evaluate_script(js) {
                warn!(window_id = %self.id, error = %e, "failed to evaluate script");
            }
        }
    }
}

impl WindowSurface for WebViewSurface {
    fn send(&mut self, msg: &IpcMessage) {
        self.eval(&js_dispatch_message(&msg.kind, &msg.payload));
    }

    fn bounds(&self) -> Option<Rect> {
        let window = self.window.as_ref()?;
        let position = window.outer_position().ok()?;
        Some(rect_from_physical(position, window.outer_size(), window.scale_factor()))
    }

    fn set_bounds(&mut self, bounds: Rect) {
        let Some(window) = &self.window else {
            return;
        };
        let (position, size) = rect_to_logical(bounds);
        window.set_outer_position(position);
        // Outer size cannot be requested directly; decorations make the
        // result slightly larger than asked.
        let _ = window.request_inner_size(size);
        self.resize_webview();
    }

    fn is_destroyed(&self) -> bool {
        self.window.is_none()
    }

    fn show(&mut self) {
        if let Some(window) = &self.window {
            window.set_visible(true);
        }
    }

    fn is_visible(&self) -> bool {
        self.window
            .as_ref()
            .and_then(|w| w.is_visible())
            .unwrap_or(false)
    }

    fn focus(&mut self) {
        if let Some(window) = &self.window {
            window.focus_window();
        }
    }

    fn minimize(&mut self) {
        if let Some(window) = &self.window {
            window.set_minimized(true);
        }
    }

    fn maximize(&mut self) {
        if let Some(window) = &self.window {
            window.set_maximized(true);
        }
    }

    fn unmaximize(&mut self) {
        if let Some(window) = &self.window {
            window.set_maximized(false);
        }
    }

    fn is_maximized(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_maximized())
    }

    fn is_full_screen(&self) -> bool {
        self.window
            .as_ref()
            .is_some_and(|w| w.fullscreen().is_some())
    }

    fn is_full_screenable(&self) -> bool {
        self.window.is_some()
    }

    fn set_zoom_level(&mut self, level: f64) {
        let Some(webview) = &self.webview else {
            return;
        };
        match webview.zoom(level) {
            Ok(()) => self.zoom = level,
            Err(e) => warn!(window_id = %self.id, error = %e, "failed to set zoom"),
        }
    }

    fn zoom_level(&self) -> f64 {
        self.zoom
    }

    fn toggle_dev_tools(&mut self) {
        let Some(webview) = &self.webview else {
            return;
        };
        if webview.is_devtools_open() {
            webview.close_devtools();
            self.devtools_open = false;
        } else {
            webview.open_devtools();
            self.devtools_open = true;
        }
        debug!(window_id = %self.id, open = self.devtools_open, "devtools toggled");
    }

    fn set_background_color(&mut self, color: Color) {
        if let Some(webview) = &self.webview {
            if let Err(e) = webview.set_background_color(color.as_tuple()) {
                warn!(window_id = %self.id, error = %e, "failed to set background color");
            }
        }
    }

    fn set_menu_bar_visible(&mut self, visible: bool) {
        // Windows have no native menu bar; the page draws its own and
        // learns about the change through a push.
        self.menu_bar_visible = visible;
        self.push(&HostPush::MenuBarVisibility { visible });
    }

    fn load_url(&mut self, url: &str) {
        let Some(webview) = &self.webview else {
            return;
        };
        let result = match self.cookies.headers_for(url) {
            Some(headers) => webview.load_url_with_headers(url, headers),
            None => webview.load_url(url),
        };
        match result {
            Ok(()) => debug!(window_id = %self.id, url, "loading url"),
            Err(e) => warn!(window_id = %self.id, url, error = %e, "failed to load url"),
        }
    }

    fn try_open_link(&mut self, url: &str) -> bool {
        if self.webview.is_none() || !url.starts_with(APP_URL_SCHEME) {
            return false;
        }
        self.push(&HostPush::OpenUrl { url: url.to_string() });
        true
    }

    fn destroy(&mut self) {
        self.webview = None;
        self.window = None;
        debug!(window_id = %self.id, "window destroyed");
    }
}
