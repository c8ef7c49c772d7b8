//! Builds host windows on the live winit event loop.

use std::rc::Rc;
use std::sync::Arc;

use kiln_common::{HostError, WindowId};
use kiln_core::{WindowFactory, WindowOptions, WindowSurface};
use kiln_ipc::IPC_INIT_SCRIPT;
use tracing::debug;
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, WindowAttributes};
use wry::http::header::{HeaderName, HeaderValue};
use wry::http::HeaderMap;
use wry::WebViewBuilder;

use crate::convert::{fill_bounds, rect_to_logical};

use super::handlers::NavigationPolicy;
use super::surface::WebViewSurface;
use super::WebViewManager;

/// Borrowed for the duration of one event-loop callback.
pub struct WryFactory<'a> {
    event_loop: &'a ActiveEventLoop,
    manager: &'a mut WebViewManager,
}

impl<'a> WryFactory<'a> {
    pub fn new(event_loop: &'a ActiveEventLoop, manager: &'a mut WebViewManager) -> Self {
        Self { event_loop, manager }
    }
}

fn window_attributes(options: &WindowOptions) -> WindowAttributes {
    let (position, size) = rect_to_logical(options.bounds);
    let (min_width, min_height) = options.min_size;
    let mut attrs = WindowAttributes::default()
        .with_title(options.title.clone())
        .with_position(position)
        .with_inner_size(size)
        .with_min_inner_size(LogicalSize::new(min_width, min_height))
        .with_maximized(options.maximized)
        .with_visible(options.visible);

    if options.fullscreen {
        attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::WindowAttributesExtMacOS;
        // Custom chrome keeps the traffic lights over a full-size content view.
        if !options.chrome.is_native() {
            attrs = attrs
                .with_titlebar_transparent(true)
                .with_title_hidden(true)
                .with_fullsize_content_view(true);
        }
    }
    #[cfg(not(target_os = "macos"))]
    {
        attrs = attrs.with_decorations(options.chrome.is_native());
    }

    attrs
}

fn initial_headers(options: &WindowOptions) -> Option<HeaderMap> {
    let (name, value) = options.cookie_header.as_ref()?;
    let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
    let value = HeaderValue::from_str(value).ok()?;
    let mut headers = HeaderMap::new();
    headers.insert(name, value);
    Some(headers)
}

impl WindowFactory for WryFactory<'_> {
    fn create(
        &mut self,
        id: WindowId,
        options: &WindowOptions,
    ) -> Result<Box<dyn WindowSurface>, HostError> {
        let window = self
            .event_loop
            .create_window(window_attributes(options))
            .map_err(|e| HostError::Window(format!("failed to create window: {e}")))?;

        let events = Arc::clone(&self.manager.events);
        let config = &self.manager.config;
        let policy = NavigationPolicy::new(options.url.clone(), self.manager.cookies.clone());

        let mut builder = WebViewBuilder::new()
            .with_bounds(fill_bounds(window.inner_size()))
            .with_devtools(config.devtools)
            .with_clipboard(config.clipboard)
            .with_autoplay(config.autoplay)
            .with_background_color(options.background.as_tuple())
            .with_initialization_script(IPC_INIT_SCRIPT)
            .with_url(&options.url);

        if let Some(ua) = &config.user_agent {
            builder = builder.with_user_agent(ua);
        }
        if let Some(headers) = initial_headers(options) {
            builder = builder.with_headers(headers);
        }

        builder = WebViewManager::attach_ipc_handler(builder, Arc::clone(&events), id);
        builder = WebViewManager::attach_page_load_handler(builder, Arc::clone(&events), id);
        builder = WebViewManager::attach_title_handler(builder, Arc::clone(&events), id);
        builder = WebViewManager::attach_navigation_handler(builder, events, id, policy);

        let webview = builder
            .build_as_child(&window)
            .map_err(|e| HostError::Window(format!("failed to create webview: {e}")))?;

        let window = Rc::new(window);
        let webview = Rc::new(webview);
        self.manager.track(id, &window, &webview);
        debug!(window_id = %id, role = ?options.role, url = %options.url, "window created");

        Ok(Box::new(WebViewSurface::new(
            id,
            window,
            webview,
            self.manager.cookies.clone(),
        )))
    }
}
