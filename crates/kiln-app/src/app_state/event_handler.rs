//! `ApplicationHandler` implementation for the winit event loop.

use kiln_core::HostEvent;
use kiln_webview::WryFactory;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use super::core::KilnApp;

impl ApplicationHandler for KilnApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.booted {
            return;
        }
        self.booted = true;
        self.displays.refresh(event_loop);

        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let mut factory = WryFactory::new(event_loop, &mut self.webviews);
        controller.boot(&mut factory);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, native_id: WindowId, event: WindowEvent) {
        if let WindowEvent::Destroyed = event {
            if let Some(id) = self.webviews.forget(native_id) {
                self.dispatch(event_loop, HostEvent::Destroyed(id));
            }
            return;
        }

        let Some(id) = self.webviews.window_id(native_id) else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::debug!(window_id = %id, "Window close requested");
                self.dispatch(event_loop, HostEvent::CloseRequested(id));
            }

            WindowEvent::Focused(true) => self.dispatch(event_loop, HostEvent::Focused(id)),
            WindowEvent::Focused(false) => self.dispatch(event_loop, HostEvent::Blurred(id)),

            WindowEvent::Moved(_) => self.dispatch(event_loop, HostEvent::Moved(id)),

            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    self.webviews.resize_webview(native_id, size);
                }
                self.dispatch(event_loop, HostEvent::Resized(id));
            }

            WindowEvent::ScaleFactorChanged { .. } => self.displays.refresh(event_loop),

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(point) = self.webviews.screen_point(native_id, position) {
                    self.displays.set_cursor(point);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_code.is_some() {
            event_loop.exit();
            return;
        }
        self.poll_and_schedule(event_loop);
    }
}
