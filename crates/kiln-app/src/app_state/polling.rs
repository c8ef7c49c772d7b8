//! Draining backend callbacks and async results into the controller.

use std::time::Instant;

use kiln_core::HostEvent;
use kiln_webview::{PageLoadState, WebViewEvent, WryFactory};
use winit::event_loop::{ActiveEventLoop, ControlFlow};

use super::core::KilnApp;
use super::types::POLL_INTERVAL;

/// What a webview callback means to the host, if anything.
pub(super) fn host_event(event: WebViewEvent) -> Option<HostEvent> {
    match event {
        WebViewEvent::PageLoad {
            window,
            state: PageLoadState::Finished,
            ..
        } => Some(HostEvent::PageLoaded(window)),
        WebViewEvent::PageLoad { .. } => None,
        WebViewEvent::IpcMessage { window, body } => Some(HostEvent::Ipc { window, body }),
        WebViewEvent::NavigationBlocked { window, url } => {
            Some(HostEvent::NavigationBlocked { window, url })
        }
        WebViewEvent::TitleChanged { window, title } => {
            tracing::trace!(window_id = %window, title = %title, "page title changed");
            None
        }
    }
}

impl KilnApp {
    /// Hand one event to the controller with a factory bound to this loop.
    pub(super) fn dispatch(&mut self, event_loop: &ActiveEventLoop, event: HostEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        let mut factory = WryFactory::new(event_loop, &mut self.webviews);
        controller.handle_event(event, &mut factory);
    }

    /// Run polling and schedule the next wake-up.
    pub(super) fn poll_and_schedule(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();

        if now.duration_since(self.last_poll) >= POLL_INTERVAL {
            self.last_poll = now;
            self.poll_webview_events(event_loop);
            self.poll_host_events(event_loop);
        }

        if let Some(code) = self.controller.as_ref().and_then(|c| c.exit_code()) {
            self.exit_code = Some(code);
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
    }

    fn poll_webview_events(&mut self, event_loop: &ActiveEventLoop) {
        for event in self.webviews.drain_events() {
            if let Some(event) = host_event(event) {
                self.dispatch(event_loop, event);
            }
        }
    }

    fn poll_host_events(&mut self, event_loop: &ActiveEventLoop) {
        while let Ok(event) = self.host_rx.try_recv() {
            self.dispatch(event_loop, event);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
