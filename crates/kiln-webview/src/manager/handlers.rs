use std::sync::{Arc, Mutex};

use kiln_common::WindowId;
use tracing::{debug, warn};
use wry::WebViewBuilder;

use crate::cookies::{same_origin, SessionCookies};
use crate::events::{PageLoadState, WebViewEvent};

use super::WebViewManager;

// =============================================================================
// NAVIGATION ALLOWLIST
// =============================================================================

/// URL prefixes every window may navigate to.
pub const ALLOWED_NAV_PREFIXES: &[&str] = &["about:blank"];

/// Where one window's top-level frame may go.
///
/// Besides [`ALLOWED_NAV_PREFIXES`], a window may reload the URL it was
/// created with and anything on the worker origin once the session cookie
/// is bound. Everything else is blocked and reported so the host can offer
/// the URL to a window or the shell.
#[derive(Clone)]
pub struct NavigationPolicy {
    initial_url: String,
    cookies: SessionCookies,
}

impl NavigationPolicy {
    pub fn new(initial_url: impl Into<String>, cookies: SessionCookies) -> Self {
        Self {
            initial_url: initial_url.into(),
            cookies,
        }
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        if ALLOWED_NAV_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
            return true;
        }
        if !self.initial_url.is_empty() && url == self.initial_url {
            return true;
        }
        self.cookies
            .origin()
            .is_some_and(|origin| same_origin(&origin, url))
    }
}

fn push(events: &Arc<Mutex<Vec<WebViewEvent>>>, event: WebViewEvent) {
    if let Ok(mut evts) = events.lock() {
        evts.push(event);
    }
}

// =============================================================================
// HANDLER ATTACHMENTS
// =============================================================================

impl WebViewManager {
    pub(super) fn attach_ipc_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: Arc<Mutex<Vec<WebViewEvent>>>,
        window: WindowId,
    ) -> WebViewBuilder<'a> {
        builder.with_ipc_handler(move |request| {
            let body = request.body().to_string();

            // Validate that the IPC body is valid JSON before forwarding
            if serde_json::from_str::<serde_json::Value>(&body).is_err() {
                warn!(
                    window_id = %window,
                    body_len = body.len(),
                    "IPC message rejected: invalid JSON"
                );
                return;
            }

            debug!(window_id = %window, body_len = body.len(), "IPC message from JS");
            push(&events, WebViewEvent::IpcMessage { window, body });
        })
    }

    pub(super) fn attach_page_load_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: Arc<Mutex<Vec<WebViewEvent>>>,
        window: WindowId,
    ) -> WebViewBuilder<'a> {
        builder.with_on_page_load_handler(move |event, url| {
            let state = PageLoadState::from(event);
            debug!(window_id = %window, ?state, url = %url, "page load");
            push(&events, WebViewEvent::PageLoad { window, state, url });
        })
    }

    pub(super) fn attach_title_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: Arc<Mutex<Vec<WebViewEvent>>>,
        window: WindowId,
    ) -> WebViewBuilder<'a> {
        builder.with_document_title_changed_handler(move |title| {
            debug!(window_id = %window, title = %title, "title changed");
            push(&events, WebViewEvent::TitleChanged { window, title });
        })
    }

    pub(super) fn attach_navigation_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: Arc<Mutex<Vec<WebViewEvent>>>,
        window: WindowId,
        policy: NavigationPolicy,
    ) -> WebViewBuilder<'a> {
        let new_window_events = Arc::clone(&events);
        builder
            .with_navigation_handler(move |url| {
                if policy.is_allowed(&url) {
                    debug!(window_id = %window, url = %url, "navigation allowed");
                    return true;
                }
                warn!(window_id = %window, url = %url, "navigation blocked: URL not in allowlist");
                push(&events, WebViewEvent::NavigationBlocked { window, url });
                false
            })
            .with_new_window_req_handler(move |url| {
                debug!(window_id = %window, url = %url, "new window request redirected");
                push(
                    &new_window_events,
                    WebViewEvent::NavigationBlocked { window, url },
                );
                false
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use kiln_core::TrustTokenService;

    use super::*;

    fn bound_cookies(port: u16) -> SessionCookies {
        let mut cookies = SessionCookies::new();
        TrustTokenService::new().bind(port, &mut cookies).unwrap();
        cookies
    }

    // -- Allowed URLs --

    #[test]
    fn allows_about_blank() {
        let policy = NavigationPolicy::new("", SessionCookies::new());
        assert!(policy.is_allowed("about:blank"));
    }

    #[test]
    fn allows_initial_url() {
        let policy = NavigationPolicy::new("file:///opt/kiln/splash.html", SessionCookies::new());
        assert!(policy.is_allowed("file:///opt/kiln/splash.html"));
    }

    #[test]
    fn allows_worker_origin_once_bound() {
        let cookies = SessionCookies::new();
        let policy = NavigationPolicy::new("about:blank", cookies.clone());
        assert!(!policy.is_allowed("http://localhost:4100/"));

        let mut writer = cookies;
        TrustTokenService::new().bind(4100, &mut writer).unwrap();
        assert!(policy.is_allowed("http://localhost:4100/"));
        assert!(policy.is_allowed("http://localhost:4100/workbench?folder=/tmp"));
    }

    // -- Blocked URLs --

    #[test]
    fn blocks_other_ports_and_hosts() {
        let policy = NavigationPolicy::new("about:blank", bound_cookies(4100));
        assert!(!policy.is_allowed("http://localhost:4101/"));
        assert!(!policy.is_allowed("http://localhost:41000/"));
        assert!(!policy.is_allowed("https://example.com/phishing"));
    }

    #[test]
    fn blocks_file_protocol() {
        let policy = NavigationPolicy::new("file:///opt/kiln/splash.html", bound_cookies(4100));
        assert!(!policy.is_allowed("file:///etc/passwd"));
        assert!(!policy.is_allowed("file://localhost/etc/hosts"));
    }

    #[test]
    fn blocks_app_links() {
        let policy = NavigationPolicy::new("about:blank", bound_cookies(4100));
        assert!(!policy.is_allowed("kiln://auth?code=1"));
    }

    #[test]
    fn blocks_javascript_and_data() {
        let policy = NavigationPolicy::new("about:blank", bound_cookies(4100));
        assert!(!policy.is_allowed("javascript:alert(1)"));
        assert!(!policy.is_allowed("data:text/html,<h1>XSS</h1>"));
    }

    #[test]
    fn empty_initial_url_is_not_a_wildcard() {
        let policy = NavigationPolicy::new("", SessionCookies::new());
        assert!(!policy.is_allowed(""));
        assert!(!policy.is_allowed("not-a-url"));
    }
}
