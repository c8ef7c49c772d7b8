//! The session cookie shared by every webview.
//!
//! wry has no cookie-jar writer, so the cookie travels as a `Cookie`
//! header on every top-level load of the worker origin instead.

use std::sync::{Arc, Mutex};

use kiln_common::HostError;
use kiln_core::{CredentialStore, SessionCookie};
use wry::http::header::{HeaderValue, COOKIE};
use wry::http::HeaderMap;

#[derive(Clone, Default)]
pub struct SessionCookies {
    inner: Arc<Mutex<Option<SessionCookie>>>,
}

impl SessionCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<SessionCookie> {
        self.inner.lock().ok().and_then(|c| c.clone())
    }

    /// Origin the cookie is scoped to, once one is installed.
    pub fn origin(&self) -> Option<String> {
        self.current().map(|c| c.url)
    }

    /// Headers for a top-level load of `url`. Empty unless `url` is on the
    /// cookie's origin.
    pub fn headers_for(&self, url: &str) -> Option<HeaderMap> {
        let cookie = self.current()?;
        if !same_origin(&cookie.url, url) {
            return None;
        }
        let value = HeaderValue::from_str(&cookie.header_value()).ok()?;
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value);
        Some(headers)
    }
}

impl CredentialStore for SessionCookies {
    fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<(), HostError> {
        let mut slot = self
            .inner
            .lock()
            .map_err(|_| HostError::Other("session cookie lock poisoned".into()))?;
        tracing::debug!(origin = %cookie.url, name = %cookie.name, "session cookie installed");
        *slot = Some(cookie.clone());
        Ok(())
    }
}

/// Whether `url` is `origin` itself or a path below it.
pub fn same_origin(origin: &str, url: &str) -> bool {
    match url.strip_prefix(origin) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}
