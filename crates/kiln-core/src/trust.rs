//! Per-session secret shared between windows and the worker.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use kiln_common::{HostError, StartupError};
use rand::RngCore;
use serde::Serialize;

use crate::surface::CredentialStore;

/// Cookie the worker looks for on every request.
pub const TOKEN_COOKIE_NAME: &str = "kiln_session_token";

/// Environment variable carrying the token into a forked worker.
pub const TOKEN_ENV_VAR: &str = "KILN_SESSION_TOKEN";

const TOKEN_BYTES: usize = 32;

/// The session secret. Created once at boot and never rotated.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustToken(String);

impl TrustToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare without short-circuiting on the first differing byte.
    pub fn verify(&self, candidate: &str) -> bool {
        let a = self.0.as_bytes();
        let b = candidate.as_bytes();
        if a.len() != b.len() {
            return false;
        }
        a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

impl fmt::Debug for TrustToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TrustToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SameSite {
    /// Sent on cross-site requests too.
    None,
    Lax,
    Strict,
}

/// A cookie to install in the shared webview jar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub url: String,
    pub name: String,
    pub value: String,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl SessionCookie {
    /// `name=value` form for a `Cookie` request header.
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

pub fn worker_origin(port: u16) -> String {
    format!("http://localhost:{port}")
}

/// Owns the token and remembers which worker port it was bound to.
pub struct TrustTokenService {
    token: TrustToken,
    bound_port: Option<u16>,
}

impl TrustTokenService {
    pub fn new() -> Self {
        Self::with_token(TrustToken::generate())
    }

    pub fn with_token(token: TrustToken) -> Self {
        Self {
            token,
            bound_port: None,
        }
    }

    pub fn token(&self) -> &TrustToken {
        &self.token
    }

    /// Synchronous query served to windows.
    pub fn value(&self) -> &str {
        self.token.as_str()
    }

    pub fn verify(&self, candidate: &str) -> bool {
        self.token.verify(candidate)
    }

    pub fn bound_port(&self) -> Option<u16> {
        self.bound_port
    }

    /// The credential as it is installed for `port`.
    pub fn cookie_for(&self, port: u16) -> SessionCookie {
        // The worker decodes the cookie value as JSON.
        let value = serde_json::to_string(self.token.as_str())
            .unwrap_or_else(|_| format!("\"{}\"", self.token.as_str()));
        SessionCookie {
            url: worker_origin(port),
            name: TOKEN_COOKIE_NAME.to_string(),
            value,
            http_only: true,
            same_site: SameSite::None,
        }
    }

    /// Install the token as a cookie scoped to the worker origin.
    pub fn bind(&mut self, port: u16, store: &mut dyn CredentialStore) -> Result<(), StartupError> {
        store
            .set_cookie(&self.cookie_for(port))
            .map_err(|e| StartupError::TrustBinding(e.to_string()))?;
        self.bound_port = Some(port);
        tracing::info!(port, "session token bound to worker origin");
        Ok(())
    }

    /// Re-install the cookie on the already bound origin.
    pub fn attach(&self, store: &mut dyn CredentialStore) -> Result<bool, HostError> {
        match self.bound_port {
            Some(port) => {
                store.set_cookie(&self.cookie_for(port))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Default for TrustTokenService {
    fn default() -> Self {
        Self::new()
    }
}
