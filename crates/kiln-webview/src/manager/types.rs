/// Settings applied to every webview the backend builds.
#[derive(Debug, Clone)]
pub struct WebViewConfig {
    /// Whether to enable dev tools (always on in debug builds).
    pub devtools: bool,
    /// Custom user agent string.
    pub user_agent: Option<String>,
    /// Whether to enable clipboard access.
    pub clipboard: bool,
    /// Whether to enable autoplay for media.
    pub autoplay: bool,
}

impl Default for WebViewConfig {
    fn default() -> Self {
        Self {
            devtools: cfg!(debug_assertions),
            user_agent: Some(format!("Kiln/{}", env!("CARGO_PKG_VERSION"))),
            clipboard: true,
            autoplay: true,
        }
    }
}

impl WebViewConfig {
    /// Same defaults, with dev tools switched on regardless of build.
    pub fn with_devtools() -> Self {
        Self {
            devtools: true,
            ..Default::default()
        }
    }
}
