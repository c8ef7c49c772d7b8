//! Seams to the presentation layer and the OS shell.
//!
//! The orchestration logic only ever talks to windows, displays, the cookie
//! jar and the shell through these traits. The wry backend implements them
//! for real; tests use in-memory fakes.

use kiln_common::{ChromeMode, Color, Display, HostError, PlatformError, Point, Rect, WindowId};
use kiln_ipc::{HostPush, IpcMessage};

use crate::trust::SessionCookie;

/// What a window is for. Splash windows never persist geometry and never
/// count toward the "all windows closed" quit policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowRole {
    Main,
    Secondary,
    Splash,
}

/// Everything needed to construct one window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub role: WindowRole,
    /// Logical name for named secondary windows.
    pub name: Option<String>,
    pub title: String,
    pub url: String,
    pub bounds: Rect,
    pub min_size: (u32, u32),
    pub maximized: bool,
    pub fullscreen: bool,
    pub chrome: ChromeMode,
    pub background: Color,
    /// Show immediately instead of waiting for the first paint.
    pub visible: bool,
    /// Extra request header for loads on the worker origin.
    pub cookie_header: Option<(String, String)>,
}

/// One live presentation surface.
pub trait WindowSurface {
    /// Deliver a host message into the page.
    fn send(&mut self, msg: &IpcMessage);

    fn push(&mut self, push: &HostPush) {
        self.send(&push.to_message());
    }

    /// Current outer bounds, or `None` once the surface is gone.
    fn bounds(&self) -> Option<Rect>;
    fn set_bounds(&mut self, bounds: Rect);
    fn is_destroyed(&self) -> bool;

    fn show(&mut self);
    fn is_visible(&self) -> bool;
    fn focus(&mut self);

    fn minimize(&mut self);
    fn maximize(&mut self);
    fn unmaximize(&mut self);
    fn is_maximized(&self) -> bool;
    fn is_full_screen(&self) -> bool;
    fn is_full_screenable(&self) -> bool;

    fn set_zoom_level(&mut self, level: f64);
    fn zoom_level(&self) -> f64;
    fn toggle_dev_tools(&mut self);
    fn set_background_color(&mut self, color: Color);
    fn set_menu_bar_visible(&mut self, visible: bool);

    fn load_url(&mut self, url: &str);

    /// Offer an external link to this window. Returns whether it took it.
    fn try_open_link(&mut self, url: &str) -> bool;

    /// Tear the surface down. Idempotent.
    fn destroy(&mut self);
}

/// Creates windows. Needs to be handed in per call because some backends
/// can only create windows while their event loop is active.
pub trait WindowFactory {
    fn create(
        &mut self,
        id: WindowId,
        options: &WindowOptions,
    ) -> Result<Box<dyn WindowSurface>, HostError>;
}

pub trait DisplayProvider {
    fn displays(&self) -> Vec<Display>;
    fn cursor_position(&self) -> Point;
}

/// The webview cookie jar shared by all windows.
pub trait CredentialStore {
    fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<(), HostError>;
}

/// Clipboard and hand-offs to other applications.
pub trait ShellServices {
    fn clipboard_read(&mut self) -> Result<String, PlatformError>;
    fn clipboard_write(&mut self, text: &str) -> Result<(), PlatformError>;
    fn open_external(&mut self, url: &str) -> Result<(), PlatformError>;
    fn open_path(&mut self, path: &str) -> Result<(), PlatformError>;
    fn show_in_folder(&mut self, path: &str) -> Result<(), PlatformError>;
}

/// [`ShellServices`] backed by the real OS.
#[derive(Default)]
pub struct SystemShell {
    clipboard: kiln_platform::Clipboard,
}

impl SystemShell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShellServices for SystemShell {
    fn clipboard_read(&mut self) -> Result<String, PlatformError> {
        self.clipboard.read_text()
    }

    fn clipboard_write(&mut self, text: &str) -> Result<(), PlatformError> {
        self.clipboard.write_text(text)
    }

    fn open_external(&mut self, url: &str) -> Result<(), PlatformError> {
        kiln_platform::open_url(url)
    }

    fn open_path(&mut self, path: &str) -> Result<(), PlatformError> {
        kiln_platform::open_path(std::path::Path::new(path))
    }

    fn show_in_folder(&mut self, path: &str) -> Result<(), PlatformError> {
        kiln_platform::show_in_folder(std::path::Path::new(path))
    }
}
