//! In-memory stand-ins for the presentation layer and OS shell.

use std::cell::RefCell;
use std::rc::Rc;

use kiln_common::{Color, Display, HostError, PlatformError, Point, Rect, WindowId};
use kiln_ipc::IpcMessage;

use crate::surface::{
    CredentialStore, DisplayProvider, ShellServices, WindowFactory, WindowOptions, WindowSurface,
};
use crate::trust::SessionCookie;

#[derive(Debug, Default)]
pub struct FakeSurfaceState {
    pub bounds: Rect,
    pub visible: bool,
    pub destroyed: bool,
    pub focused: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub full_screen: bool,
    pub zoom: f64,
    pub dev_tools: bool,
    pub menu_bar_visible: bool,
    pub background: Option<Color>,
    pub url: Option<String>,
    pub accepts_links: bool,
    pub link_offers: Vec<String>,
    pub sent: Vec<IpcMessage>,
}

/// A window whose state tests can inspect after handing it off.
#[derive(Clone, Default)]
pub struct FakeSurface(Rc<RefCell<FakeSurfaceState>>);

impl FakeSurface {
    pub fn new(bounds: Rect) -> Self {
        let fake = Self::default();
        fake.0.borrow_mut().bounds = bounds;
        fake
    }

    pub fn accepting_links(self, accepts: bool) -> Self {
        self.0.borrow_mut().accepts_links = accepts;
        self
    }

    pub fn boxed(&self) -> Box<dyn WindowSurface> {
        Box::new(self.clone())
    }

    pub fn state(&self) -> std::cell::Ref<'_, FakeSurfaceState> {
        self.0.borrow()
    }

    pub fn set_bounds_externally(&self, bounds: Rect) {
        self.0.borrow_mut().bounds = bounds;
    }

    pub fn link_offers(&self) -> Vec<String> {
        self.0.borrow().link_offers.clone()
    }

    pub fn sent(&self) -> Vec<IpcMessage> {
        self.0.borrow().sent.clone()
    }

    pub fn pushed_kinds(&self) -> Vec<String> {
        self.0.borrow().sent.iter().map(|m| m.kind.clone()).collect()
    }

    /// The last message of the given kind.
    pub fn last(&self, kind: &str) -> Option<IpcMessage> {
        self.0
            .borrow()
            .sent
            .iter()
            .rev()
            .find(|m| m.kind == kind)
            .cloned()
    }
}

impl WindowSurface for FakeSurface {
    fn send(&mut self, msg: &IpcMessage) {
        self.0.borrow_mut().sent.push(msg.clone());
    }

    fn bounds(&self) -> Option<Rect> {
        let state = self.0.borrow();
        (!state.destroyed).then_some(state.bounds)
    }

    fn set_bounds(&mut self, bounds: Rect) {
        self.0.borrow_mut().bounds = bounds;
    }

    fn is_destroyed(&self) -> bool {
        self.0.borrow().destroyed
    }

    fn show(&mut self) {
        self.0.borrow_mut().visible = true;
    }

    fn is_visible(&self) -> bool {
        self.0.borrow().visible
    }

    fn focus(&mut self) {
        self.0.borrow_mut().focused = true;
    }

    fn minimize(&mut self) {
        self.0.borrow_mut().minimized = true;
    }

    fn maximize(&mut self) {
        self.0.borrow_mut().maximized = true;
    }

    fn unmaximize(&mut self) {
        self.0.borrow_mut().maximized = false;
    }

    fn is_maximized(&self) -> bool {
        self.0.borrow().maximized
    }

    fn is_full_screen(&self) -> bool {
        self.0.borrow().full_screen
    }

    fn is_full_screenable(&self) -> bool {
        true
    }

    fn set_zoom_level(&mut self, level: f64) {
        self.0.borrow_mut().zoom = level;
    }

    fn zoom_level(&self) -> f64 {
        self.0.borrow().zoom
    }

    fn toggle_dev_tools(&mut self) {
        let mut state = self.0.borrow_mut();
        state.dev_tools = !state.dev_tools;
    }

    fn set_background_color(&mut self, color: Color) {
        self.0.borrow_mut().background = Some(color);
    }

    fn set_menu_bar_visible(&mut self, visible: bool) {
        self.0.borrow_mut().menu_bar_visible = visible;
    }

    fn load_url(&mut self, url: &str) {
        self.0.borrow_mut().url = Some(url.to_string());
    }

    fn try_open_link(&mut self, url: &str) -> bool {
        let mut state = self.0.borrow_mut();
        state.link_offers.push(url.to_string());
        state.accepts_links
    }

    fn destroy(&mut self) {
        let mut state = self.0.borrow_mut();
        state.destroyed = true;
        state.visible = false;
    }
}

/// Records every window it builds.
#[derive(Default)]
pub struct FakeFactory {
    pub created: Vec<(WindowId, WindowOptions, FakeSurface)>,
    pub fail_next: bool,
    /// Windows built from now on accept external links.
    pub accept_links: bool,
}

impl FakeFactory {
    pub fn surface(&self, id: WindowId) -> Option<FakeSurface> {
        self.created
            .iter()
            .find(|(wid, _, _)| *wid == id)
            .map(|(_, _, s)| s.clone())
    }

    pub fn last_id(&self) -> Option<WindowId> {
        self.created.last().map(|(id, _, _)| *id)
    }

    pub fn options(&self, id: WindowId) -> Option<&WindowOptions> {
        self.created
            .iter()
            .find(|(wid, _, _)| *wid == id)
            .map(|(_, o, _)| o)
    }
}

impl WindowFactory for FakeFactory {
    fn create(
        &mut self,
        id: WindowId,
        options: &WindowOptions,
    ) -> Result<Box<dyn WindowSurface>, HostError> {
        if std::mem::take(&mut self.fail_next) {
            return Err(HostError::Window("factory refused".into()));
        }
        let surface = FakeSurface::new(options.bounds).accepting_links(self.accept_links);
        surface.0.borrow_mut().visible = options.visible;
        surface.0.borrow_mut().maximized = options.maximized;
        surface.0.borrow_mut().url = Some(options.url.clone());
        self.created.push((id, options.clone(), surface.clone()));
        Ok(surface.boxed())
    }
}

pub struct FakeDisplays {
    pub displays: Vec<Display>,
    pub cursor: Point,
}

impl FakeDisplays {
    pub fn single(width: i32, height: i32) -> Self {
        Self {
            displays: vec![Display::new(Rect::new(0, 0, width, height))],
            cursor: Point::new(10, 10),
        }
    }
}

impl DisplayProvider for FakeDisplays {
    fn displays(&self) -> Vec<Display> {
        self.displays.clone()
    }

    fn cursor_position(&self) -> Point {
        self.cursor
    }
}

#[derive(Default)]
pub struct FakeCredentials {
    cookies: Rc<RefCell<Vec<SessionCookie>>>,
    fail: bool,
}

impl FakeCredentials {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn cookies(&self) -> Vec<SessionCookie> {
        self.cookies.borrow().clone()
    }

    pub fn share(&self) -> Self {
        Self {
            cookies: self.cookies.clone(),
            fail: self.fail,
        }
    }
}

impl CredentialStore for FakeCredentials {
    fn set_cookie(&mut self, cookie: &SessionCookie) -> Result<(), HostError> {
        if self.fail {
            return Err(HostError::Other("cookie jar locked".into()));
        }
        self.cookies.borrow_mut().push(cookie.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeShellState {
    pub clipboard: String,
    pub opened_urls: Vec<String>,
    pub opened_paths: Vec<String>,
    pub revealed: Vec<String>,
}

#[derive(Clone, Default)]
pub struct FakeShell(pub Rc<RefCell<FakeShellState>>);

impl ShellServices for FakeShell {
    fn clipboard_read(&mut self) -> Result<String, PlatformError> {
        Ok(self.0.borrow().clipboard.clone())
    }

    fn clipboard_write(&mut self, text: &str) -> Result<(), PlatformError> {
        self.0.borrow_mut().clipboard = text.to_string();
        Ok(())
    }

    fn open_external(&mut self, url: &str) -> Result<(), PlatformError> {
        if !kiln_platform::is_openable_url(url) {
            return Err(PlatformError::OpenError(url.to_string()));
        }
        self.0.borrow_mut().opened_urls.push(url.to_string());
        Ok(())
    }

    fn open_path(&mut self, path: &str) -> Result<(), PlatformError> {
        self.0.borrow_mut().opened_paths.push(path.to_string());
        Ok(())
    }

    fn show_in_folder(&mut self, path: &str) -> Result<(), PlatformError> {
        self.0.borrow_mut().revealed.push(path.to_string());
        Ok(())
    }
}
