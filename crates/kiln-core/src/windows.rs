//! Live windows and the order they were last focused in.

use std::collections::HashMap;

use kiln_common::{ChromeMode, Rect, WindowId};
use kiln_ipc::{HostPush, WindowEventKind};

use crate::surface::{WindowRole, WindowSurface};

/// Where a window is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowPhase {
    Constructing,
    Visible,
    Focused,
    Closing,
}

pub struct WindowRecord {
    pub id: WindowId,
    pub role: WindowRole,
    pub name: Option<String>,
    /// Chrome mode the window was created with; never changes afterwards.
    pub chrome: ChromeMode,
    pub phase: WindowPhase,
    pub surface: Box<dyn WindowSurface>,
}

impl WindowRecord {
    pub fn is_splash(&self) -> bool {
        self.role == WindowRole::Splash
    }
}

/// Owner of every open window.
///
/// The activation stack holds exactly the ids of the registered windows,
/// most recently focused first.
#[derive(Default)]
pub struct WindowRegistry {
    windows: HashMap<WindowId, WindowRecord>,
    stack: Vec<WindowId>,
    next_id: u32,
    restarting: Option<WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an id before the surface exists.
    pub fn allocate_id(&mut self) -> WindowId {
        self.next_id += 1;
        WindowId(self.next_id)
    }

    /// Track a freshly constructed window. It goes on top of the stack.
    pub fn register(
        &mut self,
        id: WindowId,
        role: WindowRole,
        name: Option<String>,
        chrome: ChromeMode,
        surface: Box<dyn WindowSurface>,
    ) {
        self.stack.retain(|w| *w != id);
        self.stack.insert(0, id);
        self.windows.insert(
            id,
            WindowRecord {
                id,
                role,
                name,
                chrome,
                phase: WindowPhase::Constructing,
                surface,
            },
        );
        tracing::debug!(window_id = %id, ?role, "window registered");
    }

    pub fn get(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut WindowRecord> {
        self.windows.get_mut(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn mark_visible(&mut self, id: WindowId) {
        if let Some(record) = self.windows.get_mut(&id) {
            if record.phase == WindowPhase::Constructing {
                record.phase = WindowPhase::Visible;
            }
        }
    }

    /// Move `id` to the head of the stack and tell the window.
    pub fn focus(&mut self, id: WindowId) -> bool {
        let Some(record) = self.windows.get_mut(&id) else {
            return false;
        };
        if record.phase == WindowPhase::Closing {
            return false;
        }
        record.phase = WindowPhase::Focused;
        record.surface.push(&HostPush::WindowEvent {
            event: WindowEventKind::Focus,
        });
        self.stack.retain(|w| *w != id);
        self.stack.insert(0, id);
        true
    }

    pub fn blur(&mut self, id: WindowId) {
        if let Some(record) = self.windows.get_mut(&id) {
            if record.phase == WindowPhase::Focused {
                record.phase = WindowPhase::Visible;
            }
            record.surface.push(&HostPush::WindowEvent {
                event: WindowEventKind::Blur,
            });
        }
    }

    pub fn begin_close(&mut self, id: WindowId) {
        if let Some(record) = self.windows.get_mut(&id) {
            record.phase = WindowPhase::Closing;
        }
    }

    /// The close was vetoed; the window is back to normal.
    pub fn cancel_close(&mut self, id: WindowId) {
        if let Some(record) = self.windows.get_mut(&id) {
            if record.phase == WindowPhase::Closing {
                record.phase = WindowPhase::Visible;
            }
        }
    }

    pub fn is_closing(&self, id: WindowId) -> bool {
        self.windows
            .get(&id)
            .is_some_and(|r| r.phase == WindowPhase::Closing)
    }

    /// Forget a window. The caller disposes whatever else it owned.
    pub fn remove(&mut self, id: WindowId) -> Option<WindowRecord> {
        self.stack.retain(|w| *w != id);
        let record = self.windows.remove(&id);
        if record.is_some() {
            tracing::debug!(window_id = %id, "window unregistered");
        }
        record
    }

    /// Most recently focused first.
    pub fn activation_order(&self) -> &[WindowId] {
        &self.stack
    }

    /// The most recently focused window of the given roles.
    pub fn most_recent(&self, roles: &[WindowRole]) -> Option<WindowId> {
        self.stack
            .iter()
            .copied()
            .find(|id| self.windows.get(id).is_some_and(|r| roles.contains(&r.role)))
    }

    /// Resolve a named secondary window by scanning open windows.
    pub fn find_by_name(&self, name: &str) -> Option<WindowId> {
        self.stack
            .iter()
            .copied()
            .find(|id| self.windows.get(id).and_then(|r| r.name.as_deref()) == Some(name))
    }

    /// Bounds of every open, non-splash window other than `except`.
    pub fn open_bounds(&self, except: Option<WindowId>) -> Vec<Rect> {
        self.stack
            .iter()
            .filter(|id| Some(**id) != except)
            .filter_map(|id| self.windows.get(id))
            .filter(|r| !r.is_splash())
            .filter_map(|r| r.surface.bounds())
            .collect()
    }

    /// Windows that keep the app alive.
    pub fn app_window_count(&self) -> usize {
        self.windows.values().filter(|r| !r.is_splash()).count()
    }

    pub fn ids(&self) -> Vec<WindowId> {
        self.stack.clone()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Push to every open window.
    pub fn broadcast(&mut self, push: &HostPush) {
        for record in self.windows.values_mut() {
            record.surface.push(push);
        }
    }

    /// Offer `url` to windows in activation order. The first window that
    /// accepts gets it and nobody after it is asked.
    pub fn open_external_link(&mut self, url: &str) -> bool {
        for id in self.stack.clone() {
            let Some(record) = self.windows.get_mut(&id) else {
                continue;
            };
            if record.is_splash() {
                continue;
            }
            if record.surface.try_open_link(url) {
                tracing::debug!(window_id = %id, url, "external link accepted");
                return true;
            }
        }
        false
    }

    // -- restart ------------------------------------------------------------

    /// Suppress the quit-when-empty policy while `target` is recycled.
    pub fn begin_restart(&mut self, target: WindowId) -> bool {
        if self.restarting.is_some() {
            return false;
        }
        self.restarting = Some(target);
        true
    }

    pub fn is_restarting(&self) -> bool {
        self.restarting.is_some()
    }

    pub fn restart_target(&self) -> Option<WindowId> {
        self.restarting
    }

    /// Close was vetoed or relaunch finished.
    pub fn end_restart(&mut self) {
        self.restarting = None;
    }
}
