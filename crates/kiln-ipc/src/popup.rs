//! Open popup menus, keyed by the id the window chose.

use std::collections::HashMap;

use kiln_common::WindowId;

use crate::menu::NativeMenu;

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: u32,
    pub owner: WindowId,
    pub menu: NativeMenu,
}

/// Popups currently on screen. A popup lives from `open-popup` until it is
/// closed by request, dismissed, or its owner window closes.
#[derive(Debug, Default)]
pub struct PopupRegistry {
    popups: HashMap<(WindowId, u32), Popup>,
}

impl PopupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a popup, returning any popup it replaced under the same id.
    pub fn open(&mut self, owner: WindowId, id: u32, menu: NativeMenu) -> Option<Popup> {
        self.popups.insert((owner, id), Popup { id, owner, menu })
    }

    pub fn get(&self, owner: WindowId, id: u32) -> Option<&Popup> {
        self.popups.get(&(owner, id))
    }

    /// Forget a popup. `None` when it was already gone.
    pub fn close(&mut self, owner: WindowId, id: u32) -> Option<Popup> {
        self.popups.remove(&(owner, id))
    }

    /// Forget every popup a window owns; returns their ids.
    pub fn remove_owner(&mut self, owner: WindowId) -> Vec<u32> {
        let ids: Vec<u32> = self
            .popups
            .keys()
            .filter(|(w, _)| *w == owner)
            .map(|(_, id)| *id)
            .collect();
        for id in &ids {
            self.popups.remove(&(owner, *id));
        }
        ids
    }

    pub fn ids_for(&self, owner: WindowId) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .popups
            .keys()
            .filter(|(w, _)| *w == owner)
            .map(|(_, id)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }
}
