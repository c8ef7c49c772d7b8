//! Application menus and popups.
//!
//! Menus are rendered by the page; the host keeps the built model so item
//! activations can be checked and routed by id.

use kiln_common::WindowId;
use kiln_ipc::{build_native_menu, HostPush, MenuTemplate, NativeMenu};

use super::{push, CommandRouter};
use crate::windows::WindowRegistry;

impl CommandRouter {
    pub(super) fn set_menu(
        &mut self,
        window: WindowId,
        template: &MenuTemplate,
        registry: &mut WindowRegistry,
    ) {
        let menu = build_native_menu(template);
        push(registry, window, &HostPush::ShowMenu { menu: menu.clone() });
        self.menus.insert(window, menu);
    }

    pub(super) fn clear_menu(&mut self, window: WindowId, registry: &mut WindowRegistry) {
        self.menus.remove(&window);
        push(
            registry,
            window,
            &HostPush::ShowMenu {
                menu: NativeMenu::default(),
            },
        );
    }

    pub(super) fn open_popup(
        &mut self,
        window: WindowId,
        popup_id: u32,
        template: &MenuTemplate,
        x: Option<i32>,
        y: Option<i32>,
        registry: &mut WindowRegistry,
    ) {
        let menu = build_native_menu(template);
        if self.popups.open(window, popup_id, menu.clone()).is_some() {
            tracing::debug!(window_id = %window, popup_id, "popup replaced");
        }
        push(registry, window, &HostPush::ShowPopup { popup_id, menu, x, y });
    }

    /// Close exactly the popup asked for. Returns whether it was open.
    pub(super) fn close_popup(
        &mut self,
        window: WindowId,
        popup_id: u32,
        registry: &mut WindowRegistry,
    ) -> bool {
        if self.popups.close(window, popup_id).is_none() {
            tracing::debug!(window_id = %window, popup_id, "close-popup: not open");
            return false;
        }
        push(registry, window, &HostPush::HidePopup { popup_id });
        push(registry, window, &HostPush::PopupClosed { popup_id });
        true
    }

    pub(super) fn popup_dismissed(
        &mut self,
        window: WindowId,
        popup_id: u32,
        registry: &mut WindowRegistry,
    ) {
        if self.popups.close(window, popup_id).is_some() {
            push(registry, window, &HostPush::PopupClosed { popup_id });
        }
    }

    pub(super) fn menu_activated(
        &mut self,
        window: WindowId,
        item_id: &str,
        popup_id: Option<u32>,
        registry: &mut WindowRegistry,
    ) {
        let menu = match popup_id {
            Some(popup_id) => self.popups.get(window, popup_id).map(|p| &p.menu),
            None => self.menus.get(&window),
        };
        let Some(item) = menu.and_then(|m| m.find(item_id)) else {
            tracing::warn!(window_id = %window, item_id, ?popup_id, "activation of unknown menu item");
            return;
        };
        if !item.enabled {
            tracing::debug!(window_id = %window, item_id, "disabled menu item ignored");
            return;
        }
        let clicked = HostPush::MenuItemClicked {
            item_id: item.id.clone(),
            command: item.command.clone(),
            popup_id,
        };
        push(registry, window, &clicked);

        // Choosing an item ends the popup.
        if let Some(popup_id) = popup_id {
            self.popups.close(window, popup_id);
            push(registry, window, &HostPush::PopupClosed { popup_id });
        }
    }
}
