//! Menu templates sent by windows and the native menu model built from them.
//!
//! Menus are rebuilt from scratch on every `set-menu` / `open-popup`; there
//! is no incremental diffing. Item activation is routed by stable item id,
//! never by closure.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    #[default]
    Normal,
    Separator,
    Submenu,
    Checkbox,
    Radio,
}

/// JSON-serializable menu tree as supplied by a window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MenuTemplate {
    #[serde(default)]
    pub items: Vec<MenuItemTemplate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemTemplate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MenuItemKind,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub accelerator: Option<String>,
    /// Opaque handler reference echoed back to the window on activation.
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub submenu: Vec<MenuItemTemplate>,
}

fn default_true() -> bool {
    true
}

/// Menu as handed to the presentation backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NativeMenu {
    pub items: Vec<NativeMenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeMenuItem {
    pub id: String,
    pub label: String,
    pub kind: MenuItemKind,
    pub enabled: bool,
    pub checked: bool,
    pub accelerator: Option<String>,
    pub command: Option<String>,
    pub submenu: Vec<NativeMenuItem>,
}

impl NativeMenu {
    /// Depth-first lookup of an item by id.
    pub fn find(&self, id: &str) -> Option<&NativeMenuItem> {
        fn walk<'a>(items: &'a [NativeMenuItem], id: &str) -> Option<&'a NativeMenuItem> {
            for item in items {
                if item.id == id {
                    return Some(item);
                }
                if let Some(found) = walk(&item.submenu, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.items, id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Native accelerator tables only bind ASCII key names reliably.
pub fn sanitize_accelerator(accelerator: Option<&str>) -> Option<String> {
    let accel = accelerator?.trim();
    if accel.is_empty() || !accel.is_ascii() {
        return None;
    }
    Some(accel.to_string())
}

/// Build the native model from a template.
///
/// Invisible items are dropped, non-ASCII accelerators are stripped, and
/// items without an id get a positional one (`"0.2.1"`) so activation can
/// still be routed.
pub fn build_native_menu(template: &MenuTemplate) -> NativeMenu {
    NativeMenu {
        items: build_items(&template.items, ""),
    }
}

fn build_items(items: &[MenuItemTemplate], prefix: &str) -> Vec<NativeMenuItem> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.visible)
        .map(|(index, item)| {
            let path = if prefix.is_empty() {
                index.to_string()
            } else {
                format!("{prefix}.{index}")
            };
            let kind = if !item.submenu.is_empty() && item.kind == MenuItemKind::Normal {
                MenuItemKind::Submenu
            } else {
                item.kind
            };
            NativeMenuItem {
                id: item.id.clone().unwrap_or_else(|| path.clone()),
                label: item.label.clone().unwrap_or_default(),
                kind,
                enabled: item.enabled,
                checked: item.checked,
                accelerator: sanitize_accelerator(item.accelerator.as_deref()),
                command: item.command.clone(),
                submenu: build_items(&item.submenu, &path),
            }
        })
        .collect()
}
