//! Typed control-plane operations (window -> host) and pushes (host -> window).

use kiln_common::{AppState, ChromeMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::menu::{MenuTemplate, NativeMenu};
use crate::message::IpcMessage;
use crate::replies::ReplyChannels;

// =============================================================================
// ALLOWLIST
// =============================================================================

/// Every kind a window may send. Anything else is rejected and logged.
const ALLOWED_OP_KINDS: &[&str] = &[
    "window-metadata",
    "get-security-token",
    "attach-security-token",
    "set-menu",
    "clear-menu",
    "set-menu-bar-visibility",
    "open-popup",
    "close-popup",
    "menu-activated",
    "popup-dismissed",
    "focus-window",
    "minimize",
    "maximize",
    "unmaximize",
    "close",
    "is-maximized",
    "is-full-screen",
    "is-full-screenable",
    "set-zoom-level",
    "get-zoom-level",
    "toggle-dev-tools",
    "restart",
    "clipboard-read",
    "clipboard-write",
    "show-in-folder",
    "open-with-system-app",
    "open-external",
    "set-title-bar-style",
    "set-background-color",
    "reply",
    "channel",
];

pub fn is_op_kind_allowed(kind: &str) -> bool {
    ALLOWED_OP_KINDS.contains(&kind)
}

// =============================================================================
// WINDOW -> HOST
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OpParseError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("unknown kind: {0}")]
    UnknownKind(String),

    #[error("invalid payload for '{kind}': {reason}")]
    InvalidPayload { kind: String, reason: String },
}

/// An operation a window invokes on the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ControlOp {
    WindowMetadata,
    GetSecurityToken,
    AttachSecurityToken,
    SetMenu {
        template: MenuTemplate,
    },
    ClearMenu,
    SetMenuBarVisibility {
        name: String,
        visible: bool,
    },
    OpenPopup {
        popup_id: u32,
        template: MenuTemplate,
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
    },
    ClosePopup {
        popup_id: u32,
    },
    /// The in-page menu renderer reports an item activation.
    MenuActivated {
        item_id: String,
        #[serde(default)]
        popup_id: Option<u32>,
    },
    /// A popup went away without an item being chosen.
    PopupDismissed {
        popup_id: u32,
    },
    FocusWindow {
        name: String,
    },
    Minimize,
    Maximize,
    Unmaximize,
    Close,
    IsMaximized,
    IsFullScreen,
    IsFullScreenable,
    SetZoomLevel {
        level: f64,
    },
    GetZoomLevel,
    ToggleDevTools,
    Restart,
    ClipboardRead,
    ClipboardWrite {
        text: String,
    },
    ShowInFolder {
        path: String,
    },
    OpenWithSystemApp {
        path: String,
    },
    OpenExternal {
        url: String,
    },
    SetTitleBarStyle {
        style: ChromeMode,
    },
    SetBackgroundColor {
        color: String,
    },
    /// Answer to a host-initiated question on a single-use reply channel.
    Reply {
        channel: String,
        #[serde(default)]
        value: Value,
    },
    /// Binary pass-through; `data` is base64.
    Channel {
        channel: String,
        data: String,
    },
}

impl ControlOp {
    /// Validate and decode an envelope into a typed operation.
    pub fn from_message(msg: &IpcMessage) -> Result<Self, OpParseError> {
        if !is_op_kind_allowed(&msg.kind) {
            return Err(OpParseError::UnknownKind(msg.kind.clone()));
        }

        // Unit variants carry no payload key at all.
        let mut envelope = serde_json::Map::new();
        envelope.insert("kind".into(), Value::String(msg.kind.clone()));
        if !msg.payload.is_null() {
            envelope.insert("payload".into(), msg.payload.clone());
        }

        serde_json::from_value(Value::Object(envelope)).map_err(|e| OpParseError::InvalidPayload {
            kind: msg.kind.clone(),
            reason: e.to_string(),
        })
    }

    pub fn parse(raw: &str) -> Result<(Option<u64>, Self), OpParseError> {
        let msg = IpcMessage::from_json(raw)
            .ok_or_else(|| OpParseError::Malformed(format!("{} bytes", raw.len())))?;
        let op = Self::from_message(&msg)?;
        Ok((msg.id, op))
    }
}

// =============================================================================
// HOST -> WINDOW
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowEventKind {
    Focus,
    Blur,
    Maximize,
    Unmaximize,
    EnterFullScreen,
    LeaveFullScreen,
}

/// Why a window is being asked to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseReason {
    #[default]
    User,
    Restart,
    Quit,
}

/// An event the host pushes into a window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "kind",
    content = "payload",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum HostPush {
    WindowEvent {
        event: WindowEventKind,
    },
    AppStateChanged {
        state: AppState,
    },
    ShowMenu {
        menu: NativeMenu,
    },
    MenuBarVisibility {
        visible: bool,
    },
    ShowPopup {
        popup_id: u32,
        menu: NativeMenu,
        x: Option<i32>,
        y: Option<i32>,
    },
    HidePopup {
        popup_id: u32,
    },
    PopupClosed {
        popup_id: u32,
    },
    MenuItemClicked {
        item_id: String,
        command: Option<String>,
        popup_id: Option<u32>,
    },
    AboutToClose {
        reason: CloseReason,
        reply: ReplyChannels,
    },
    RequestClose {
        reason: CloseReason,
        reply: ReplyChannels,
    },
    RequestSecondaryClose {
        name: String,
        reply: ReplyChannels,
    },
    OpenUrl {
        url: String,
    },
    OpenResource {
        path: Option<String>,
    },
    Channel {
        channel: String,
        data: String,
    },
}

impl HostPush {
    /// Split into the `(kind, payload)` pair `_dispatch` expects.
    pub fn to_parts(&self) -> (String, Value) {
        let mut value = serde_json::to_value(self).unwrap_or(Value::Null);
        let kind = value
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let payload = value
            .as_object_mut()
            .and_then(|obj| obj.remove("payload"))
            .unwrap_or(Value::Null);
        (kind, payload)
    }

    pub fn to_message(&self) -> IpcMessage {
        let (kind, payload) = self.to_parts();
        IpcMessage::notification(kind, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn op(kind: &str, payload: Value) -> Result<ControlOp, OpParseError> {
        ControlOp::from_message(&IpcMessage::notification(kind, payload))
    }

    #[test]
    fn unit_ops_parse_without_payload() {
        assert_eq!(op("minimize", Value::Null), Ok(ControlOp::Minimize));
        assert_eq!(op("is-maximized", Value::Null), Ok(ControlOp::IsMaximized));
        assert_eq!(op("get-security-token", Value::Null), Ok(ControlOp::GetSecurityToken));
    }

    #[test]
    fn struct_ops_use_camel_case_fields() {
        let parsed = op(
            "open-popup",
            json!({"popupId": 7, "template": {"items": []}, "x": 10}),
        )
        .unwrap();
        assert_eq!(
            parsed,
            ControlOp::OpenPopup {
                popup_id: 7,
                template: MenuTemplate::default(),
                x: Some(10),
                y: None,
            }
        );

        let parsed = op("set-menu-bar-visibility", json!({"name": "prefs", "visible": false})).unwrap();
        assert!(matches!(parsed, ControlOp::SetMenuBarVisibility { visible: false, .. }));
    }

    #[test]
    fn title_bar_style_parses_chrome_mode() {
        let parsed = op("set-title-bar-style", json!({"style": "custom"})).unwrap();
        assert_eq!(parsed, ControlOp::SetTitleBarStyle { style: ChromeMode::Custom });
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(op("eval", Value::Null), Err(OpParseError::UnknownKind("eval".into())));
        assert!(matches!(op("MINIMIZE", Value::Null), Err(OpParseError::UnknownKind(_))));
        assert!(matches!(op("close; rm -rf /", Value::Null), Err(OpParseError::UnknownKind(_))));
    }

    #[test]
    fn missing_payload_fields_are_invalid() {
        let err = op("focus-window", Value::Null).unwrap_err();
        assert!(matches!(err, OpParseError::InvalidPayload { ref kind, .. } if kind == "focus-window"));
        assert!(op("close-popup", json!({"popupId": "x"})).is_err());
    }

    #[test]
    fn parse_keeps_request_id() {
        let (id, parsed) = ControlOp::parse(r#"{"kind":"get-zoom-level","id":5}"#).unwrap();
        assert_eq!(id, Some(5));
        assert_eq!(parsed, ControlOp::GetZoomLevel);
        assert!(matches!(ControlOp::parse("{"), Err(OpParseError::Malformed(_))));
    }

    #[test]
    fn push_parts() {
        let (kind, payload) = HostPush::WindowEvent {
            event: WindowEventKind::Focus,
        }
        .to_parts();
        assert_eq!(kind, "window-event");
        assert_eq!(payload, json!({"event": "focus"}));

        let (kind, payload) = HostPush::PopupClosed { popup_id: 3 }.to_parts();
        assert_eq!(kind, "popup-closed");
        assert_eq!(payload, json!({"popupId": 3}));

        let (kind, payload) = HostPush::AppStateChanged {
            state: AppState::Running,
        }
        .to_parts();
        assert_eq!(kind, "app-state-changed");
        assert_eq!(payload, json!({"state": "running"}));
    }

    #[test]
    fn close_request_push_carries_reply_channels() {
        let push = HostPush::RequestClose {
            reason: CloseReason::Restart,
            reply: ReplyChannels {
                confirm: "reply-1-confirm".into(),
                cancel: Some("reply-1-cancel".into()),
            },
        };
        let msg = push.to_message();
        assert_eq!(msg.kind, "request-close");
        assert_eq!(msg.payload["reason"], "restart");
        assert_eq!(msg.payload["reply"]["confirm"], "reply-1-confirm");
        assert_eq!(msg.payload["reply"]["cancel"], "reply-1-cancel");
    }
}
