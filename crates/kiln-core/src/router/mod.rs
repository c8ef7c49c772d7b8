//! Control-plane dispatch from windows to host operations, plus the
//! host-initiated close questions.
//!
//! Every message a window posts lands in [`CommandRouter::dispatch`]. The
//! router owns nothing window-shaped itself: windows, the token and the
//! shell come in through a [`RouterCtx`] per call, and anything that needs
//! the lifecycle controller (closing, restarting, persisting settings) is
//! handed back as a [`HostAction`].

mod menus;

use std::collections::HashMap;
use std::time::Duration;

use base64::Engine as _;
use kiln_common::{ChromeMode, Color, WindowId};
use kiln_ipc::{
    CloseReason, ControlOp, HostPush, IpcMessage, NativeMenu, OpParseError, PendingReplies,
    PendingReply, PopupRegistry, WindowEventKind,
};
use serde_json::{json, Value};

use crate::surface::{CredentialStore, ShellServices, WindowRole};
use crate::trust::TrustTokenService;
use crate::windows::WindowRegistry;

/// Follow-up work only the lifecycle controller can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    Restart(WindowId),
    Close(WindowId),
    PersistChrome(ChromeMode),
    PersistBackground(String),
}

/// Receives `channel` pass-through traffic for one channel name.
///
/// Returning bytes pushes them back to the sender on the same channel.
pub trait ChannelHandler {
    fn handle(&mut self, window: WindowId, data: &[u8]) -> Option<Vec<u8>>;
}

/// Borrowed host state for one dispatch.
pub struct RouterCtx<'a> {
    pub registry: &'a mut WindowRegistry,
    pub trust: &'a TrustTokenService,
    pub shell: &'a mut dyn ShellServices,
    pub credentials: &'a mut dyn CredentialStore,
    pub actions: &'a mut Vec<HostAction>,
}

type OpResult = Result<Value, String>;

pub struct CommandRouter {
    replies: PendingReplies,
    popups: PopupRegistry,
    menus: HashMap<WindowId, NativeMenu>,
    channels: HashMap<String, Box<dyn ChannelHandler>>,
    reply_timeout: Duration,
}

impl CommandRouter {
    pub fn new(reply_timeout: Duration) -> Self {
        Self {
            replies: PendingReplies::new(),
            popups: PopupRegistry::new(),
            menus: HashMap::new(),
            channels: HashMap::new(),
            reply_timeout,
        }
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    pub fn replies(&self) -> &PendingReplies {
        &self.replies
    }

    pub fn popups(&self) -> &PopupRegistry {
        &self.popups
    }

    pub fn menu(&self, window: WindowId) -> Option<&NativeMenu> {
        self.menus.get(&window)
    }

    pub fn register_channel(&mut self, name: impl Into<String>, handler: Box<dyn ChannelHandler>) {
        let name = name.into();
        if self.channels.insert(name.clone(), handler).is_some() {
            tracing::warn!(channel = %name, "channel handler replaced");
        }
    }

    /// Drop everything the router tracks for a window that is going away.
    pub fn dispose_window(&mut self, window: WindowId) {
        let replies = self.replies.dispose_owner(window);
        let popups = self.popups.remove_owner(window);
        self.menus.remove(&window);
        if replies > 0 || !popups.is_empty() {
            tracing::debug!(window_id = %window, replies, popups = popups.len(), "window ipc state disposed");
        }
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Handle one raw message posted by `window`.
    pub fn dispatch(&mut self, window: WindowId, body: &str, ctx: &mut RouterCtx<'_>) {
        if !ctx.registry.contains(window) {
            tracing::warn!(window_id = %window, "IPC message from unknown window dropped");
            return;
        }

        let (id, op) = match ControlOp::parse(body) {
            Ok(parsed) => parsed,
            Err(err) => {
                match &err {
                    OpParseError::Malformed(_) => tracing::warn!(
                        window_id = %window,
                        body_len = body.len(),
                        "IPC message rejected: failed to parse"
                    ),
                    OpParseError::UnknownKind(kind) => tracing::warn!(
                        window_id = %window,
                        kind = %kind,
                        "IPC message rejected: unknown kind"
                    ),
                    OpParseError::InvalidPayload { kind, reason } => tracing::warn!(
                        window_id = %window,
                        kind = %kind,
                        reason = %reason,
                        "IPC message rejected: invalid payload"
                    ),
                }
                if let Some(id) = IpcMessage::from_json(body).and_then(|m| m.id) {
                    send(ctx.registry, window, &IpcMessage::response_err(id, err.to_string()));
                }
                return;
            }
        };

        tracing::debug!(window_id = %window, ?id, "IPC message dispatched");

        let result = self.handle(window, op, ctx);
        match (id, result) {
            (Some(id), Ok(value)) => send(ctx.registry, window, &IpcMessage::response_ok(id, value)),
            (Some(id), Err(error)) => {
                send(ctx.registry, window, &IpcMessage::response_err(id, error))
            }
            (None, Err(error)) => {
                tracing::warn!(window_id = %window, error = %error, "IPC notification failed")
            }
            (None, Ok(_)) => {}
        }
    }

    fn handle(&mut self, window: WindowId, op: ControlOp, ctx: &mut RouterCtx<'_>) -> OpResult {
        match op {
            ControlOp::WindowMetadata => window_metadata(ctx.registry, window),
            ControlOp::GetSecurityToken => Ok(json!(ctx.trust.value())),
            ControlOp::AttachSecurityToken => ctx
                .trust
                .attach(ctx.credentials)
                .map(Value::Bool)
                .map_err(|e| e.to_string()),

            ControlOp::SetMenu { template } => {
                self.set_menu(window, &template, ctx.registry);
                Ok(Value::Null)
            }
            ControlOp::ClearMenu => {
                self.clear_menu(window, ctx.registry);
                Ok(Value::Null)
            }
            ControlOp::SetMenuBarVisibility { name, visible } => {
                set_menu_bar_visibility(ctx.registry, &name, visible);
                Ok(Value::Null)
            }
            ControlOp::OpenPopup {
                popup_id,
                template,
                x,
                y,
            } => {
                self.open_popup(window, popup_id, &template, x, y, ctx.registry);
                Ok(Value::Null)
            }
            ControlOp::ClosePopup { popup_id } => {
                let closed = self.close_popup(window, popup_id, ctx.registry);
                Ok(Value::Bool(closed))
            }
            ControlOp::MenuActivated { item_id, popup_id } => {
                self.menu_activated(window, &item_id, popup_id, ctx.registry);
                Ok(Value::Null)
            }
            ControlOp::PopupDismissed { popup_id } => {
                self.popup_dismissed(window, popup_id, ctx.registry);
                Ok(Value::Null)
            }

            ControlOp::FocusWindow { name } => {
                focus_named(ctx.registry, &name);
                Ok(Value::Null)
            }
            ControlOp::Minimize => with_surface(ctx.registry, window, |s| {
                s.minimize();
                Value::Null
            }),
            ControlOp::Maximize => with_surface(ctx.registry, window, |s| {
                s.maximize();
                s.push(&HostPush::WindowEvent {
                    event: WindowEventKind::Maximize,
                });
                Value::Null
            }),
            ControlOp::Unmaximize => with_surface(ctx.registry, window, |s| {
                s.unmaximize();
                s.push(&HostPush::WindowEvent {
                    event: WindowEventKind::Unmaximize,
                });
                Value::Null
            }),
            ControlOp::Close => {
                ctx.actions.push(HostAction::Close(window));
                Ok(Value::Null)
            }
            ControlOp::IsMaximized => with_surface(ctx.registry, window, |s| json!(s.is_maximized())),
            ControlOp::IsFullScreen => {
                with_surface(ctx.registry, window, |s| json!(s.is_full_screen()))
            }
            ControlOp::IsFullScreenable => {
                with_surface(ctx.registry, window, |s| json!(s.is_full_screenable()))
            }
            ControlOp::SetZoomLevel { level } => {
                if !level.is_finite() {
                    return Err(format!("invalid zoom level {level}"));
                }
                with_surface(ctx.registry, window, |s| {
                    s.set_zoom_level(level);
                    Value::Null
                })
            }
            ControlOp::GetZoomLevel => with_surface(ctx.registry, window, |s| json!(s.zoom_level())),
            ControlOp::ToggleDevTools => with_surface(ctx.registry, window, |s| {
                s.toggle_dev_tools();
                Value::Null
            }),
            ControlOp::Restart => {
                ctx.actions.push(HostAction::Restart(window));
                Ok(Value::Null)
            }

            ControlOp::ClipboardRead => ctx
                .shell
                .clipboard_read()
                .map(Value::String)
                .map_err(|e| e.to_string()),
            ControlOp::ClipboardWrite { text } => ctx
                .shell
                .clipboard_write(&text)
                .map(|()| Value::Null)
                .map_err(|e| e.to_string()),
            ControlOp::ShowInFolder { path } => ctx
                .shell
                .show_in_folder(&path)
                .map(|()| Value::Null)
                .map_err(|e| e.to_string()),
            ControlOp::OpenWithSystemApp { path } => ctx
                .shell
                .open_path(&path)
                .map(|()| Value::Null)
                .map_err(|e| e.to_string()),
            ControlOp::OpenExternal { url } => ctx
                .shell
                .open_external(&url)
                .map(|()| Value::Null)
                .map_err(|e| e.to_string()),

            ControlOp::SetTitleBarStyle { style } => {
                // Applies to windows created from now on.
                ctx.actions.push(HostAction::PersistChrome(style));
                Ok(Value::Null)
            }
            ControlOp::SetBackgroundColor { color } => {
                let parsed = Color::from_hex(&color).ok_or_else(|| format!("invalid color '{color}'"))?;
                with_surface(ctx.registry, window, |s| {
                    s.set_background_color(parsed);
                    Value::Null
                })?;
                ctx.actions.push(HostAction::PersistBackground(parsed.to_hex()));
                Ok(Value::Null)
            }

            ControlOp::Reply { channel, value } => {
                if !self.replies.resolve(&channel, &value) {
                    tracing::debug!(window_id = %window, channel = %channel, "late or unknown reply");
                }
                Ok(Value::Null)
            }
            ControlOp::Channel { channel, data } => self.channel(window, &channel, &data, ctx.registry),
        }
    }

    fn channel(
        &mut self,
        window: WindowId,
        channel: &str,
        data: &str,
        registry: &mut WindowRegistry,
    ) -> OpResult {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| format!("channel '{channel}': invalid base64: {e}"))?;
        let Some(handler) = self.channels.get_mut(channel) else {
            tracing::warn!(window_id = %window, channel, "no handler for channel");
            return Ok(Value::Null);
        };
        if let Some(reply) = handler.handle(window, &bytes) {
            push(
                registry,
                window,
                &HostPush::Channel {
                    channel: channel.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(reply),
                },
            );
        }
        Ok(Value::Null)
    }

    // =========================================================================
    // HOST -> WINDOW QUESTIONS
    // =========================================================================

    /// Ask whether `window` may close.
    ///
    /// Named secondary windows are negotiated through the main window,
    /// which decides on their behalf. Everyone else is asked directly.
    /// `None` when there is nobody to ask.
    pub fn request_close(
        &self,
        registry: &mut WindowRegistry,
        window: WindowId,
        reason: CloseReason,
    ) -> Option<PendingReply> {
        let record = registry.get(window)?;
        let secondary_name = match (record.role, &record.name) {
            (WindowRole::Secondary, Some(name)) => Some(name.clone()),
            _ => None,
        };
        let main = registry
            .most_recent(&[WindowRole::Main])
            .filter(|main| *main != window);

        if let (Some(name), Some(main)) = (secondary_name, main) {
            let (reply, pending) = self.replies.open(main, true);
            push(registry, main, &HostPush::RequestSecondaryClose { name, reply });
            return Some(pending);
        }

        let (reply, pending) = self.replies.open(window, true);
        push(registry, window, &HostPush::RequestClose { reason, reply });
        Some(pending)
    }

    /// Tell `window` the app is quitting and wait for its go-ahead.
    pub fn about_to_close(
        &self,
        registry: &mut WindowRegistry,
        window: WindowId,
        reason: CloseReason,
    ) -> Option<PendingReply> {
        if !registry.contains(window) {
            return None;
        }
        let (reply, pending) = self.replies.open(window, false);
        push(registry, window, &HostPush::AboutToClose { reason, reply });
        Some(pending)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn send(registry: &mut WindowRegistry, window: WindowId, msg: &IpcMessage) {
    if let Some(record) = registry.get_mut(window) {
        record.surface.send(msg);
    }
}

fn push(registry: &mut WindowRegistry, window: WindowId, push: &HostPush) {
    if let Some(record) = registry.get_mut(window) {
        record.surface.push(push);
    }
}

fn with_surface(
    registry: &mut WindowRegistry,
    window: WindowId,
    f: impl FnOnce(&mut dyn crate::surface::WindowSurface) -> Value,
) -> OpResult {
    match registry.get_mut(window) {
        Some(record) => Ok(f(record.surface.as_mut())),
        None => Err(format!("{window} is gone")),
    }
}

fn window_metadata(registry: &WindowRegistry, window: WindowId) -> OpResult {
    let record = registry
        .get(window)
        .ok_or_else(|| format!("{window} is gone"))?;
    let role = match record.role {
        WindowRole::Main => "main",
        WindowRole::Secondary => "secondary",
        WindowRole::Splash => "splash",
    };
    Ok(json!({
        "id": window.0,
        "role": role,
        "name": record.name,
        "chromeMode": record.chrome,
        "platform": std::env::consts::OS,
    }))
}

fn set_menu_bar_visibility(registry: &mut WindowRegistry, name: &str, visible: bool) {
    let Some(target) = registry.find_by_name(name) else {
        tracing::warn!(name, "set-menu-bar-visibility: no open window with that name");
        return;
    };
    if let Some(record) = registry.get_mut(target) {
        record.surface.set_menu_bar_visible(visible);
        record.surface.push(&HostPush::MenuBarVisibility { visible });
    }
}

fn focus_named(registry: &mut WindowRegistry, name: &str) {
    let Some(target) = registry.find_by_name(name) else {
        tracing::warn!(name, "focus-window: no open window with that name");
        return;
    };
    if let Some(record) = registry.get_mut(target) {
        if !record.surface.is_visible() {
            record.surface.show();
        }
        // The backend reports the resulting focus change as a normal event.
        record.surface.focus();
    }
}
