//! Control-plane protocol between the host and its windows.
//!
//! Messages flow in both directions as JSON envelopes:
//! - **window -> host**: `window.kiln.ipc.send(kind, payload)` or
//!   `window.kiln.ipc.request(kind, payload)` posts an [`IpcMessage`]; the
//!   host parses it into a [`ControlOp`].
//! - **host -> window**: the host evaluates [`js_dispatch_message`] with a
//!   [`HostPush`], which lands in `window.kiln.ipc._dispatch`.
//!
//! Host-initiated questions (close confirmation and friends) use
//! single-use reply channels tracked by [`PendingReplies`].

pub mod menu;
pub mod message;
pub mod ops;
pub mod popup;
pub mod replies;
pub mod script;

pub use menu::{build_native_menu, MenuItemKind, MenuItemTemplate, MenuTemplate, NativeMenu, NativeMenuItem};
pub use message::IpcMessage;
pub use ops::{is_op_kind_allowed, CloseReason, ControlOp, HostPush, OpParseError, WindowEventKind};
pub use popup::{Popup, PopupRegistry};
pub use replies::{PendingReplies, PendingReply, ReplyChannels, ReplyOutcome};
pub use script::{js_dispatch_message, IPC_INIT_SCRIPT};
