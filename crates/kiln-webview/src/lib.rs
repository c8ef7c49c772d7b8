//! wry + winit backend for Kiln windows.
//!
//! Each host window is a winit window with one child `wry::WebView`
//! filling it. This crate provides:
//! - [`WryFactory`], which builds them for the host controller
//! - [`WebViewSurface`], the host's view of one of them
//! - Navigation policy, IPC, and page-load hooks feeding [`WebViewEvent`]s
//! - The shared session cookie and a monitor snapshot

pub mod convert;
pub mod cookies;
pub mod displays;
pub mod events;
pub mod manager;

pub use cookies::SessionCookies;
pub use displays::MonitorDisplays;
pub use events::{PageLoadState, WebViewEvent};
pub use manager::{NavigationPolicy, WebViewConfig, WebViewManager, WebViewSurface, WryFactory};
