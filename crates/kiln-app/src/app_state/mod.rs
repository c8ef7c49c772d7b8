//! Top-level application state.
//!
//! Implements `winit::application::ApplicationHandler` to drive the main
//! event loop. Window events and backend callbacks become `HostEvent`s for
//! the `HostController`; async work reports back over a channel that is
//! polled between loop iterations.

mod core;
mod event_handler;
mod init;
mod polling;
mod shutdown;
mod types;

pub use core::KilnApp;
