//! Host orchestration for Kiln.
//!
//! Owns everything between the OS and the page:
//! - Worker supervision and the trust token it is started with
//! - Window registry, activation order, and persisted geometry
//! - Optional splash window while the first window gets ready
//! - The control-plane router windows talk to
//! - Lifecycle (boot, restart, quit) and single-instance arbitration
//!
//! The windowing backend plugs in through the traits in [`surface`].

pub mod instance;
pub mod lifecycle;
pub mod router;
pub mod splash;
pub mod surface;
pub mod trust;
pub mod window_state;
pub mod windows;
pub mod worker;

#[cfg(test)]
pub mod testing;

pub use instance::{acquire, InstanceGuard, InstanceRole};
pub use lifecycle::{
    Feature, HostController, HostEvent, HostServices, LaunchOptions, LaunchRequest,
};
pub use router::{ChannelHandler, CommandRouter, HostAction};
pub use surface::{
    CredentialStore, DisplayProvider, ShellServices, SystemShell, WindowFactory, WindowOptions,
    WindowRole, WindowSurface,
};
pub use trust::{worker_origin, SessionCookie, TrustToken, TrustTokenService};
pub use worker::{filter_forwarded_args, InProcessWorker, WorkerSupervisor};
