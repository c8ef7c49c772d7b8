pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use errors::{
    ConfigError, HostError, PersistenceError, PlatformError, ResolutionError, SignalError,
    StartupError,
};
pub use events::{AppEvent, EventBus};
pub use id::{new_id, CorrelationIds, WindowId};
pub use types::{AppState, ChromeMode, Color, Display, Point, Rect};

pub type Result<T> = std::result::Result<T, HostError>;
