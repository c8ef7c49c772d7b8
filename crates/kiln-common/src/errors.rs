use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("clipboard error: {0}")]
    ClipboardError(String),

    #[error("path error: {0}")]
    PathError(String),

    #[error("shell open error: {0}")]
    OpenError(String),

    #[error("not supported: {0}")]
    NotSupported(String),
}

/// Failures that abort the launch. The binary exits non-zero on these.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker exited before reporting a port (exit code {code:?})")]
    WorkerExited { code: Option<i32> },

    #[error("worker finished without publishing a listening address")]
    NoPortReported,

    #[error("worker did not report a port within {0} ms")]
    Timeout(u64),

    #[error("no in-process worker is linked into this host")]
    NoInProcessWorker,

    #[error("feature '{name}' failed to start: {reason}")]
    Feature { name: String, reason: String },

    #[error("failed to bind trust token: {0}")]
    TrustBinding(String),
}

/// The requested resource path does not resolve to a real location.
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve resource path {path}: {source}")]
pub struct ResolutionError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Signal delivery to the worker's process group failed for a reason other
/// than the group already being gone.
#[derive(Debug, thiserror::Error)]
#[error("failed to signal worker process group {pgid}: {reason}")]
pub struct SignalError {
    pub pgid: i32,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to read state store {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write state store {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("state store serialization error: {0}")]
    Serialize(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ipc error: {0}")]
    Ipc(String),

    #[error("window error: {0}")]
    Window(String),

    #[error("{0}")]
    Other(String),
}

impl HostError {
    /// Whether this failure must terminate the host process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HostError::Startup(_) | HostError::Signal(_))
    }
}
