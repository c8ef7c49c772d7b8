use std::path::PathBuf;

use clap::Parser;
use kiln_core::LaunchRequest;

/// Kiln: desktop host for a web workbench served by a local worker.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about)]
pub struct Args {
    /// Folder or file to open a workspace on.
    pub path: Option<String>,

    /// Additional arguments passed through to the worker.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
    pub passthrough: Vec<String>,

    /// Directory holding window state and the instance socket.
    #[arg(long)]
    pub user_data_dir: Option<PathBuf>,

    /// Run the worker inside this process instead of forking it.
    #[arg(long)]
    pub no_fork: bool,

    /// URL handed to the first window that accepts it.
    #[arg(long)]
    pub open_url: Option<String>,

    /// Do not show a window until the worker is ready.
    #[arg(long)]
    pub no_early_window: bool,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error, or a full directive).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Args {
    pub fn launch_request(&self) -> LaunchRequest {
        LaunchRequest {
            resource: self.path.clone(),
            open_url: self.open_url.clone(),
            cwd: std::env::current_dir().ok(),
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

/// `--log-level` accepts a bare level as shorthand for the host's own crates.
pub fn log_directive(level: &str) -> String {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => format!("kiln={level}"),
        other => other.to_string(),
    }
}
