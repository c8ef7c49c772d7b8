mod app_state;
mod cli;

use kiln_config::toml_loader::ConfigSource;
use kiln_config::KilnConfig;
use kiln_core::{filter_forwarded_args, InstanceRole, LaunchOptions};
use kiln_platform::UserDataDir;
use tracing_subscriber::EnvFilter;
use winit::event_loop::EventLoop;

const DEFAULT_LOG_DIRECTIVE: &str = "kiln=info";

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        eprintln!("\n--- Kiln crashed ---");
        eprintln!("Re-run with --log-level debug and include the output when reporting this.");
        eprintln!("--------------------\n");

        default_hook(info);
    }));
}

/// `RUST_LOG` wins, then `--log-level`, then the config file.
fn init_logging(override_level: Option<&str>, config: &KilnConfig) {
    let directive = match override_level {
        Some(level) => cli::log_directive(level),
        None => config.logging.level.directive().to_string(),
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    install_panic_hook();

    let args = cli::parse();

    // Logging depends on the config, so report config problems afterwards.
    let loaded = ConfigSource::resolve(args.config.as_deref())
        .and_then(|source| source.load())
        .and_then(|config| kiln_config::validation::validate(&config).map(|()| config));
    let (config, config_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (KilnConfig::default(), Some(e)),
    };

    init_logging(args.log_level.as_deref(), &config);
    tracing::info!("Kiln v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    let user_data_dir = match UserDataDir::resolve(args.user_data_dir.as_deref()) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!("Cannot resolve user data directory: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = kiln_platform::ensure_dirs(&user_data_dir) {
        tracing::error!("Failed to create directories: {e}");
        std::process::exit(1);
    }

    let request = args.launch_request();
    let guard = match kiln_core::acquire(&user_data_dir, &request) {
        Ok(InstanceRole::Primary(guard)) => guard,
        Ok(InstanceRole::Secondary) => {
            tracing::info!("Handed launch to the running instance");
            return;
        }
        Err(e) => {
            tracing::error!("Single-instance check failed: {e}");
            std::process::exit(1);
        }
    };

    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let launch = LaunchOptions {
        request,
        user_data_dir,
        no_early_window: args.no_early_window,
        worker_args: filter_forwarded_args(&raw_args),
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("kiln-worker")
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("Failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    let mut app = app_state::KilnApp::new(config, launch, args.no_fork, runtime, guard);

    tracing::info!("Entering event loop");
    if let Err(e) = event_loop.run_app(&mut app) {
        tracing::error!("Event loop error: {e}");
    }
    app.shutdown();

    let code = app.exit_code();
    tracing::info!(code, "Shutdown complete");
    std::process::exit(code);
}
