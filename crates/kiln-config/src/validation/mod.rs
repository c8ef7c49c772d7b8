//! Configuration validation.
//!
//! Collects every problem into a single `ConfigError` so the user sees
//! all of them at once.

mod helpers;


use crate::schema::KilnConfig;
use helpers::{validate_nonzero, validate_range};
use kiln_common::{Color, ConfigError};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &KilnConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_window(&mut errors, config);
    validate_splash(&mut errors, config);
    validate_worker(&mut errors, config);
    validate_nonzero(&mut errors, "ipc.reply_timeout_ms", config.ipc.reply_timeout_ms);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_window(errors: &mut Vec<String>, config: &KilnConfig) {
    let window = &config.window;
    validate_nonzero(errors, "window.save_debounce_ms", window.save_debounce_ms);
    validate_range(errors, "window.min_width", window.min_width, 1, 16_384);
    validate_range(errors, "window.min_height", window.min_height, 1, 16_384);
    if Color::from_hex(&window.background_color).is_none() {
        errors.push(format!(
            "window.background_color = {:?} is not a #rrggbb color",
            window.background_color
        ));
    }
    if !window.entry_path.starts_with('/') {
        errors.push(format!(
            "window.entry_path = {:?} must start with '/'",
            window.entry_path
        ));
    }
}

fn validate_splash(errors: &mut Vec<String>, config: &KilnConfig) {
    let splash = &config.splash;
    if splash.min_duration_ms > splash.max_duration_ms {
        errors.push(format!(
            "splash.min_duration_ms = {} exceeds splash.max_duration_ms = {}",
            splash.min_duration_ms, splash.max_duration_ms
        ));
    }
    if let Some(width) = splash.width {
        validate_range(errors, "splash.width", width, 1, 16_384);
    }
    if let Some(height) = splash.height {
        validate_range(errors, "splash.height", height, 1, 16_384);
    }
}

fn validate_worker(errors: &mut Vec<String>, config: &KilnConfig) {
    if let Some(command) = &config.worker.command {
        if command.trim().is_empty() {
            errors.push("worker.command must not be empty".into());
        }
    }
}
