//! Timeline Configuration Module
//!
//! Ingestion paths, dashboard defaults, color tables and server settings,
//! loaded from a TOML file.
//!
//! ## Loading Order
//!
//! 1. `TIMELINE_CONFIG` environment variable (path to TOML file)
//! 2. `timeline_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(TimelineConfig::load());
//!
//! let marker = &config::get().dashboard.unknown_pm;
//! ```

mod timeline_config;
pub mod defaults;
pub mod validation;

pub use timeline_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static TIMELINE_CONFIG: OnceLock<TimelineConfig> = OnceLock::new();

/// Install the global configuration. Later calls are ignored with a warning.
pub fn init(config: TimelineConfig) {
    if TIMELINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Global configuration, or the built-in defaults when `init()` was never
/// called (library use and tests).
pub fn get() -> &'static TimelineConfig {
    TIMELINE_CONFIG.get_or_init(TimelineConfig::default)
}
