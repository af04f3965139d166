//! Engine Configuration Module
//!
//! Provides the empirical constants used by every engine, loaded from TOML
//! files so they can be recalibrated per project without code changes.
//!
//! ## Loading Order
//!
//! 1. `BORE_CONFIG` environment variable (path to TOML file)
//! 2. `bore_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(EngineConfig::load());
//!
//! // Anywhere in the codebase:
//! let radius = config::get().collision.borehole_radius_ft;
//! ```
//!
//! Library callers that never call `init()` get the built-in defaults.

mod engine_config;
pub mod defaults;
pub mod validation;

pub use engine_config::*;

use std::sync::OnceLock;

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// Later calls are ignored with a warning; the first config wins.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global engine configuration.
///
/// Falls back to built-in defaults when `init()` was never called.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}
