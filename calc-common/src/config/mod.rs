//! Configuration system for the calculator verifier.
//!
//! This module provides:
//! - Environment variable parsing with type safety
//! - Optional TOML config file
//! - Source tracking for debugging (`calc-verify config`)
//! - Validation before any request is made

pub mod env;
pub mod settings;
pub mod source;
pub mod validate;

pub use env::{EnvError, EnvParser};
pub use settings::{FileConfig, VerifierConfig};
pub use source::{ConfigSource, Sourced};
pub use validate::{ConfigWarning, Severity, validate_config};

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
