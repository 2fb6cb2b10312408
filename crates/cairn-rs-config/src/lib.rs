//! Configuration models and loading.
//!
//! This crate owns the Cairn config schema, validation, environment overlay,
//! and the precedence rules used to resolve every tunable at call time.

mod error;
mod loader;
mod model;
mod resolve;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Environment variable names consulted by the overlay.
pub use loader::env;
/// Configuration schema models.
pub use model::*;
/// Precedence helpers for per-call settings.
pub use resolve::{resolve_setting, resolve_with_fallback};
