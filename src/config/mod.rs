//! Configuration module
//!
//! Handles:
//! - User configuration (`<config dir>/gitdeck/config.toml`)
//! - `GITDECK_*` environment overrides
//! - Log file location

mod settings;

pub use settings::*;
