// src/config/mod.rs

//! Configuration loading and validation for chefrunner.
//!
//! - `model.rs` holds the TOML-backed data model.
//! - `loader.rs` reads a file from disk (or falls back to defaults).
//! - `validate.rs` turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, DispatcherConfig, LogsConfig, RawConfigFile, RawDispatcherConfig, RunnerConfig,
};
