// src/config/mod.rs

//! Configuration loading and validation for concurrently.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate value ranges (`validate.rs`).
//! - Merge CLI flags, file values and defaults into `Settings` (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_for_cli, load_from_path};
pub use model::{ConfigFile, OutputSection, RawConfigFile, RunSection};
pub use settings::Settings;
