// src/config/mod.rs

//! Search configuration for dagsched.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//!
//! The processor count is deliberately not part of the file; it is given on
//! the command line next to the graph.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, OutputSection, RawConfigFile, SearchSection};
