// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DagschedError {
    /// The task graph is empty, cyclic, or missing a required weight.
    #[error("Invalid task graph: {0}")]
    InvalidGraph(String),

    /// Search parameters that can never produce a schedule (e.g. zero processors).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Internal misuse of the transition function. Never produced by a correct search.
    #[error("Precondition violated for task '{task}': {detail}")]
    Precondition { task: String, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DagschedError>;
