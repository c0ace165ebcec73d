//! Error types
//!
//! Only construction and initialization can fail. Once running, the
//! simulation guards itself with plain checks and never returns errors.

use thiserror::Error;

/// Settings loading / validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Engine lifecycle errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No render surface available")]
    MissingSurface,

    #[error("Container has no usable size ({width}x{height})")]
    EmptyContainer { width: f32, height: f32 },

    #[error("Engine has been disposed")]
    Disposed,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
