//! Error types for core module
//!
//! Provides custom error types for configuration persistence.

use thiserror::Error;

/// Errors that can occur in the core module
#[derive(Error, Debug)]
pub enum CoreError {
    /// Config file I/O error
    #[error("Config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Config serialization/deserialization error
    #[error("Config serialization error: {0}")]
    ConfigSerialization(#[from] serde_json::Error),

    /// No platform config directory could be determined
    #[error("No config directory available on this platform")]
    NoConfigDir,
}

/// Result type alias for core operations
pub type CoreResult<T> = Result<T, CoreError>;
