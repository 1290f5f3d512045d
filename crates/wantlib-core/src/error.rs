//! Error types for wantlib

use thiserror::Error;

/// Wantlib error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("platform {0:?} not supported")]
    PlatformNotSupported(String),

    #[error("invalid dependency table: {0}")]
    Table(String),

    #[error("invalid header pattern {pattern:?}: {detail}")]
    Pattern { pattern: String, detail: String },

    #[error("failed to run {tool}: {detail}")]
    Toolchain { tool: String, detail: String },
}

impl Error {
    /// Toolchain-invocation error preserving the tool's diagnostic text.
    pub fn toolchain(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::Toolchain {
            tool: tool.into(),
            detail: detail.into(),
        }
    }
}

/// Result type alias for wantlib
pub type Result<T> = std::result::Result<T, Error>;
