//! services/client/src/error.rs
//!
//! Defines the primary error type for the client binary.

use crate::config::ConfigError;
use finbuddy_core::ports::PortError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the gateway port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error building the HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Represents a terminal Input/Output error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Represents a failure while reading input lines.
    #[error("Input error: {0}")]
    Input(#[from] tokio_util::codec::LinesCodecError),
}
