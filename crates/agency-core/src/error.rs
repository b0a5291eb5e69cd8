//! Top-level error type for client entry points.

use thiserror::Error;

use crate::traits::{AuthError, TransportError};

/// Error surfaced from client entry points.
#[derive(Debug, Error)]
pub enum AgencyError {
    /// Invalid configuration, detected before any network call.
    #[error("Configuration error: {0}")]
    Config(String),
    /// Authentication failed while acquiring call metadata.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// Transport-level failure.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
