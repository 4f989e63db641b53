//! Server error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] dashio_protocol::ProtocolError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server shutting down")]
    ShuttingDown,
}

impl ServerError {
    /// Returns whether the connection that hit this error may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServerError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashio_protocol::{ControlType, ProtocolError};

    #[test]
    fn test_error_conversions() {
        let err: ServerError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("I/O error"));

        let err: ServerError = ProtocolError::NoWireToken(ControlType::Unknown).into();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("wire token"));

        assert_eq!(ServerError::ShuttingDown.to_string(), "server shutting down");
    }
}
