//! Protocol error types.
//!
//! Malformed wire input never produces an error: the decoder reports it as a
//! [`DecodeStatus`](crate::DecodeStatus) and resynchronizes. Errors are only
//! raised when a caller asks a builder for something that cannot be put on
//! the wire.

use crate::control::ControlType;
use thiserror::Error;

/// Errors raised by message builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("control type {0:?} has no wire token")]
    NoWireToken(ControlType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::NoWireToken(ControlType::PushToken);
        assert!(err.to_string().contains("PushToken"));
        assert!(err.to_string().contains("wire token"));

        let err = ProtocolError::NoWireToken(ControlType::Unknown);
        assert!(err.to_string().contains("Unknown"));
    }
}
