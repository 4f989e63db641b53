//! # dashio-protocol
//!
//! Line protocol implementation for DashIO devices and dashboards.
//!
//! This crate provides:
//! - Incremental, character-at-a-time message decoding with resync
//! - The control type registry (wire token <-> [`ControlType`])
//! - Message builders for every control kind
//! - Structured configuration payloads and their writer
//! - Pub/sub topic naming

pub mod codec;
pub mod config;
pub mod control;
pub mod encoder;
pub mod error;
pub mod payload;
pub mod topic;

pub use codec::{DecodeStatus, Decoder, ParsedMessage};
pub use config::ConfigPayload;
pub use control::ControlType;
pub use encoder::Encoder;
pub use error::ProtocolError;
pub use payload::{PayloadValue, StructuredPayloadWriter};
pub use topic::TopicKind;

/// Separates fields within a message.
pub const FIELD_SEPARATOR: char = '\t';

/// Terminates a message.
pub const TERMINATOR: char = '\n';

/// Device id placeholder used when a `WHO` query arrives without one.
pub const UNKNOWN_DEVICE_ID: &str = "UNKNOWN";

/// Recommended maximum length of a textual field. Not enforced.
pub const MAX_STRING_LEN: usize = 64;

/// Recommended maximum length of a device name. Not enforced.
pub const MAX_DEVICE_NAME_LEN: usize = 32;

/// Recommended maximum length of a device type. Not enforced.
pub const MAX_DEVICE_TYPE_LEN: usize = 32;

/// Default TCP port for DashIO devices.
pub const DEFAULT_PORT: u16 = 5650;
