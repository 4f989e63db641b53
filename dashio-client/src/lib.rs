//! # dashio-client
//!
//! Dashboard-side client for DashIO devices.
//!
//! This crate provides:
//! - Async TCP connection to a device host
//! - Request helpers for discovery, connect, configuration and status
//! - Incremental decoding of device messages with read timeouts

pub mod connection;
pub mod error;

pub use connection::{Connection, ConnectionConfig};
pub use error::ClientError;
