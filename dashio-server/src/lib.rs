//! # dashio-server
//!
//! TCP transport host for a DashIO device.
//!
//! This crate provides:
//! - TCP connection handling with async I/O
//! - One protocol decoder per connection
//! - Replies to discovery, connect, configuration and status requests
//! - Fan-out of device updates to every connected dashboard
//! - YAML/environment configuration

pub mod config;
pub mod error;
pub mod handler;
pub mod server;
pub mod session;

pub use config::{Config, ConfigError, DeviceConfig, NetworkConfig};
pub use error::ServerError;
pub use handler::{ControlCallback, DeviceHandler};
pub use server::{Server, ServerConfig, ServerStats};
pub use session::Session;
