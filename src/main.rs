//! dashio - DashIO device host
//!
//! Serves one configured device to dashboards over TCP.

use dashio_protocol::{ControlType, Encoder, ParsedMessage};
use dashio_server::{Config, DeviceHandler, Server, ServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Acknowledges dashboard changes to value controls by echoing the new value.
fn echo_control(message: &ParsedMessage, encoder: &Encoder) -> Vec<String> {
    tracing::info!("Control message: {}", message);

    let reply = match message.control_type {
        ControlType::Slider => message.payload1.parse().ok().map(|v| encoder.slider(&message.id, v)),
        ControlType::Knob => message.payload1.parse().ok().map(|v| encoder.knob(&message.id, v)),
        ControlType::Selector => message
            .payload1
            .parse()
            .ok()
            .map(|v| encoder.selector(&message.id, v)),
        ControlType::TextBox => Some(encoder.text_box(&message.id, &message.payload1)),
        _ => None,
    };
    reply.into_iter().collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration (from file if DASHIO_CONFIG is set, then env overrides)
    let config = match Config::load() {
        Ok(c) => {
            if let Ok(path) = std::env::var("DASHIO_CONFIG") {
                tracing::info!("Loaded config from {}", path);
            }
            c
        }
        Err(e) => {
            // If a config file was explicitly specified, fail on error
            if std::env::var("DASHIO_CONFIG").is_ok() {
                tracing::error!("Failed to load config: {}", e);
                return Err(e.into());
            }
            tracing::info!("Using default configuration");
            Config::default()
        }
    };

    tracing::info!("Starting dashio device host");
    tracing::info!("  Bind address: {}", config.network.bind_addr);
    tracing::info!(
        "  Device: {} ({}, {})",
        config.device.device_id,
        config.device.device_type,
        config.device.name
    );
    tracing::info!("  Controls: {}", config.device.controls.len());

    let handler = DeviceHandler::new(&config.device).with_callback(Arc::new(echo_control));
    let server = Arc::new(Server::new(
        ServerConfig::from(&config.network),
        handler,
    ));

    // Spawn shutdown signal handler
    let shutdown_server = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown_server.publish(shutdown_server.handler().encoder().offline());
        shutdown_server.shutdown();
    });

    // Run server (blocks until shutdown)
    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
