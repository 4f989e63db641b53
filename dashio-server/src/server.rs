//! TCP server implementation.

use crate::config::NetworkConfig;
use crate::error::ServerError;
use crate::handler::DeviceHandler;
use crate::session::Session;
use dashio_protocol::Decoder;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Longest field accepted before the connection's decoder is reset.
    pub max_field_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&NetworkConfig::default())
    }
}

impl From<&NetworkConfig> for ServerConfig {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            bind_addr: network.bind_addr,
            idle_timeout: network.idle_timeout(),
            max_connections: network.max_connections,
            max_field_bytes: network.max_field_bytes,
        }
    }
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_max_field_bytes(mut self, max: usize) -> Self {
        self.max_field_bytes = max;
        self
    }
}

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub messages_total: AtomicU64,
    pub published_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// Default capacity of the device update channel.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Read buffer size per connection.
const READ_BUFFER_SIZE: usize = 8192;

/// TCP transport host for one device.
pub struct Server {
    config: ServerConfig,
    handler: Arc<DeviceHandler>,
    stats: Arc<ServerStats>,
    shutdown: broadcast::Sender<()>,
    updates: broadcast::Sender<String>,
    running: AtomicBool,
}

impl Server {
    pub fn new(config: ServerConfig, handler: DeviceHandler) -> Self {
        let (shutdown, _) = broadcast::channel(1);
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            config,
            handler: Arc::new(handler),
            stats: Arc::new(ServerStats::default()),
            shutdown,
            updates,
            running: AtomicBool::new(false),
        }
    }

    /// Binds the configured address and serves until shutdown.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!(
            "Device {} listening on {}",
            self.handler.encoder().device_id(),
            listener.local_addr()?
        );

        let mut shutdown_rx = self.shutdown.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            if self.stats.connections_active.load(Ordering::Relaxed)
                                >= self.config.max_connections as u64
                            {
                                tracing::warn!("Connection limit reached, rejecting {}", addr);
                                continue;
                            }

                            self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
                            self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

                            let handler = self.handler.clone();
                            let stats = self.stats.clone();
                            let config = self.config.clone();
                            let updates = self.updates.subscribe();
                            let mut conn_shutdown = self.shutdown.subscribe();

                            tokio::spawn(async move {
                                let result = Self::handle_connection(
                                    stream,
                                    addr,
                                    handler,
                                    &stats,
                                    config,
                                    updates,
                                    &mut conn_shutdown,
                                )
                                .await;

                                if let Err(e) = result {
                                    tracing::debug!("Connection {} error: {}", addr, e);
                                    stats.errors_total.fetch_add(1, Ordering::Relaxed);
                                }

                                stats.connections_active.fetch_sub(1, Ordering::Relaxed);
                                tracing::info!("Dashboard disconnected: {}", addr);
                            });
                        }
                        Err(e) => {
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Server shutting down");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Handles a single dashboard connection.
    async fn handle_connection(
        mut stream: TcpStream,
        addr: SocketAddr,
        handler: Arc<DeviceHandler>,
        stats: &ServerStats,
        config: ServerConfig,
        mut updates: broadcast::Receiver<String>,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        tracing::info!("Dashboard connected: {}", addr);

        let session = Session::new(addr);
        let mut decoder = Decoder::new();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            tokio::select! {
                biased;

                update = updates.recv() => {
                    match update {
                        Ok(line) => {
                            tracing::trace!("[{}] Forwarding update: {:?}", addr, line);
                            stream.write_all(line.as_bytes()).await?;
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("[{}] Dashboard lagged {} updates", addr, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            return Ok(());
                        }
                    }
                }

                result = stream.read(&mut buf) => {
                    match result {
                        Ok(0) => {
                            tracing::debug!("[{}] Connection closed by dashboard", addr);
                            return Ok(());
                        }
                        Ok(n) => {
                            tracing::trace!("[{}] Received {} bytes", addr, n);
                            session.touch();

                            let resyncs_before = decoder.resync_count();
                            let messages = decoder.feed_bytes(&buf[..n]);
                            session.record_resyncs(decoder.resync_count() - resyncs_before);

                            if decoder.buffered() > config.max_field_bytes {
                                tracing::warn!(
                                    "[{}] Field exceeds {} bytes, discarding input",
                                    addr,
                                    config.max_field_bytes
                                );
                                decoder.reset();
                                session.record_dropped();
                            }

                            for message in messages {
                                tracing::debug!("[{}] Received: {}", addr, message);
                                stats.messages_total.fetch_add(1, Ordering::Relaxed);

                                for reply in handler.handle(&session, &message) {
                                    stream.write_all(reply.as_bytes()).await?;
                                }
                            }
                        }
                        Err(e) => {
                            tracing::debug!("[{}] Read error: {}", addr, e);
                            return Err(ServerError::Io(e));
                        }
                    }
                }

                _ = tokio::time::sleep(config.idle_timeout) => {
                    if session.idle_duration() > config.idle_timeout {
                        tracing::debug!("[{}] Idle timeout", addr);
                        return Ok(());
                    }
                }

                _ = shutdown.recv() => {
                    tracing::debug!("[{}] Shutdown signal received", addr);
                    return Err(ServerError::ShuttingDown);
                }
            }
        }
    }

    /// Sends a device update to every connected dashboard and keeps it as
    /// the control's current value for later status requests. Returns the
    /// number of dashboards it was sent to.
    pub fn publish(&self, line: impl Into<String>) -> usize {
        let line = line.into();
        self.handler.retain(&line);
        self.stats.published_total.fetch_add(1, Ordering::Relaxed);
        self.updates.send(line).unwrap_or(0)
    }

    pub fn handler(&self) -> &DeviceHandler {
        &self.handler
    }

    /// Initiates server shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(());
    }

    /// Returns whether the server is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }
}
