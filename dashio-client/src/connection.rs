//! Connection management.

use crate::error::ClientError;
use dashio_protocol::{encoder, Decoder, ParsedMessage};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Default read buffer size (8 KiB).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Minimum read buffer size (1 KiB).
pub const MIN_READ_BUFFER_SIZE: usize = 1024;

/// Maximum read buffer size (1 MiB).
pub const MAX_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Device host address.
    pub addr: SocketAddr,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// How long to wait for the next device message.
    pub read_timeout: Duration,
    /// Read buffer size for socket reads.
    pub read_buffer_size: usize,
}

impl ConnectionConfig {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.clamp(MIN_READ_BUFFER_SIZE, MAX_READ_BUFFER_SIZE);
        self
    }
}

/// Read half with its decoder. Kept under one lock so bytes taken from the
/// socket are decoded and queued without another await.
struct Inbound {
    reader: Option<OwnedReadHalf>,
    decoder: Decoder,
    /// Messages decoded but not yet returned.
    queue: VecDeque<ParsedMessage>,
}

/// A dashboard connection to a DashIO device host.
pub struct Connection {
    config: ConnectionConfig,
    writer: Mutex<Option<OwnedWriteHalf>>,
    inbound: Mutex<Inbound>,
    connected: AtomicBool,
}

impl Connection {
    /// Creates a new connection (not yet connected).
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            writer: Mutex::new(None),
            inbound: Mutex::new(Inbound {
                reader: None,
                decoder: Decoder::new(),
                queue: VecDeque::new(),
            }),
            connected: AtomicBool::new(false),
        }
    }

    /// Connects to the device host.
    pub async fn connect(&self) -> Result<(), ClientError> {
        tracing::debug!("Connecting to {}...", self.config.addr);

        let stream = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect(self.config.addr),
        )
        .await
        .map_err(|_| {
            tracing::debug!("Connection timeout");
            ClientError::Timeout
        })?
        .map_err(|e| {
            tracing::debug!("Connection failed: {}", e);
            ClientError::Io(e)
        })?;

        stream.set_nodelay(true).ok();

        let (read_half, write_half) = stream.into_split();
        *self.writer.lock().await = Some(write_half);
        {
            let mut inbound = self.inbound.lock().await;
            inbound.reader = Some(read_half);
            inbound.decoder.reset();
            inbound.queue.clear();
        }
        self.connected.store(true, Ordering::SeqCst);

        tracing::debug!("Connected to {}", self.config.addr);
        Ok(())
    }

    /// Returns whether the connection is established.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    pub fn addr(&self) -> SocketAddr {
        self.config.addr
    }

    /// Writes one encoded line to the device host.
    pub async fn send(&self, line: &str) -> Result<(), ClientError> {
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }

        tracing::trace!("Sending {:?}", line);
        let mut writer_guard = self.writer.lock().await;
        let writer = writer_guard.as_mut().ok_or(ClientError::NotConnected)?;
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Broadcasts a discovery request.
    pub async fn who(&self) -> Result<(), ClientError> {
        self.send(&encoder::who_request()).await
    }

    /// Asks a device to accept this dashboard.
    pub async fn connect_device(&self, device_id: &str) -> Result<(), ClientError> {
        self.send(&encoder::connect_request(device_id)).await
    }

    /// Asks a device for its configuration.
    pub async fn request_config(&self, device_id: &str) -> Result<(), ClientError> {
        self.send(&encoder::config_request(device_id)).await
    }

    /// Asks a device for the current value of every control.
    pub async fn request_status(&self, device_id: &str) -> Result<(), ClientError> {
        self.send(&encoder::status_request(device_id)).await
    }

    /// Returns the next decoded message, waiting up to the configured read
    /// timeout.
    pub async fn next_message(&self) -> Result<ParsedMessage, ClientError> {
        self.next_message_within(self.config.read_timeout).await
    }

    /// Returns the next decoded message, waiting up to `timeout`.
    pub async fn next_message_within(
        &self,
        timeout: Duration,
    ) -> Result<ParsedMessage, ClientError> {
        tokio::time::timeout(timeout, self.read_until_message())
            .await
            .map_err(|_| {
                tracing::debug!("Read timeout");
                ClientError::Timeout
            })?
    }

    /// Collects messages until none arrives for `quiet` or the device host
    /// closes the connection.
    pub async fn collect(&self, quiet: Duration) -> Result<Vec<ParsedMessage>, ClientError> {
        let mut messages = Vec::new();
        loop {
            match self.next_message_within(quiet).await {
                Ok(message) => messages.push(message),
                Err(ClientError::Timeout | ClientError::ConnectionClosed) => return Ok(messages),
                Err(e) => return Err(e),
            }
        }
    }

    /// The only await after taking the lock is the socket read, which
    /// consumes nothing when cancelled, so a timeout never loses input.
    async fn read_until_message(&self) -> Result<ParsedMessage, ClientError> {
        let mut inbound = self.inbound.lock().await;
        if let Some(message) = inbound.queue.pop_front() {
            return Ok(message);
        }
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }

        let mut buf = vec![0u8; self.config.read_buffer_size];
        loop {
            let reader = inbound.reader.as_mut().ok_or(ClientError::NotConnected)?;
            let n = reader.read(&mut buf).await?;

            if n == 0 {
                tracing::debug!("Connection closed by device host");
                self.connected.store(false, Ordering::SeqCst);
                return Err(ClientError::ConnectionClosed);
            }

            let Inbound { decoder, queue, .. } = &mut *inbound;
            let messages = decoder.feed_bytes(&buf[..n]);
            tracing::trace!("Read {} bytes, decoded {} messages", n, messages.len());

            queue.extend(messages);
            if let Some(message) = queue.pop_front() {
                return Ok(message);
            }
        }
    }

    /// Closes the connection.
    pub async fn close(&self) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(mut writer) = self.writer.lock().await.take() {
            if let Err(e) = writer.shutdown().await {
                tracing::debug!("Shutdown error: {}", e);
            }
        }
        self.inbound.lock().await.reader.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashio_protocol::{ControlType, Encoder};
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    #[test]
    fn test_config_builders() {
        let addr: SocketAddr = "127.0.0.1:5650".parse().unwrap();
        let config = ConnectionConfig::new(addr)
            .with_connect_timeout(Duration::from_secs(1))
            .with_read_timeout(Duration::from_millis(500))
            .with_read_buffer_size(1);
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_millis(500));
        assert_eq!(config.read_buffer_size, MIN_READ_BUFFER_SIZE);

        let config = ConnectionConfig::new(addr).with_read_buffer_size(usize::MAX);
        assert_eq!(config.read_buffer_size, MAX_READ_BUFFER_SIZE);
    }

    #[test]
    fn test_send_before_connect() {
        let conn = Connection::new(ConnectionConfig::new("127.0.0.1:1".parse().unwrap()));
        assert!(!conn.is_connected());
        assert!(matches!(
            tokio_test::block_on(conn.who()),
            Err(ClientError::NotConnected)
        ));
        assert!(matches!(
            tokio_test::block_on(conn.next_message()),
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_request_and_fragmented_replies() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let device = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read, mut write) = stream.into_split();
            let mut reader = BufReader::new(read);
            let mut request = String::new();
            reader.read_line(&mut request).await.unwrap();

            let encoder = Encoder::new("DEV", "Sensor", "Porch");
            let reply = format!("{}{}", encoder.who(), encoder.slider("S1", 7));
            let (first, rest) = reply.split_at(5);
            write.write_all(first.as_bytes()).await.unwrap();
            write.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
            write.write_all(rest.as_bytes()).await.unwrap();
            request
        });

        let conn = Connection::new(
            ConnectionConfig::new(addr).with_read_timeout(Duration::from_secs(5)),
        );
        conn.connect().await.unwrap();
        conn.who().await.unwrap();

        let who = conn.next_message().await.unwrap();
        assert_eq!(who.device_id, "DEV");
        assert_eq!(who.control_type, ControlType::Who);
        assert_eq!(who.id, "Sensor");
        assert_eq!(who.payload1, "Porch");

        let slider = conn.next_message().await.unwrap();
        assert_eq!(slider.control_type, ControlType::Slider);
        assert_eq!(slider.payload1, "7");

        assert_eq!(device.await.unwrap(), "\tWHO\n");
    }

    #[tokio::test]
    async fn test_timeout_keeps_partial_message() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (resume_tx, resume_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"\tDEV\tKNOB\tK1").await.unwrap();
            resume_rx.await.unwrap();
            stream.write_all(b"\t3\n").await.unwrap();
            stream.write_all(b"\tDEV\tKNOB\tK2\t4\n").await.unwrap();
        });

        let conn = Connection::new(ConnectionConfig::new(addr));
        conn.connect().await.unwrap();

        let result = conn.next_message_within(Duration::from_millis(100)).await;
        assert!(matches!(result, Err(ClientError::Timeout)));
        resume_tx.send(()).unwrap();

        let first = conn.next_message_within(Duration::from_secs(5)).await.unwrap();
        assert_eq!(first.control_type, ControlType::Knob);
        assert_eq!(first.id, "K1");
        assert_eq!(first.payload1, "3");

        let second = conn.next_message_within(Duration::from_secs(5)).await.unwrap();
        assert_eq!(second.id, "K2");
    }

    #[tokio::test]
    async fn test_collect_and_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let encoder = Encoder::new("DEV", "Sensor", "Porch");
            let lines = [encoder.knob("K1", 1), encoder.knob("K2", 2)].concat();
            stream.write_all(lines.as_bytes()).await.unwrap();
        });

        let conn = Connection::new(ConnectionConfig::new(addr));
        conn.connect().await.unwrap();

        let messages = conn.collect(Duration::from_millis(500)).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| m.control_type == ControlType::Knob));
        assert_eq!(messages[1].id, "K2");

        conn.close().await;
        assert!(!conn.is_connected());
    }
}
