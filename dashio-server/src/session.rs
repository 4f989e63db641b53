//! Session management.

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A dashboard connection.
pub struct Session {
    /// Unique session ID.
    pub id: String,

    /// Remote address.
    pub remote_addr: SocketAddr,

    /// Set once the dashboard has sent CONNECT.
    connected: AtomicBool,

    /// Messages decoded on this connection.
    message_count: AtomicU64,

    /// Messages ignored and oversize input discarded.
    dropped_count: AtomicU64,

    /// Decoder resynchronizations.
    resync_count: AtomicU64,

    created_at: Instant,
    last_activity: Mutex<Instant>,
}

impl Session {
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            remote_addr,
            connected: AtomicBool::new(false),
            message_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            resync_count: AtomicU64::new(0),
            created_at: Instant::now(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    /// Returns whether the dashboard has completed CONNECT.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Records a decoded message.
    pub fn record_message(&self) {
        self.message_count.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    pub fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds resynchronizations reported by the connection's decoder.
    pub fn record_resyncs(&self, n: u64) {
        if n > 0 {
            self.resync_count.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Marks the session active without counting a message.
    pub fn touch(&self) {
        *self.last_activity.lock() = Instant::now();
    }

    pub fn message_count(&self) -> u64 {
        self.message_count.load(Ordering::Relaxed)
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    pub fn resync_count(&self) -> u64 {
        self.resync_count.load(Ordering::Relaxed)
    }

    /// Returns the time since last activity.
    pub fn idle_duration(&self) -> Duration {
        self.last_activity.lock().elapsed()
    }

    /// Returns the session age.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("remote_addr", &self.remote_addr)
            .field("connected", &self.is_connected())
            .field("messages", &self.message_count())
            .field("dropped", &self.dropped_count())
            .field("resynced", &self.resync_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn session() -> Session {
        Session::new(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 40000))
    }

    #[test]
    fn test_new_session() {
        let session = session();
        assert!(!session.is_connected());
        assert_eq!(session.message_count(), 0);
        assert!(!session.id.is_empty());
        assert_ne!(session.id, self::session().id);
    }

    #[test]
    fn test_counters() {
        let session = session();
        session.record_message();
        session.record_message();
        session.record_dropped();
        session.record_resyncs(3);
        session.record_resyncs(0);

        assert_eq!(session.message_count(), 2);
        assert_eq!(session.dropped_count(), 1);
        assert_eq!(session.resync_count(), 3);
        assert!(session.idle_duration() <= session.age());
    }

    #[test]
    fn test_connected_flag() {
        let session = session();
        session.set_connected(true);
        assert!(session.is_connected());
        assert!(format!("{:?}", session).contains("connected: true"));
    }
}
