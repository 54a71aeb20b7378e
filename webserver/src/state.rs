//! Webserver state management

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

/// Process-wide server state shared by every handler
#[derive(Debug)]
pub struct WebServerState {
    pub bind_address: SocketAddr,
    pub is_running: Arc<AtomicBool>,
    pub requests_served: Arc<AtomicU64>,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            is_running: Arc::new(AtomicBool::new(true)),
            requests_served: Arc::new(AtomicU64::new(0)),
            server_start_time: Instant::now(),
        }
    }

    /// Check if the server is running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Set running state
    pub fn set_running(&self, running: bool) {
        self.is_running.store(running, Ordering::Relaxed);
    }

    /// Get server uptime in seconds
    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    /// Count one handled API request, returning the new total
    pub fn record_request(&self) -> u64 {
        self.requests_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get_requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }
}
