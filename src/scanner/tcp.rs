use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};

use crate::scanner::results::ProbeOutcome;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// A single-port check. Implementations must not fail: every error is an
/// outcome.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome;
}

/// Full-handshake connect probe with a fixed timeout and no retries.
#[derive(Debug, Clone, Copy)]
pub struct ConnectProbe {
    timeout: Duration,
}

impl ConnectProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ConnectProbe {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Prober for ConnectProbe {
    async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
        connect_scan(addr, self.timeout).await
    }
}

pub async fn connect_scan(addr: SocketAddr, duration: Duration) -> ProbeOutcome {
    match timeout(duration, TcpStream::connect(addr)).await {
        // stream dropped here, closing the connection
        Ok(Ok(_stream)) => ProbeOutcome::Open,
        Ok(Err(e)) => ProbeOutcome::from_io_error(&e),
        Err(_) => ProbeOutcome::TimedOut,
    }
}
