//! TCP connect prober.
//!
//! Performs a full TCP handshake using the operating system's socket API and
//! closes the connection immediately. No data is exchanged and no elevated
//! privileges are required.

use crate::scanner::traits::Prober;
use crate::types::Port;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect prober with a fixed per-connection timeout.
#[derive(Debug, Clone)]
pub struct TcpConnectProber {
    timeout: Duration,
}

impl TcpConnectProber {
    /// Create a new prober.
    ///
    /// # Arguments
    /// * `timeout` - Connection timeout per port
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnectProber {
    fn default() -> Self {
        Self::new(crate::config::ScanSettings::DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl Prober for TcpConnectProber {
    fn protocol(&self) -> &'static str {
        "tcp"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn probe(&self, target: IpAddr, port: Port) -> bool {
        let addr = SocketAddr::new(target, port.as_u16());

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(_)) | Err(_) => false,
        }
    }
}
