//! Command-line interface definitions.
//!
//! Uses `clap` derive macros for declarative argument parsing. Every option
//! can also be supplied through a `PORT_EXPORTER_*` environment variable.

use crate::config::ScanSettings;
use crate::types::PortRange;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Periodically scans configured hosts and exposes their open TCP ports as
/// Prometheus metrics.
#[derive(Parser, Debug)]
#[command(name = "port-exporter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prometheus exporter for open TCP ports", long_about = None)]
pub struct Args {
    /// JSON file listing the instances to scan, re-read every cycle
    #[arg(value_name = "INSTANCES", env = "PORT_EXPORTER_INSTANCES")]
    pub instances: PathBuf,

    /// Address the metrics endpoint listens on
    #[arg(short, long, default_value = "0.0.0.0:20000", env = "PORT_EXPORTER_LISTEN")]
    pub listen: SocketAddr,

    /// Ports to scan on every instance (e.g. "1-65535", "1-1024", "22")
    #[arg(short, long, default_value = "1-65535", env = "PORT_EXPORTER_PORTS")]
    pub ports: PortRange,

    /// Maximum number of concurrent probes per instance
    #[arg(short, long, default_value_t = ScanSettings::DEFAULT_WORKERS, env = "PORT_EXPORTER_WORKERS")]
    pub workers: usize,

    /// Connection timeout in milliseconds
    #[arg(short, long, default_value = "2000", env = "PORT_EXPORTER_TIMEOUT")]
    pub timeout: u64,

    /// Seconds to wait between scan cycles
    #[arg(short, long, default_value = "5", env = "PORT_EXPORTER_INTERVAL")]
    pub interval: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Scan settings described by these arguments.
    pub fn settings(&self) -> ScanSettings {
        ScanSettings::default()
            .with_ports(self.ports)
            .with_workers(self.workers)
            .with_probe_timeout(Duration::from_millis(self.timeout))
            .with_cycle_interval(Duration::from_secs(self.interval))
    }
}
