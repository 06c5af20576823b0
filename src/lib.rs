//! # port-exporter - Open TCP ports as Prometheus metrics
//!
//! Periodically scans a configured set of hosts across a TCP port range and
//! publishes a `port_opened` gauge for every open port, labelled with the
//! host address, the port and the user-defined labels of the host.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use port_exporter::scanner::{RangeScanner, TcpConnectProber};
//! use port_exporter::types::PortRange;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let prober = Arc::new(TcpConnectProber::new(Duration::from_secs(2)));
//!     let scanner = RangeScanner::new(prober);
//!
//!     let open = scanner.scan_host("192.168.1.1", PortRange::full(), 1000).await;
//!     println!("open ports: {:?}", open);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, port ranges, instances and host resolution
//! - [`scanner`] - Single-port probing and the bounded worker pool
//! - [`labels`] - The frozen label schema and per-sample label maps
//! - [`metrics`] - The `port_opened` gauge and text exposition
//! - [`collector`] - The perpetual scan cycle
//! - [`config`] - Instances file loading and scan settings
//! - [`server`] - The `/metrics` HTTP endpoint
//! - [`error`] - Error types

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod scanner;
pub mod server;
pub mod types;

pub use collector::{Collector, CycleReport};
pub use config::{load_instances, ScanSettings};
pub use error::{CollectorError, ConfigError, MetricsError};
pub use labels::LabelSchema;
pub use scanner::{Prober, RangeScanner, TcpConnectProber};
pub use types::{Instance, Port, PortRange};
