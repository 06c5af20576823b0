//! Prober trait abstraction.
//!
//! A prober answers one question: is this port reachable right now? The
//! range scanner only depends on this trait, which keeps the worker pool
//! testable without a network.

use crate::types::Port;
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

/// Trait for single-port reachability checks.
///
/// Implementations must collapse every failure (refused, timed out,
/// unreachable) into `false` and must not retry.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Short protocol name used in logs, e.g. `"tcp"`.
    fn protocol(&self) -> &'static str;

    /// Upper bound on the time a single probe may take.
    fn timeout(&self) -> Duration;

    /// Return `true` iff `target:port` accepted a connection within the timeout.
    async fn probe(&self, target: IpAddr, port: Port) -> bool;
}

/// A shared prober for dynamic dispatch.
pub type SharedProber = Arc<dyn Prober>;
