//! Operational scan settings.

use crate::error::{ConfigError, ConfigResult};
use crate::types::PortRange;
use std::time::Duration;

/// Parameters that shape every scan cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// Ports probed on every instance.
    pub ports: PortRange,
    /// Number of concurrent probe workers per instance scan.
    pub workers: usize,
    /// Connect timeout for a single probe.
    pub probe_timeout: Duration,
    /// Pause between the end of one cycle and the start of the next.
    pub cycle_interval: Duration,
}

impl ScanSettings {
    pub const DEFAULT_WORKERS: usize = 1000;
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
    pub const DEFAULT_CYCLE_INTERVAL: Duration = Duration::from_secs(5);

    /// Set the port range.
    pub fn with_ports(mut self, ports: PortRange) -> Self {
        self.ports = ports;
        self
    }

    /// Set the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the pause between cycles.
    pub fn with_cycle_interval(mut self, interval: Duration) -> Self {
        self.cycle_interval = interval;
        self
    }

    /// Reject settings that would make every scan degenerate.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidSettings(
                "worker count must be at least 1".to_string(),
            ));
        }

        if self.ports.is_empty() {
            return Err(ConfigError::InvalidSettings(format!(
                "port range {} is empty",
                self.ports
            )));
        }

        if self.probe_timeout.is_zero() {
            return Err(ConfigError::InvalidSettings(
                "probe timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            ports: PortRange::full(),
            workers: Self::DEFAULT_WORKERS,
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
            cycle_interval: Self::DEFAULT_CYCLE_INTERVAL,
        }
    }
}
