//! Scan cycle orchestration.
//!
//! [`Collector::initialize`] loads the instances once, freezes the label
//! schema and registers the gauge. [`Collector::run`] then cycles until
//! cancelled: reload instances, scan each one, clear its old samples and
//! publish the new ones, sleep.

use crate::config::{load_instances, ScanSettings};
use crate::error::{CollectorResult, MetricsResult};
use crate::labels::LabelSchema;
use crate::metrics::{MetricSink, PortGauge};
use crate::scanner::{RangeScanner, SharedProber, TcpConnectProber};
use crate::types::{Instance, Port};
use prometheus::Registry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Summary of one completed scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Instances scanned.
    pub instances: usize,
    /// Open ports published across all instances.
    pub open_ports: usize,
    /// Wall time of the cycle, excluding the pause that follows it.
    pub elapsed: Duration,
}

/// Periodic scanner publishing `port_opened` samples.
pub struct Collector {
    instances_file: PathBuf,
    settings: ScanSettings,
    schema: LabelSchema,
    gauge: PortGauge,
    scanner: RangeScanner,
}

impl Collector {
    /// Load the instances file, compute the label schema and register the
    /// gauge on `registry`.
    ///
    /// Fails if the file cannot be loaded, the settings are invalid, or a
    /// label key is not a valid Prometheus label name.
    pub fn initialize(
        instances_file: impl Into<PathBuf>,
        settings: ScanSettings,
        registry: &Registry,
    ) -> CollectorResult<Self> {
        let instances_file = instances_file.into();
        settings.validate()?;

        info!(path = %instances_file.display(), "calculating global labels");
        let instances = load_instances(&instances_file)?;
        let schema = LabelSchema::from_instances(&instances);
        info!(labels = ?schema.keys(), instances = instances.len(), "global labels frozen");

        let gauge = PortGauge::register(registry, &schema)?;
        let prober = Arc::new(TcpConnectProber::new(settings.probe_timeout));

        Ok(Self {
            instances_file,
            settings,
            schema,
            gauge,
            scanner: RangeScanner::new(prober),
        })
    }

    /// Replace the prober used for every scan.
    pub fn with_prober(mut self, prober: SharedProber) -> Self {
        self.scanner = RangeScanner::new(prober);
        self
    }

    pub fn schema(&self) -> &LabelSchema {
        &self.schema
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// The published gauge.
    pub fn gauge(&self) -> &PortGauge {
        &self.gauge
    }

    /// Run one full cycle over every instance in the instances file.
    ///
    /// Only a failed reload (or a sink rejecting a sample) is an error;
    /// unreachable hosts simply publish no ports.
    pub async fn run_cycle(&self) -> CollectorResult<CycleReport> {
        let start_time = Instant::now();
        let instances = load_instances(&self.instances_file)?;
        let mut open_ports = 0;

        for instance in &instances {
            info!(address = %instance.address, ports = %self.settings.ports, "scanning ports");
            let open = self
                .scanner
                .scan_host(&instance.address, self.settings.ports, self.settings.workers)
                .await;

            publish_instance(&self.gauge, &self.schema, instance, &open)?;
            open_ports += open.len();
        }

        Ok(CycleReport {
            instances: instances.len(),
            open_ports,
            elapsed: start_time.elapsed(),
        })
    }

    /// Cycle until `cancel` fires or a reload fails.
    ///
    /// Cancellation is observed before each cycle and during the pause
    /// between cycles; a cycle in progress runs to completion.
    pub async fn run(self, cancel: CancellationToken) -> CollectorResult<()> {
        info!(interval = ?self.settings.cycle_interval, "starting collector");

        while !cancel.is_cancelled() {
            let report = self.run_cycle().await.map_err(|e| {
                error!(error = %e, "scan cycle failed");
                e
            })?;

            info!(
                instances = report.instances,
                open_ports = report.open_ports,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "scan cycle complete"
            );

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.cycle_interval) => {}
            }
        }

        info!("collector stopped");
        Ok(())
    }
}

/// Replace every published sample of `instance` with one per open port.
///
/// The bulk delete runs even when `open` is empty so that ports closed since
/// the previous cycle disappear.
pub fn publish_instance(
    sink: &dyn MetricSink,
    schema: &LabelSchema,
    instance: &Instance,
    open: &[Port],
) -> MetricsResult<()> {
    let removed = sink.delete_matching(&schema.sample_labels(instance, None));

    for &port in open {
        debug!(address = %instance.address, %port, "port open");
        sink.set(&schema.sample_labels(instance, Some(port)), 1.0)?;
    }

    debug!(
        address = %instance.address,
        removed,
        published = open.len(),
        "instance samples replaced"
    );
    Ok(())
}
