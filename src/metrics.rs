//! Prometheus metric sink.
//!
//! `port_opened` is a gauge vector labelled with the frozen [`LabelSchema`].
//! The `prometheus` crate can only remove a series by its exact label set,
//! so `PortGauge` keeps an index of what it published and resolves partial
//! matches against it.

use crate::error::{MetricsError, MetricsResult};
use crate::labels::{LabelSchema, Labels};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Name of the exported gauge.
pub const PORT_OPENED_METRIC: &str = "port_opened";

/// Content type of the text exposition format.
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// A gauge-style time series sink keyed by label maps.
pub trait MetricSink: Send + Sync {
    /// Set the series identified by `labels` to `value`, creating it if needed.
    fn set(&self, labels: &Labels, value: f64) -> MetricsResult<()>;

    /// Remove every series whose labels contain all of `partial`.
    /// Returns the number of series removed.
    fn delete_matching(&self, partial: &Labels) -> usize;
}

/// The `port_opened` gauge vector plus the index of its live series.
pub struct PortGauge {
    gauge: GaugeVec,
    series: Mutex<HashSet<Labels>>,
}

impl PortGauge {
    /// Create the gauge with `schema` as its label names and register it.
    pub fn register(registry: &Registry, schema: &LabelSchema) -> MetricsResult<Self> {
        let gauge = GaugeVec::new(
            Opts::new(PORT_OPENED_METRIC, "Port opened metric"),
            &schema.key_refs(),
        )?;
        registry.register(Box::new(gauge.clone()))?;

        Ok(Self {
            gauge,
            series: Mutex::new(HashSet::new()),
        })
    }

    /// Snapshot of every label set currently published.
    pub fn series(&self) -> Vec<Labels> {
        let mut series: Vec<Labels> = self.lock().iter().cloned().collect();
        series.sort();
        series
    }

    /// Current value of a published series, `None` if it does not exist.
    pub fn value(&self, labels: &Labels) -> Option<f64> {
        let series = self.lock();
        if !series.contains(labels) {
            return None;
        }
        self.gauge
            .get_metric_with(&as_str_map(labels))
            .ok()
            .map(|gauge| gauge.get())
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Labels>> {
        self.series.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricSink for PortGauge {
    fn set(&self, labels: &Labels, value: f64) -> MetricsResult<()> {
        let mut series = self.lock();
        self.gauge.get_metric_with(&as_str_map(labels))?.set(value);
        series.insert(labels.clone());
        Ok(())
    }

    fn delete_matching(&self, partial: &Labels) -> usize {
        let mut series = self.lock();

        let matching: Vec<Labels> = series
            .iter()
            .filter(|labels| is_superset(labels, partial))
            .cloned()
            .collect();

        for labels in &matching {
            // A child missing from the vector is already gone.
            let _ = self.gauge.remove(&as_str_map(labels));
            series.remove(labels);
        }

        matching.len()
    }
}

/// Encode everything in `registry` in the Prometheus text format.
pub fn render(registry: &Registry) -> MetricsResult<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
}

fn is_superset(labels: &Labels, partial: &Labels) -> bool {
    partial
        .iter()
        .all(|(key, value)| labels.get(key) == Some(value))
}

fn as_str_map(labels: &Labels) -> HashMap<&str, &str> {
    labels
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect()
}
