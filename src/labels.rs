//! Label schema shared by every published sample.
//!
//! The schema is the union of all instance label keys seen at startup, with
//! the reserved `ip` and `port` keys appended last. It is frozen after
//! construction: the gauge is registered with exactly these names, so every
//! sample must carry every key, using an empty value where an instance does
//! not define one.

use crate::types::{Instance, Port};
use std::collections::{BTreeMap, BTreeSet};

/// Reserved key holding the instance address.
pub const IP_LABEL: &str = "ip";
/// Reserved key holding the open port number.
pub const PORT_LABEL: &str = "port";

/// A resolved label map for one sample or one deletion pattern.
pub type Labels = BTreeMap<String, String>;

/// Frozen, ordered set of label keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    keys: Vec<String>,
}

impl LabelSchema {
    /// Build the schema from the instances known at startup.
    ///
    /// Custom keys are deduplicated and sorted; `ip` and `port` always come
    /// last. An instance label that reuses a reserved key does not produce a
    /// second copy of it.
    pub fn from_instances(instances: &[Instance]) -> Self {
        let custom: BTreeSet<&str> = instances
            .iter()
            .flat_map(|instance| instance.labels.keys())
            .map(String::as_str)
            .filter(|key| !is_reserved(key))
            .collect();

        let keys = custom
            .into_iter()
            .map(str::to_string)
            .chain([IP_LABEL.to_string(), PORT_LABEL.to_string()])
            .collect();

        Self { keys }
    }

    /// All keys in schema order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Keys as `&str`, in the shape `prometheus` expects for label names.
    pub fn key_refs(&self) -> Vec<&str> {
        self.keys.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Build the label map for `instance`.
    ///
    /// With `Some(port)` the result is a full sample carrying every schema
    /// key. With `None` the `port` key is left out, which turns the map into
    /// a pattern matching every per-port series of the instance.
    pub fn sample_labels(&self, instance: &Instance, port: Option<Port>) -> Labels {
        let mut labels: Labels = self
            .keys
            .iter()
            .filter(|key| !is_reserved(key))
            .map(|key| {
                let value = instance.label(key).unwrap_or_default();
                (key.clone(), value.to_string())
            })
            .collect();

        labels.insert(IP_LABEL.to_string(), instance.address.clone());

        if let Some(port) = port {
            labels.insert(PORT_LABEL.to_string(), port.to_string());
        }

        labels
    }
}

fn is_reserved(key: &str) -> bool {
    key == IP_LABEL || key == PORT_LABEL
}
