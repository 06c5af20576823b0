//! Scan target records as read from the instances file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One configured scan target: an address plus the labels its samples carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Host or IP address. A CIDR suffix is accepted in the file but only
    /// the address before the `/` is ever scanned.
    #[serde(alias = "ip")]
    pub address: String,
    /// Arbitrary label key/value pairs.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Instance {
    /// Create a new instance with no labels.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Add a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Strip any `/prefix` suffix and surrounding whitespace from the address.
    pub fn normalized(mut self) -> Self {
        self.address = normalize_address(&self.address).to_string();
        self
    }

    /// Look up a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// Reduce `"10.0.0.5/24"` to `"10.0.0.5"`.
pub fn normalize_address(address: &str) -> &str {
    let address = address.trim();
    match address.split_once('/') {
        Some((host, _)) => host.trim_end(),
        None => address,
    }
}
