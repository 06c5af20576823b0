//! Instances file loading.
//!
//! The file is a JSON array of `{ "address": ..., "labels": { ... } }`
//! records. It is read at startup and again at the top of every scan cycle,
//! so edits are picked up without a restart.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Instance;
use std::fs;
use std::path::Path;

/// Load and normalize every instance from `path`.
pub fn load_instances(path: impl AsRef<Path>) -> ConfigResult<Vec<Instance>> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    parse_instances(&content).map_err(|reason| ConfigError::InvalidFormat {
        path: path.to_path_buf(),
        reason,
    })
}

fn parse_instances(content: &str) -> Result<Vec<Instance>, String> {
    let instances: Vec<Instance> = serde_json::from_str(content).map_err(|e| e.to_string())?;

    instances
        .into_iter()
        .enumerate()
        .map(|(index, instance)| {
            let instance = instance.normalized();
            if instance.address.is_empty() {
                Err(format!("instance #{index} has an empty address"))
            } else {
                Ok(instance)
            }
        })
        .collect()
}
