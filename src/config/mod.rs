//! Configuration for the exporter.
//!
//! Instances come from a JSON file that is re-read every cycle; scan
//! settings are fixed for the process lifetime.

mod instances;
mod settings;

pub use instances::load_instances;
pub use settings::ScanSettings;
