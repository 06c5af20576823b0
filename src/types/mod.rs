//! Core type definitions using newtype patterns for type safety.

mod instance;
mod port;
mod target;

pub use instance::{normalize_address, Instance};
pub use port::{Port, PortError, PortRange};
pub use target::{resolve_host, TargetError};
