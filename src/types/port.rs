//! Port types with validation.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortRange` describes the inclusive span a scan walks over.

use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
///
/// Port 0 is not representable; code that needs a "no port" value uses
/// `Option<Port>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value))
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u16 = s
            .trim()
            .parse()
            .map_err(|_| PortError::InvalidFormat(s.to_string()))?;
        Self::try_from(raw)
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} is out of valid range (1-65535)")]
    OutOfRange(u16),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
}

/// An inclusive range of ports.
///
/// A range whose start lies after its end is empty rather than invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: Port,
    end: Port,
}

impl PortRange {
    /// Create a new port range covering `start..=end`.
    pub const fn new(start: Port, end: Port) -> Self {
        Self { start, end }
    }

    /// Every port, 1-65535.
    pub const fn full() -> Self {
        Self {
            start: Port(Port::MIN),
            end: Port(Port::MAX),
        }
    }

    /// Get the number of ports in this range.
    pub const fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.end.0 - self.start.0) as usize + 1
        }
    }

    /// Check if the range contains no ports.
    pub const fn is_empty(&self) -> bool {
        self.start.0 > self.end.0
    }

    /// Iterate over all ports in this range.
    pub fn iter(&self) -> impl Iterator<Item = Port> {
        (self.start.0..=self.end.0).map(Port)
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for PortRange {
    type Err = PortError;

    /// Parse `"start-end"` or a single port `"80"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once('-') {
            Some((start, end)) => Ok(Self::new(start.parse()?, end.parse()?)),
            None => {
                let port: Port = s.parse()?;
                Ok(Self::new(port, port))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_validation() {
        assert!(Port::new(0).is_none());
        assert!(Port::new(1).is_some());
        assert!(Port::new(65535).is_some());
        assert_eq!(Port::try_from(0), Err(PortError::OutOfRange(0)));
    }

    #[test]
    fn test_port_parse() {
        assert_eq!("8080".parse::<Port>().unwrap().as_u16(), 8080);
        assert!("http".parse::<Port>().is_err());
        assert!("70000".parse::<Port>().is_err());
    }

    #[test]
    fn test_range_iteration() {
        let range: PortRange = "20-25".parse().unwrap();
        let ports: Vec<u16> = range.iter().map(Port::as_u16).collect();
        assert_eq!(ports, vec![20, 21, 22, 23, 24, 25]);
        assert_eq!(range.len(), 6);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = PortRange::new(Port::new(100).unwrap(), Port::new(10).unwrap());
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.iter().count(), 0);
    }

    #[test]
    fn test_full_range() {
        let range = PortRange::full();
        assert_eq!(range.len(), 65535);
        assert_eq!(range.to_string(), "1-65535");
        assert_eq!(range, PortRange::default());
    }

    #[test]
    fn test_single_port_range() {
        let range: PortRange = "443".parse().unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![Port::new(443).unwrap()]);
        assert_eq!(range.to_string(), "443-443");
    }
}
