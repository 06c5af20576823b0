//! Host resolution for scan targets.
//!
//! Instance addresses are either IP literals or hostnames. Hostnames are
//! resolved once per scan so that the port sweep dials a fixed set of
//! addresses.

use std::net::IpAddr;
use trust_dns_resolver::TokioAsyncResolver;

/// Error type for target resolution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TargetError {
    #[error("empty target address")]
    Empty,
    #[error("failed to read system resolver configuration: {0}")]
    ResolverConfig(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// Resolve a host string to every address that will be probed.
///
/// IP literals (including bracketed IPv6) are returned as-is. Hostnames go
/// through the system resolver configuration; all A and AAAA answers are
/// kept in resolver order with duplicates removed.
pub async fn resolve_host(host: &str) -> Result<Vec<IpAddr>, TargetError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(TargetError::Empty);
    }

    let literal = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(vec![ip]);
    }

    let resolver = TokioAsyncResolver::tokio_from_system_conf()
        .map_err(|e| TargetError::ResolverConfig(e.to_string()))?;

    let response = resolver
        .lookup_ip(host)
        .await
        .map_err(|e| TargetError::DnsResolutionFailed(host.to_string(), e.to_string()))?;

    let mut addresses: Vec<IpAddr> = Vec::new();
    for ip in response.iter() {
        if !addresses.contains(&ip) {
            addresses.push(ip);
        }
    }

    if addresses.is_empty() {
        return Err(TargetError::NoAddressesFound(host.to_string()));
    }
    Ok(addresses)
}
