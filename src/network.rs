use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use ipnet::IpNet;
use lazy_static::lazy_static;
use tracing::{debug, warn};

use crate::error::ScanError;

/// Networks a literal target may not fall into.
const NON_GLOBAL_NETS: &[&str] = &[
    // IPv4
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.0.0.0/24",
    "192.0.2.0/24",
    "192.168.0.0/16",
    "198.18.0.0/15",
    "198.51.100.0/24",
    "203.0.113.0/24",
    "224.0.0.0/4",
    "240.0.0.0/4",
    // IPv6
    "::/128",
    "::1/128",
    "::ffff:0:0/96",
    "64:ff9b:1::/48",
    "100::/64",
    "2001::/23",
    "2001:db8::/32",
    "2002::/16",
    "fc00::/7",
    "fe80::/10",
    "ff00::/8",
];

/// Globally reachable blocks carved out of the reserved ones above.
const GLOBAL_EXCEPTIONS: &[&str] = &[
    "192.0.0.9/32",
    "192.0.0.10/32",
    "2001:1::1/128",
    "2001:1::2/128",
    "2001:3::/32",
    "2001:4:112::/48",
    "2001:20::/28",
    "2001:30::/28",
];

fn parse_nets(raw: &[&str]) -> Vec<IpNet> {
    raw.iter()
        .map(|net| net.parse::<IpNet>().expect("network table entry must parse"))
        .collect()
}

lazy_static! {
    static ref NON_GLOBAL: Vec<IpNet> = parse_nets(NON_GLOBAL_NETS);
    static ref GLOBAL: Vec<IpNet> = parse_nets(GLOBAL_EXCEPTIONS);
}

/// True when `ip` is routable on the public internet.
pub fn is_global(ip: IpAddr) -> bool {
    GLOBAL.iter().any(|net| net.contains(&ip)) || !NON_GLOBAL.iter().any(|net| net.contains(&ip))
}

/// Validates or resolves a scan target.
///
/// Literal addresses must be global; hostnames are looked up and their
/// address is returned as-is, whatever range it falls in.
pub fn resolve(target: &str) -> Result<IpAddr, ScanError> {
    resolve_with(target, false)
}

/// Like [`resolve`], with `allow_non_global` lifting the literal-address
/// restriction.
pub fn resolve_with(target: &str, allow_non_global: bool) -> Result<IpAddr, ScanError> {
    let target = target.trim();

    if let Some(ip) = parse_literal(target) {
        if !allow_non_global && !is_global(ip) {
            warn!(%ip, "refusing non-global literal address");
            return Err(ScanError::Address(target.to_string()));
        }
        return Ok(ip);
    }

    lookup_host(target)
}

/// Parses an IP literal, ignoring an IPv6 zone suffix such as `%eth0`.
fn parse_literal(target: &str) -> Option<IpAddr> {
    if let Ok(ip) = target.parse::<IpAddr>() {
        return Some(ip);
    }

    let (addr, _zone) = target.split_once('%')?;
    addr.parse::<IpAddr>().ok()
}

fn lookup_host(host: &str) -> Result<IpAddr, ScanError> {
    if host.is_empty() {
        return Err(ScanError::Address(host.to_string()));
    }

    let addrs: Vec<SocketAddr> = (host, 0)
        .to_socket_addrs()
        .map_err(|e| {
            debug!(host, error = %e, "hostname lookup failed");
            ScanError::Address(host.to_string())
        })?
        .collect();

    let ip = addrs
        .iter()
        .map(SocketAddr::ip)
        .find(IpAddr::is_ipv4)
        .or_else(|| addrs.first().map(SocketAddr::ip))
        .ok_or_else(|| ScanError::Address(host.to_string()))?;

    debug!(host, %ip, "resolved hostname");

    Ok(ip)
}
