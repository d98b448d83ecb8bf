use tracing::warn;

use crate::error::ScanError;

const MIN_PORT: u64 = 1;
const MAX_PORT: u64 = 65535;

/// Splits a user range such as `80` or `20-25` into its tokens.
pub fn split_range(spec: &str) -> Vec<String> {
    spec.split('-').map(|s| s.trim().to_string()).collect()
}

/// Expands one or two tokens into an ascending list of ports.
///
/// A descending pair (`["30", "20"]`) yields an empty list rather than an
/// error. Any value outside 1-65535 is rejected before probing.
pub fn expand_ports<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<u16>, ScanError> {
    match tokens {
        [single] => {
            let port = parse_port(single.as_ref())?;
            Ok(vec![port])
        }
        [low, high] => {
            let low = parse_number(low.as_ref())?;
            let high = parse_number(high.as_ref())?;

            if low > high {
                warn!(low, high, "descending port range, nothing to scan");
                return Ok(Vec::new());
            }
            check_bounds(low)?;
            check_bounds(high)?;

            Ok((low..=high).map(|p| p as u16).collect())
        }
        _ => Err(ScanError::Range(
            tokens.iter().map(|t| t.as_ref().to_string()).collect(),
        )),
    }
}

/// Convenience wrapper: split on `-` then expand.
pub fn parse_ports(spec: &str) -> Result<Vec<u16>, ScanError> {
    expand_ports(&split_range(spec))
}

fn parse_number(token: &str) -> Result<u64, ScanError> {
    token.parse::<u64>().map_err(|source| ScanError::InvalidNumber {
        token: token.to_string(),
        source,
    })
}

fn parse_port(token: &str) -> Result<u16, ScanError> {
    let value = parse_number(token)?;
    check_bounds(value)?;
    Ok(value as u16)
}

fn check_bounds(value: u64) -> Result<(), ScanError> {
    if (MIN_PORT..=MAX_PORT).contains(&value) {
        Ok(())
    } else {
        Err(ScanError::PortOutOfRange(value))
    }
}
