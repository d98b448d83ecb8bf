use std::num::ParseIntError;

use thiserror::Error;

/// Invocation-level failures. Per-port connection failures never show up
/// here, they are classified by the probe and folded into the report.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Address \"{0}\" not found.")]
    Address(String),
    #[error("Invalid range {0:?}")]
    Range(Vec<String>),
    #[error("Int numbers only.")]
    InvalidNumber {
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Port {0} is outside 1-65535")]
    PortOutOfRange(u64),
    #[error("probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
