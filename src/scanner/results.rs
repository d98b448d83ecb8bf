use std::io;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Open,
    Refused,
    TimedOut,
    Failed(io::ErrorKind),
}

impl ProbeOutcome {
    pub fn from_io_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
            io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
            kind => ProbeOutcome::Failed(kind),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ProbeOutcome::Open)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Open => write!(f, "open"),
            ProbeOutcome::Refused => write!(f, "refused"),
            ProbeOutcome::TimedOut => write!(f, "timed out"),
            ProbeOutcome::Failed(kind) => write!(f, "failed ({})", kind),
        }
    }
}

/// Tally of the outcomes that never reach the open-port list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub refused: usize,
    pub timed_out: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Open => {}
            ProbeOutcome::Refused => self.refused += 1,
            ProbeOutcome::TimedOut => self.timed_out += 1,
            ProbeOutcome::Failed(_) => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: IpAddr,
    /// Open ports in the order their probes completed.
    pub open_ports: Vec<u16>,
    #[serde(rename = "elapsed_secs", with = "duration_secs")]
    pub elapsed: Duration,
    pub ports_scanned: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub closed: OutcomeCounts,
}

impl ScanReport {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn has_open_ports(&self) -> bool {
        !self.open_ports.is_empty()
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
