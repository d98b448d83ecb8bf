pub mod results;
pub mod tcp;

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use crate::error::ScanError;
use crate::network::resolve_with;
use crate::utils::parse_ports;
pub use results::{OutcomeCounts, ProbeOutcome, ScanReport};
pub use tcp::{ConnectProbe, Prober, DEFAULT_TIMEOUT};

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Connect timeout for each probe.
    pub timeout: Duration,
    /// `None` spawns every probe at once; `Some(n)` keeps at most `n` in flight.
    pub max_concurrency: Option<NonZeroUsize>,
    /// Accept loopback/private/link-local/multicast literals.
    pub allow_non_global: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: None,
            allow_non_global: false,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    pub fn with_allow_non_global(mut self, allow: bool) -> Self {
        self.allow_non_global = allow;
        self
    }
}

pub struct Scanner<P = ConnectProbe> {
    prober: Arc<P>,
    max_concurrency: Option<NonZeroUsize>,
    allow_non_global: bool,
    progress: ProgressBar,
}

impl Scanner<ConnectProbe> {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_prober(ConnectProbe::new(config.timeout), config)
    }
}

impl<P: Prober + 'static> Scanner<P> {
    pub fn with_prober(prober: P, config: &ScanConfig) -> Self {
        Self {
            prober: Arc::new(prober),
            max_concurrency: config.max_concurrency,
            allow_non_global: config.allow_non_global,
            progress: ProgressBar::hidden(),
        }
    }

    /// Advance `progress` once per finished probe.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Resolve `address`, expand `range` (`80` or `20-25`) and scan.
    pub async fn scan_target(&self, address: &str, range: &str) -> Result<ScanReport, ScanError> {
        let target = resolve_with(address, self.allow_non_global)?;
        let ports = parse_ports(range)?;
        self.scan(target, &ports).await
    }

    /// Probes every port concurrently and waits for all of them.
    ///
    /// Open ports are listed in completion order. Refused, timed out and
    /// failed probes only show up in the report's tallies.
    pub async fn scan(&self, target: IpAddr, ports: &[u16]) -> Result<ScanReport, ScanError> {
        info!(
            host = %target,
            ports = ports.len(),
            concurrency = ?self.max_concurrency,
            "starting scan"
        );

        let semaphore = self
            .max_concurrency
            .map(|limit| Arc::new(Semaphore::new(limit.get())));

        self.progress.set_length(ports.len() as u64);

        let start_time = chrono::Utc::now();
        let started = Instant::now();

        let mut tasks = FuturesUnordered::new();
        for &port in ports {
            let prober = Arc::clone(&self.prober);
            let semaphore = semaphore.clone();
            let addr = SocketAddr::new(target, port);

            tasks.push(tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                (port, prober.probe(addr).await)
            }));
        }

        let mut open_ports = Vec::new();
        let mut closed = OutcomeCounts::default();

        while let Some(joined) = tasks.next().await {
            let (port, outcome) = match joined {
                Ok(result) => result,
                Err(e) => {
                    tasks.iter().for_each(|task| task.abort());
                    self.progress.finish_and_clear();
                    return Err(e.into());
                }
            };
            debug!(port, %outcome, "probe finished");
            self.progress.inc(1);

            if outcome.is_open() {
                open_ports.push(port);
            } else {
                closed.record(outcome);
            }
        }

        let elapsed = started.elapsed();
        let end_time = chrono::Utc::now();
        self.progress.finish_and_clear();

        info!(
            host = %target,
            open = open_ports.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanReport {
            target,
            open_ports,
            elapsed,
            ports_scanned: ports.len(),
            start_time,
            end_time,
            closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    /// Sleeps for a per-port delay, then reports even ports open.
    struct DelayProbe {
        delay: fn(u16) -> Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl DelayProbe {
        fn new(delay: fn(u16) -> Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for DelayProbe {
        async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            sleep((self.delay)(addr.port())).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if addr.port() % 2 == 0 {
                ProbeOutcome::Open
            } else {
                ProbeOutcome::TimedOut
            }
        }
    }

    #[tokio::test]
    async fn test_fan_out_is_parallel() {
        let ports: Vec<u16> = (1..=20).collect();
        let scanner = Scanner::with_prober(
            DelayProbe::new(|_| Duration::from_millis(300)),
            &ScanConfig::default(),
        );

        let report = scanner.scan(LOCALHOST, &ports).await.unwrap();

        // sequential would take 6s
        assert!(report.elapsed < Duration::from_secs(2));
        assert_eq!(report.open_ports.len(), 10);
        assert_eq!(report.closed.timed_out, 10);
        assert_eq!(report.ports_scanned, 20);
    }

    #[tokio::test]
    async fn test_completion_order() {
        let scanner = Scanner::with_prober(
            DelayProbe::new(|port| Duration::from_millis(700 - port as u64 * 100)),
            &ScanConfig::default(),
        );

        let report = scanner.scan(LOCALHOST, &[2, 4, 6]).await.unwrap();
        assert_eq!(report.open_ports, vec![6, 4, 2]);
    }

    #[tokio::test]
    async fn test_bounded_concurrency() {
        let config = ScanConfig::new().with_max_concurrency(NonZeroUsize::new(2));
        let probe = DelayProbe::new(|_| Duration::from_millis(150));
        let scanner = Scanner::with_prober(probe, &config);

        let report = scanner.scan(LOCALHOST, &[10, 11, 12, 13, 14, 15]).await.unwrap();

        assert_eq!(scanner.prober.peak.load(Ordering::SeqCst), 2);
        assert!(report.elapsed >= Duration::from_millis(450));
        let mut open = report.open_ports.clone();
        open.sort_unstable();
        assert_eq!(open, vec![10, 12, 14]);
    }

    struct PanicProbe;

    #[async_trait]
    impl Prober for PanicProbe {
        async fn probe(&self, addr: SocketAddr) -> ProbeOutcome {
            if addr.port() == 13 {
                panic!("broken prober");
            }
            sleep(Duration::from_secs(30)).await;
            ProbeOutcome::Refused
        }
    }

    #[tokio::test]
    async fn test_task_failure_finishes_progress() {
        let progress = ProgressBar::hidden();
        let scanner = Scanner::with_prober(PanicProbe, &ScanConfig::default())
            .with_progress(progress.clone());

        let started = Instant::now();
        let err = scanner.scan(LOCALHOST, &[12, 13, 14]).await.unwrap_err();

        assert!(matches!(err, ScanError::Task(_)));
        assert!(progress.is_finished());
        // the slow siblings are not awaited
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_empty_port_list() {
        let scanner = Scanner::new(&ScanConfig::default());
        let report = scanner.scan(LOCALHOST, &[]).await.unwrap();

        assert!(report.open_ports.is_empty());
        assert_eq!(report.ports_scanned, 0);
        assert!(report.end_time >= report.start_time);
    }

    #[tokio::test]
    async fn test_scan_target_rejects_bad_input() {
        let scanner = Scanner::new(&ScanConfig::default());

        let err = scanner.scan_target("127.0.0.1", "80").await.unwrap_err();
        assert!(matches!(err, ScanError::Address(_)));

        let err = scanner.scan_target("8.8.8.8", "1-2-3").await.unwrap_err();
        assert!(matches!(err, ScanError::Range(_)));

        let err = scanner.scan_target("8.8.8.8", "ssh").await.unwrap_err();
        assert!(matches!(err, ScanError::InvalidNumber { .. }));
    }
}
