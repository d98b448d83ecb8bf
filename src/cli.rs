use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::scanner::ScanConfig;

#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version)]
#[command(about = "Concurrent TCP connect port scanner", long_about = None)]
pub struct Cli {
    #[arg(help = "Target address: a global IP literal or a hostname")]
    pub address: String,

    #[arg(help = "Port or inclusive range (1 - 65535), e.g. 80 or 20-25")]
    pub range: String,

    #[arg(
        long,
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Connect timeout per port in milliseconds"
    )]
    pub timeout: u64,

    #[arg(long, help = "Maximum probes in flight (default: one task per port)")]
    pub concurrency: Option<NonZeroUsize>,

    #[arg(long, help = "Allow loopback, private, link-local and multicast literal addresses")]
    pub allow_non_global: bool,

    #[arg(short = 'o', long, value_enum, default_value = "human", help = "Output format")]
    pub output_format: OutputFormat,

    #[arg(short = 'f', long, help = "Output file path")]
    pub output_file: Option<PathBuf>,

    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,

    #[arg(short, long, help = "Hide the progress indicator")]
    pub quiet: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::new()
            .with_timeout(Duration::from_millis(self.timeout))
            .with_max_concurrency(self.concurrency)
            .with_allow_non_global(self.allow_non_global)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum OutputFormat {
    #[value(name = "human", help = "Human-readable output")]
    Human,
    #[value(name = "json", help = "JSON output")]
    Json,
    #[value(name = "csv", help = "CSV output")]
    Csv,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["portsweep", "example.com", "20-25"]).unwrap();
        assert_eq!(cli.address, "example.com");
        assert_eq!(cli.range, "20-25");
        assert_eq!(cli.output_format, OutputFormat::Human);

        let config = cli.scan_config();
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert!(config.max_concurrency.is_none());
        assert!(!config.allow_non_global);
    }

    #[test]
    fn test_options() {
        let cli = Cli::try_parse_from([
            "portsweep",
            "--timeout",
            "250",
            "--concurrency",
            "64",
            "--allow-non-global",
            "-o",
            "json",
            "127.0.0.1",
            "22",
        ])
        .unwrap();

        let config = cli.scan_config();
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.max_concurrency, NonZeroUsize::new(64));
        assert!(config.allow_non_global);
        assert_eq!(cli.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["portsweep", "--concurrency", "0", "a", "1"]).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(Cli::try_parse_from(["portsweep", "--timeout", "0", "a", "1"]).is_err());
        assert!(Cli::try_parse_from(["portsweep", "--timeout", "1", "a", "1"]).is_ok());
    }

    #[test]
    fn test_missing_range() {
        assert!(Cli::try_parse_from(["portsweep", "example.com"]).is_err());
    }
}
