//! TCP connect scanning of a single host.
//!
//! A target is validated by [`network::resolve`], a port range is expanded
//! by [`utils::expand_ports`], and [`scanner::Scanner`] probes every port
//! concurrently before returning a [`scanner::ScanReport`].

pub mod cli;
pub mod error;
pub mod logging;
pub mod network;
pub mod output;
pub mod scanner;
pub mod utils;

pub use error::ScanError;
