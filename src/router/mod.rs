//! Counter source and session provider for an OpenWrt-style router.
//!
//! The router is queried over ubus JSON-RPC. Everything here is plumbing
//! for the telemetry core: it only has to produce two cumulative byte
//! counters for one interface.

pub mod rpc;
pub mod ubus;

use thiserror::Error;

pub use ubus::UbusClient;

/// Cumulative byte counters for one interface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

/// Anything that can produce a fresh pair of cumulative counters
pub trait CounterSource {
    fn read_counters(&mut self) -> anyhow::Result<Counters>;
}

#[derive(Debug, Error)]
pub enum UbusError {
    #[error("router answered HTTP {0}")]
    HttpStatus(u16),
    #[error("ubus call failed with status {0}")]
    Status(u64),
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed ubus response: {0}")]
    Malformed(String),
    #[error("interface '{0}' not found on router")]
    MissingInterface(String),
    #[error("interface '{0}' has no traffic statistics")]
    MissingStats(String),
}

/// Join a base URL and a path with exactly one `/` between them
pub fn url_join(base: &str, path: &str) -> String {
    let base = base.trim().trim_end_matches('/');
    let path = path.trim().trim_start_matches('/');
    format!("{base}/{path}")
}
