//! Router bandwidth telemetry: rate normalisation, a scrolling two-channel
//! pixel sparkline, and the plumbing that feeds it from a ubus router.

pub mod config;
pub mod hat;
pub mod monitor;
pub mod router;
pub mod telemetry;
