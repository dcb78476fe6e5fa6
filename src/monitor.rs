use std::time::Instant;

use anyhow::Result;

use crate::router::CounterSource;
use crate::telemetry::rate::{RateSnapshot, RateTracker};
use crate::telemetry::scroll::ScrollBuffer;

/// One poll step: read counters, turn them into rates, scroll the sparkline.
///
/// Ingress (download, the router's rx) is drawn from the top, egress
/// (upload, tx) from the bottom.
pub struct Monitor<S> {
    source: S,
    tracker: RateTracker,
    buffer: ScrollBuffer,
    last: Option<RateSnapshot>,
}

impl<S: CounterSource> Monitor<S> {
    /// Create the monitor and take the throwaway baseline sample
    pub fn new(source: S, width: usize, height: usize) -> Result<Self> {
        let mut monitor = Self {
            source,
            tracker: RateTracker::new(),
            buffer: ScrollBuffer::new(width, height),
            last: None,
        };
        let counters = monitor.source.read_counters()?;
        monitor
            .tracker
            .ingest(counters.tx_bytes, counters.rx_bytes, Instant::now());
        Ok(monitor)
    }

    /// Poll once at `now`. On a source error nothing is updated.
    pub fn tick(&mut self, now: Instant) -> Result<RateSnapshot> {
        let counters = self.source.read_counters()?;
        let snap = self.tracker.ingest(counters.tx_bytes, counters.rx_bytes, now);
        self.buffer.advance(snap.rx_ratio(), snap.tx_ratio());
        self.last = Some(snap);
        Ok(snap)
    }

    pub fn buffer(&self) -> &ScrollBuffer {
        &self.buffer
    }

    pub fn last(&self) -> Option<&RateSnapshot> {
        self.last.as_ref()
    }
}
