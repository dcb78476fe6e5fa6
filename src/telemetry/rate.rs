use std::time::{Duration, Instant};

/// What kind of sample an ingest produced.
///
/// Counter resets and zero-length intervals are recovered locally: the
/// affected rate is reported as zero and nothing is surfaced as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// First ingest after construction. Only establishes the counters.
    Baseline,
    /// Normal rate sample.
    Rate,
    /// At least one raw counter went backwards (device reset or wraparound).
    CounterReset { tx: bool, rx: bool },
    /// No time passed since the previous sample.
    ZeroElapsed,
}

/// One point-in-time bandwidth measurement plus the historical peaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSnapshot {
    /// Current transmit rate, bytes/sec
    pub cur_tx: u64,
    /// Current receive rate, bytes/sec
    pub cur_rx: u64,
    /// Highest transmit rate seen so far, bytes/sec
    pub peak_tx: u64,
    /// Highest receive rate seen so far, bytes/sec
    pub peak_rx: u64,
    /// Time since the previous ingest (since construction for the baseline)
    pub elapsed: Duration,
    pub kind: SampleKind,
}

impl RateSnapshot {
    /// Current tx rate relative to the tx peak, in `[0, 1]`
    pub fn tx_ratio(&self) -> f64 {
        ratio(self.cur_tx, self.peak_tx)
    }

    /// Current rx rate relative to the rx peak, in `[0, 1]`
    pub fn rx_ratio(&self) -> f64 {
        ratio(self.cur_rx, self.peak_rx)
    }
}

/// `cur / peak` clamped to `[0, 1]`. A zero peak (no traffic yet) yields 0.
pub fn ratio(cur: u64, peak: u64) -> f64 {
    if peak == 0 {
        return 0.0;
    }
    (cur as f64 / peak as f64).clamp(0.0, 1.0)
}

/// Turns raw cumulative byte counters into bytes/sec rates.
///
/// Peaks only ever grow for the lifetime of the tracker. One tracker per
/// monitored session; it is not meant to be shared between threads without
/// outside synchronisation.
#[derive(Debug, Clone)]
pub struct RateTracker {
    cumulative_tx: u64,
    cumulative_rx: u64,
    last_sample_at: Option<Instant>,
    created_at: Instant,
    peak_tx: u64,
    peak_rx: u64,
}

impl RateTracker {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Tracker whose construction time is `created_at`
    pub fn starting_at(created_at: Instant) -> Self {
        Self {
            cumulative_tx: 0,
            cumulative_rx: 0,
            last_sample_at: None,
            created_at,
            peak_tx: 0,
            peak_rx: 0,
        }
    }

    pub fn peak_tx(&self) -> u64 {
        self.peak_tx
    }

    pub fn peak_rx(&self) -> u64 {
        self.peak_rx
    }

    /// Feed a fresh raw counter pair observed at `now`.
    pub fn ingest(&mut self, raw_tx: u64, raw_rx: u64, now: Instant) -> RateSnapshot {
        let last = match self.last_sample_at {
            Some(last) => last,
            None => {
                self.cumulative_tx = raw_tx;
                self.cumulative_rx = raw_rx;
                self.last_sample_at = Some(now);
                return RateSnapshot {
                    cur_tx: 0,
                    cur_rx: 0,
                    peak_tx: 0,
                    peak_rx: 0,
                    elapsed: now.saturating_duration_since(self.created_at),
                    kind: SampleKind::Baseline,
                };
            }
        };

        let elapsed = now.saturating_duration_since(last);
        let tx_reset = raw_tx < self.cumulative_tx;
        let rx_reset = raw_rx < self.cumulative_rx;

        let kind = if tx_reset || rx_reset {
            log::warn!(
                "counter went backwards (tx {} -> {}, rx {} -> {}); re-baselining",
                self.cumulative_tx,
                raw_tx,
                self.cumulative_rx,
                raw_rx
            );
            SampleKind::CounterReset {
                tx: tx_reset,
                rx: rx_reset,
            }
        } else {
            SampleKind::Rate
        };

        // Only a reset channel moves its counter; everything else counts
        // towards the next interval with a non-zero duration.
        if elapsed.is_zero() {
            if tx_reset {
                self.cumulative_tx = raw_tx;
            }
            if rx_reset {
                self.cumulative_rx = raw_rx;
            }
            let kind = match kind {
                SampleKind::Rate => SampleKind::ZeroElapsed,
                reset => reset,
            };
            return self.snapshot(0, 0, elapsed, kind);
        }

        let delta_tx = if tx_reset { 0 } else { raw_tx - self.cumulative_tx };
        let delta_rx = if rx_reset { 0 } else { raw_rx - self.cumulative_rx };
        let cur_tx = per_second(delta_tx, elapsed);
        let cur_rx = per_second(delta_rx, elapsed);
        self.peak_tx = self.peak_tx.max(cur_tx);
        self.peak_rx = self.peak_rx.max(cur_rx);

        self.cumulative_tx = raw_tx;
        self.cumulative_rx = raw_rx;
        self.last_sample_at = Some(now);

        self.snapshot(cur_tx, cur_rx, elapsed, kind)
    }

    fn snapshot(
        &self,
        cur_tx: u64,
        cur_rx: u64,
        elapsed: Duration,
        kind: SampleKind,
    ) -> RateSnapshot {
        RateSnapshot {
            cur_tx,
            cur_rx,
            peak_tx: self.peak_tx,
            peak_rx: self.peak_rx,
            elapsed,
            kind,
        }
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Bytes over an interval as whole bytes/sec (truncated). Zero interval → 0.
fn per_second(delta: u64, elapsed: Duration) -> u64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0;
    }
    (delta as f64 / secs) as u64
}

/// Format a byte rate to a human-readable string (B/s, K/s, M/s, G/s)
pub fn format_rate(bytes_per_sec: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    const GIB: u64 = 1024 * MIB;

    if bytes_per_sec >= GIB {
        format!("{:.2}G/s", bytes_per_sec as f64 / GIB as f64)
    } else if bytes_per_sec >= MIB {
        format!("{:.1}M/s", bytes_per_sec as f64 / MIB as f64)
    } else if bytes_per_sec >= KIB {
        format!("{:.0}K/s", bytes_per_sec as f64 / KIB as f64)
    } else {
        format!("{}B/s", bytes_per_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    fn baselined(tx: u64, rx: u64) -> (RateTracker, Instant) {
        let t0 = Instant::now();
        let mut tracker = RateTracker::starting_at(t0);
        tracker.ingest(tx, rx, t0);
        (tracker, t0)
    }

    #[test]
    fn baseline_reports_zero_regardless_of_counters() {
        let t0 = Instant::now();
        let mut tracker = RateTracker::starting_at(t0);
        let snap = tracker.ingest(u64::MAX / 2, 123_456_789, t0 + 3 * SEC);
        assert_eq!(snap.kind, SampleKind::Baseline);
        assert_eq!((snap.cur_tx, snap.cur_rx), (0, 0));
        assert_eq!((snap.peak_tx, snap.peak_rx), (0, 0));
        assert_eq!(snap.elapsed, 3 * SEC);
    }

    #[test]
    fn unchanged_then_growing_counter() {
        let (mut tracker, t0) = baselined(1000, 0);

        let snap = tracker.ingest(1000, 0, t0 + SEC);
        assert_eq!(snap.cur_tx, 0);
        assert_eq!(snap.peak_tx, 0);
        assert_eq!(snap.kind, SampleKind::Rate);

        let snap = tracker.ingest(2000, 0, t0 + 2 * SEC);
        assert_eq!(snap.cur_tx, 1000);
        assert_eq!(snap.peak_tx, 1000);
        assert_eq!(snap.elapsed, SEC);
    }

    #[test]
    fn rate_is_truncated_to_whole_bytes() {
        let (mut tracker, t0) = baselined(0, 0);
        let snap = tracker.ingest(1000, 10, t0 + 3 * SEC);
        assert_eq!(snap.cur_tx, 333);
        assert_eq!(snap.cur_rx, 3);
    }

    #[test]
    fn counter_reset_rebaselines_without_spike() {
        let (mut tracker, t0) = baselined(0, 0);
        tracker.ingest(5000, 5000, t0 + SEC);
        assert_eq!(tracker.peak_tx(), 5000);

        let snap = tracker.ingest(100, 6000, t0 + 2 * SEC);
        assert_eq!(snap.cur_tx, 0);
        assert_eq!(snap.peak_tx, 5000);
        assert_eq!(snap.cur_rx, 1000);
        assert_eq!(snap.kind, SampleKind::CounterReset { tx: true, rx: false });

        // Next interval measures from the re-baselined value.
        let snap = tracker.ingest(300, 6000, t0 + 3 * SEC);
        assert_eq!(snap.cur_tx, 200);
        assert_eq!(snap.peak_tx, 5000);
    }

    #[test]
    fn zero_elapsed_does_not_divide_and_keeps_bytes() {
        let (mut tracker, t0) = baselined(0, 0);
        let snap = tracker.ingest(500, 500, t0);
        assert_eq!(snap.kind, SampleKind::ZeroElapsed);
        assert_eq!((snap.cur_tx, snap.cur_rx), (0, 0));

        let snap = tracker.ingest(1000, 1000, t0 + SEC);
        assert_eq!((snap.cur_tx, snap.cur_rx), (1000, 1000));
    }

    #[test]
    fn zero_elapsed_reset_keeps_other_channel_bytes() {
        let (mut tracker, t0) = baselined(0, 0);
        tracker.ingest(1000, 1000, t0 + SEC);

        let snap = tracker.ingest(10, 1500, t0 + SEC);
        assert_eq!(snap.kind, SampleKind::CounterReset { tx: true, rx: false });
        assert_eq!((snap.cur_tx, snap.cur_rx), (0, 0));

        let snap = tracker.ingest(10, 2500, t0 + SEC * 2);
        assert_eq!(snap.kind, SampleKind::Rate);
        assert_eq!((snap.cur_tx, snap.cur_rx), (0, 1500));
    }

    #[test]
    fn peaks_never_decrease() {
        let (mut tracker, t0) = baselined(0, 0);
        let increments = [10u64, 5000, 0, 300, 7000, 1, 0, 6999];
        let (mut tx, mut rx) = (0u64, 0u64);
        let mut prev = (0, 0);
        for (i, inc) in increments.iter().enumerate() {
            tx += inc;
            rx += inc / 2;
            let snap = tracker.ingest(tx, rx, t0 + SEC * (i as u32 + 1));
            assert!(snap.peak_tx >= prev.0 && snap.peak_rx >= prev.1);
            assert!(snap.peak_tx >= snap.cur_tx && snap.peak_rx >= snap.cur_rx);
            prev = (snap.peak_tx, snap.peak_rx);
        }
        assert_eq!(prev, (7000, 3500));
    }

    #[test]
    fn ratio_handles_zero_peak() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(10, 0), 0.0);
        assert_eq!(ratio(5, 10), 0.5);
        assert_eq!(ratio(20, 10), 1.0);
    }

    #[test]
    fn snapshot_ratios_stay_in_unit_range() {
        let (mut tracker, t0) = baselined(0, 0);
        let snap = tracker.ingest(0, 0, t0 + SEC);
        assert_eq!(snap.tx_ratio(), 0.0);
        assert_eq!(snap.rx_ratio(), 0.0);

        tracker.ingest(4000, 2000, t0 + 2 * SEC);
        let snap = tracker.ingest(5000, 2500, t0 + 3 * SEC);
        assert_eq!(snap.tx_ratio(), 0.25);
        assert_eq!(snap.rx_ratio(), 0.25);
    }

    #[test]
    fn format_rate_units() {
        assert_eq!(format_rate(512), "512B/s");
        assert_eq!(format_rate(2048), "2K/s");
        assert_eq!(format_rate(3 * 1024 * 1024 / 2), "1.5M/s");
        assert_eq!(format_rate(2 * 1024 * 1024 * 1024), "2.00G/s");
    }
}
