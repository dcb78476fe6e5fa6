use anyhow::Result;
use chrono::{DateTime, Local};

use wanmatrix::telemetry::rate::RateSnapshot;

/// Which view/mode the app is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
}

/// Terminal UI state
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub paused: bool, // z key: stop polling

    // Where the numbers come from
    pub endpoint: String,
    pub interface: String,

    // Latest poll
    pub snapshot: Option<RateSnapshot>,
    pub last_update: Option<DateTime<Local>>,
    pub last_error: Option<String>,

    // Tick counters
    pub polls: u64,
    pub failed_polls: u64,
}

impl App {
    pub fn new(endpoint: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            mode: AppMode::Normal,
            should_quit: false,
            paused: false,
            endpoint: endpoint.into(),
            interface: interface.into(),
            snapshot: None,
            last_update: None,
            last_error: None,
            polls: 0,
            failed_polls: 0,
        }
    }

    /// Record the outcome of one poll. Failures are kept for display and
    /// the previous snapshot stays on screen.
    pub fn record_poll(&mut self, result: Result<RateSnapshot>) {
        self.polls += 1;
        match result {
            Ok(snap) => {
                self.snapshot = Some(snap);
                self.last_update = Some(Local::now());
                self.last_error = None;
            }
            Err(e) => {
                log::warn!("poll failed: {e:#}");
                self.failed_polls += 1;
                self.last_error = Some(format!("{e:#}"));
            }
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}
