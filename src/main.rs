//! wanmatrix — router WAN bandwidth as a scrolling pixel sparkline.
//!
//! Polls a router's cumulative byte counters over ubus, turns them into
//! rates normalised against their own peaks, and scrolls them through a
//! two-channel pixel grid:
//!   - `tui`: the grid drawn in the terminal
//!   - `hat`: the grid pushed to a Sense HAT 8x8 LED matrix
//!
//! Settings come from `wanmatrixrc`, `.env` and `ROUTER_*` variables.

mod app;
mod cli;
mod input;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use wanmatrix::config::WanConfig;
use wanmatrix::hat::{self, SenseHat, HAT_SIZE};
use wanmatrix::monitor::Monitor;
use wanmatrix::router::UbusClient;
use wanmatrix::telemetry::rate::format_rate;

use app::App;
use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::init_from_env(
        env_logger::Env::default()
            .filter_or(env_logger::DEFAULT_FILTER_ENV, cli.command.default_log_filter()),
    );

    let mut cfg = WanConfig::load(cli.config.as_deref())?;
    if let Some(interface) = cli.interface {
        cfg.router.interface = interface;
    }
    cfg.validate().context("verifying configuration")?;

    match cli.command {
        Command::Tui => run_tui(&cfg),
        Command::Hat { device } => run_hat(&cfg, device),
    }
}

fn run_tui(cfg: &WanConfig) -> Result<()> {
    // Connect before touching the terminal so failures print normally
    let client = UbusClient::connect(&cfg.router)?;
    let mut app = App::new(client.endpoint(), client.interface());
    let mut monitor = Monitor::new(client, cfg.tui_width, cfg.tui_height)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let tick_rate = Duration::from_millis(cfg.tui_interval_ms);
    let result = run_app(&mut terminal, &mut app, &mut monitor, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main terminal loop: draw, handle keys, poll when a tick is due
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    monitor: &mut Monitor<UbusClient>,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, &*app, monitor.buffer()))?;

        if app.should_quit {
            return Ok(());
        }

        // Short timeout keeps key handling responsive between polls
        let timeout = tick_rate
            .saturating_sub(last_tick.elapsed())
            .min(Duration::from_millis(50));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    input::handle_input(app, key);
                }
            }
        }

        let now = Instant::now();
        if now.duration_since(last_tick) >= tick_rate {
            last_tick = now;
            if !app.paused {
                app.record_poll(monitor.tick(now));
            }
        }
    }
}

fn run_hat(cfg: &WanConfig, device: Option<PathBuf>) -> Result<()> {
    let path = match device.or_else(|| cfg.hat_device.clone()) {
        Some(path) => path,
        None => hat::find_device()?,
    };
    let mut display = SenseHat::open(&path)?;
    log::info!("drawing to {}", path.display());

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("installing Ctrl-C handler")?;
    }

    let client = UbusClient::connect(&cfg.router)?;
    let mut monitor = Monitor::new(client, HAT_SIZE, HAT_SIZE)?;
    let interval = Duration::from_millis(cfg.hat_interval_ms);

    while running.load(Ordering::SeqCst) {
        match monitor.tick(Instant::now()) {
            Ok(snap) => {
                log::info!(
                    "tx: {:>10} / {:>10}  rx: {:>10} / {:>10} [{:?}]",
                    format_rate(snap.cur_tx),
                    format_rate(snap.peak_tx),
                    format_rate(snap.cur_rx),
                    format_rate(snap.peak_rx),
                    snap.elapsed
                );
                display.draw(monitor.buffer())?;
            }
            Err(e) => log::warn!("poll failed: {e:#}"),
        }
        std::thread::sleep(interval);
    }

    display.clear()?;
    Ok(())
}
