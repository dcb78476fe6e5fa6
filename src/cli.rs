use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "wanmatrix",
    version,
    about = "Router WAN bandwidth as a scrolling two-channel sparkline",
    long_about = None
)]
pub struct Cli {
    /// Read settings from this file instead of $XDG_CONFIG_HOME/wanmatrix/wanmatrixrc
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Router device to monitor (default: wan)
    #[arg(long, global = true)]
    pub interface: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Draw the sparkline in the terminal
    Tui,
    /// Drive a Sense HAT 8x8 LED matrix
    Hat {
        /// Framebuffer device (probed by name when omitted)
        #[arg(long)]
        device: Option<PathBuf>,
    },
}

impl Command {
    /// Default log filter; the HAT has no screen so its status goes to the log
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Command::Tui => "warn",
            Command::Hat { .. } => "info",
        }
    }
}
