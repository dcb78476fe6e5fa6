//! wanmatrix configuration (htoprc-style key=value format)
//!
//! Sources, lowest precedence first: built-in defaults, the rc file at
//! `$XDG_CONFIG_HOME/wanmatrix/wanmatrixrc` (or `--config`), a `.env` file
//! in the working directory, then the process environment.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};

const MIN_INTERVAL_MS: u64 = 50;
const MAX_INTERVAL_MS: u64 = 10_000;

/// Environment variables consulted after the files
const ENV_KEYS: &[&str] = &[
    "ROUTER_URL",
    "ROUTER_USER",
    "ROUTER_PASSWORD",
    "ROUTER_INTERFACE",
];

/// Get the default config file path: $XDG_CONFIG_HOME/wanmatrix/wanmatrixrc
fn config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("wanmatrix").join("wanmatrixrc"))
}

/// Everything the router client needs, passed in explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    /// Device name in the router's device list, e.g. `wan`
    pub interface: String,
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: String::new(),
            password: String::new(),
            interface: "wan".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WanConfig {
    pub router: RouterConfig,

    // Poll cadence
    pub tui_interval_ms: u64,
    pub hat_interval_ms: u64,

    // Terminal matrix size (the HAT is always 8x8)
    pub tui_width: usize,
    pub tui_height: usize,

    /// Framebuffer device of the LED matrix; probed when unset
    pub hat_device: Option<PathBuf>,
}

impl Default for WanConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            tui_interval_ms: 250,
            hat_interval_ms: 100,
            tui_width: 64,
            tui_height: 16,
            hat_device: None,
        }
    }
}

impl WanConfig {
    /// Load from all sources. An explicitly named rc file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut cfg = Self::default();

        match explicit {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                cfg.apply_str(&content);
            }
            None => {
                if let Some(path) = config_path() {
                    cfg.apply_file(&path)?;
                }
            }
        }

        cfg.apply_file(Path::new(".env"))?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Apply a key=value file if it exists
    fn apply_file(&mut self, path: &Path) -> Result<()> {
        match fs::read_to_string(path) {
            Ok(content) => {
                log::debug!("loading settings from {}", path.display());
                self.apply_str(&content);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Apply `key=value` lines. `#` comments, `export` prefixes and quoted
    /// values (as found in `.env` files) are accepted.
    pub fn apply_str(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            if let Some((key, value)) = line.split_once('=') {
                self.set(key.trim(), unquote(value.trim()));
            }
        }
    }

    /// Apply environment variables through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for key in ENV_KEYS {
            if let Some(value) = lookup(key) {
                self.set(key, &value);
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match key.to_ascii_lowercase().as_str() {
            "router_url" => self.router.url = value.to_string(),
            "router_user" => self.router.user = value.to_string(),
            "router_password" => self.router.password = value.to_string(),
            "router_interface" | "interface" => {
                if !value.is_empty() {
                    self.router.interface = value.to_string();
                }
            }
            "request_timeout_ms" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.router.request_timeout = Duration::from_millis(v.clamp(100, 60_000));
                }
            }
            "tui_interval_ms" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.tui_interval_ms = v.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
                }
            }
            "hat_interval_ms" => {
                if let Ok(v) = value.parse::<u64>() {
                    self.hat_interval_ms = v.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS);
                }
            }
            "tui_width" => {
                if let Ok(v) = value.parse::<usize>() {
                    self.tui_width = v.clamp(1, 512);
                }
            }
            "tui_height" => {
                if let Ok(v) = value.parse::<usize>() {
                    self.tui_height = v.clamp(1, 128);
                }
            }
            "hat_device" => {
                self.hat_device = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            _ => {} // Ignore unknown keys
        }
    }

    /// Fail if a setting needed to reach the router is missing
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("ROUTER_URL", &self.router.url),
            ("ROUTER_USER", &self.router.user),
            ("ROUTER_PASSWORD", &self.router.password),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            bail!("missing required setting(s): {}", missing.join(", "));
        }
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
