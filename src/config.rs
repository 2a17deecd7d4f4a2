//! Runtime configuration.
//!
//! Everything has a working default; the environment can override any of it and
//! CLI flags override the environment (see `main.rs`).
//!
//! | Variable | Default |
//! |---|---|
//! | `BREWLENS_API_BASE` | `https://formulae.brew.sh/api` |
//! | `BREWLENS_CATALOG_TTL` | `86400` (seconds) |
//! | `BREWLENS_TIMEOUT` | `10` (seconds) |
//! | `BREWLENS_PAGE_SIZE` | `24` |
//! | `BREWLENS_STATE_DIR` | `$XDG_STATE_HOME/brewlens` or `~/.local/state/brewlens` |

use crate::error::{BrewError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://formulae.brew.sh/api";
pub const DEFAULT_CATALOG_TTL: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Page sizes offered by the list view.
pub const PAGE_SIZE_CHOICES: [usize; 3] = [12, 24, 48];

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub catalog_ttl: Duration,
    pub request_timeout: Duration,
    pub page_size: usize,
    pub state_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            catalog_ttl: DEFAULT_CATALOG_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            state_dir: state_dir_from(|key| std::env::var(key).ok()),
        }
    }
}

impl Config {
    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to defaults; set-but-invalid values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_base = lookup("BREWLENS_API_BASE")
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let catalog_ttl = match lookup("BREWLENS_CATALOG_TTL") {
            Some(raw) => Duration::from_secs(parse_positive("BREWLENS_CATALOG_TTL", &raw)?),
            None => DEFAULT_CATALOG_TTL,
        };

        let request_timeout = match lookup("BREWLENS_TIMEOUT") {
            Some(raw) => Duration::from_secs(parse_positive("BREWLENS_TIMEOUT", &raw)?),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let page_size = match lookup("BREWLENS_PAGE_SIZE") {
            Some(raw) => parse_positive("BREWLENS_PAGE_SIZE", &raw)? as usize,
            None => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_base,
            catalog_ttl,
            request_timeout,
            page_size,
            state_dir: state_dir_from(&lookup),
        })
    }

    /// Path of the persisted pagination state file.
    pub fn page_state_path(&self) -> PathBuf {
        self.state_dir.join("pages.json")
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(BrewError::Config(format!("{key} must be greater than zero"))),
        Ok(value) => Ok(value),
        Err(_) => Err(BrewError::Config(format!(
            "{key} must be a positive integer, got '{raw}'"
        ))),
    }
}

fn state_dir_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = lookup("BREWLENS_STATE_DIR") {
        PathBuf::from(dir)
    } else if let Some(state_home) = lookup("XDG_STATE_HOME") {
        PathBuf::from(state_home).join("brewlens")
    } else if let Some(home) = lookup("HOME") {
        PathBuf::from(home).join(".local/state/brewlens")
    } else {
        PathBuf::from(".brewlens")
    }
}
