// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::query::DEFAULT_LIMIT;

pub const ENV_CONFIG_PATH: &str = "APP_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";

const ENV_FEED_URL: &str = "SHEET_CSV_URL";
const ENV_REVALIDATE_TOKEN: &str = "REVALIDATE_TOKEN";
const ENV_CACHE_TTL: &str = "FEED_CACHE_TTL_SECS";
const ENV_DEFAULT_LIMIT: &str = "MEMBERS_DEFAULT_LIMIT";
const ENV_FEED_TIMEOUT: &str = "FEED_TIMEOUT_SECS";

/// Service configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV feed URL; `None` disables fetching (fallback data only).
    pub feed_url: Option<String>,
    /// Shared secret for `POST /api/revalidate`; `None` rejects every call.
    pub revalidate_token: Option<String>,
    pub cache_ttl_secs: u64,
    pub default_limit: usize,
    pub feed_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: None,
            revalidate_token: None,
            cache_ttl_secs: 3600,
            default_limit: DEFAULT_LIMIT,
            feed_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: Self = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.cleaned())
    }

    /// File via env path + fallbacks, then environment overrides:
    /// 1) $APP_CONFIG_PATH (must exist)
    /// 2) config/app.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        base.with_env_overrides()
    }

    /// Apply non-empty environment variables on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(v) = env_non_empty(ENV_FEED_URL) {
            self.feed_url = Some(v);
        }
        if let Some(v) = env_non_empty(ENV_REVALIDATE_TOKEN) {
            self.revalidate_token = Some(v);
        }
        if let Some(v) = env_non_empty(ENV_CACHE_TTL) {
            self.cache_ttl_secs = v
                .parse()
                .with_context(|| format!("{ENV_CACHE_TTL} must be an integer, got '{v}'"))?;
        }
        if let Some(v) = env_non_empty(ENV_DEFAULT_LIMIT) {
            self.default_limit = v
                .parse()
                .with_context(|| format!("{ENV_DEFAULT_LIMIT} must be an integer, got '{v}'"))?;
        }
        if let Some(v) = env_non_empty(ENV_FEED_TIMEOUT) {
            self.feed_timeout_secs = v
                .parse()
                .with_context(|| format!("{ENV_FEED_TIMEOUT} must be an integer, got '{v}'"))?;
        }
        Ok(self.cleaned())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    fn cleaned(mut self) -> Self {
        self.feed_url = trim_opt(self.feed_url);
        self.revalidate_token = trim_opt(self.revalidate_token);
        self
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trim_opt(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
