//! Runtime configuration, loaded from `snapgram.toml`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "snapgram.toml";
const FALLBACK_REDIS_URL: &str = "redis://127.0.0.1/";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub redis: RedisSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub media: MediaSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "${REDIS_URL}".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Leading key segment, lets several deployments share one Redis.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_service")]
    pub service: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            service: default_service(),
        }
    }
}

fn default_prefix() -> String {
    "snapgram".to_string()
}

fn default_service() -> String {
    "social".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    /// Host of the image CDN; chat messages pointing at it are image messages.
    #[serde(default = "default_cdn_host")]
    pub cdn_host: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            cdn_host: default_cdn_host(),
        }
    }
}

fn default_cdn_host() -> String {
    "ucarecdn.com".to_string()
}

impl Settings {
    /// Loads settings from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The Redis URL with a `${VAR}` reference expanded from the environment.
    pub fn redis_url(&self) -> Result<String> {
        expand_env(&self.redis.url, FALLBACK_REDIS_URL)
    }
}

/// Expands a whole-value `${VAR}` reference. An unset `REDIS_URL` falls back to localhost.
fn expand_env(value: &str, fallback: &str) -> Result<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        match std::env::var(var_name) {
            Ok(expanded) => Ok(expanded),
            Err(_) if var_name == "REDIS_URL" => Ok(fallback.to_string()),
            Err(_) => anyhow::bail!("Environment variable {var_name} not set"),
        }
    } else {
        Ok(value.to_string())
    }
}
