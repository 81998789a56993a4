// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default media host upload endpoint (Cloudinary API root).
const DEFAULT_MEDIA_UPLOAD_URL: &str = "https://api.cloudinary.com/v1_1";

/// Hostname every uploaded file URL must live on.
const DEFAULT_MEDIA_HOST: &str = "cloudinary.com";

/// The backend guarantees no timeout, so every request gets one.
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// CuraPets backend origin, e.g. `http://localhost:8000`
    pub api_base_url: String,
    /// Media host upload API root
    pub media_upload_url: String,
    /// Hostname uploaded file URLs must contain
    pub media_host: String,
    /// Directory for the durable token tier
    pub config_dir: PathBuf,
    /// Directory for the ephemeral token tier (cleared when the login session ends)
    pub session_dir: PathBuf,
    /// Per-request timeout
    pub http_timeout: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        let tmp = env::temp_dir();
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            media_upload_url: DEFAULT_MEDIA_UPLOAD_URL.to_string(),
            media_host: DEFAULT_MEDIA_HOST.to_string(),
            config_dir: tmp.join("curapets-test-config"),
            session_dir: tmp.join("curapets-test-session"),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_base_url(None)
    }

    /// Load configuration, taking the backend origin from `base_url` when given
    /// instead of `CURAPETS_API_BASE_URL`.
    pub fn from_env_with_base_url(base_url: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_base_url = match base_url {
            Some(url) => url.to_string(),
            None => env::var("CURAPETS_API_BASE_URL")
                .map_err(|_| ConfigError::Missing("CURAPETS_API_BASE_URL"))?,
        };

        let http_timeout_secs = match env::var("CURAPETS_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::Invalid {
                    name: "CURAPETS_HTTP_TIMEOUT_SECS",
                    value: raw,
                })?,
            Err(_) => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url)?,
            media_upload_url: env::var("CURAPETS_MEDIA_UPLOAD_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_MEDIA_UPLOAD_URL.to_string()),
            media_host: env::var("CURAPETS_MEDIA_HOST")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| DEFAULT_MEDIA_HOST.to_string()),
            config_dir: env::var("CURAPETS_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_config_dir()),
            session_dir: env::var("CURAPETS_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_dir()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// Override the backend origin.
    pub fn with_api_base_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(url)?;
        Ok(self)
    }

    /// Websocket origin derived from the backend origin (`http` → `ws`).
    pub fn ws_base_url(&self) -> String {
        if let Some(rest) = self.api_base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.api_base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.api_base_url.clone()
        }
    }

    /// Path of the durable token tier file.
    pub fn durable_token_path(&self) -> PathBuf {
        self.config_dir.join("session.json")
    }

    /// Path of the ephemeral token tier file.
    pub fn ephemeral_token_path(&self) -> PathBuf {
        self.session_dir.join("session.json")
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Invalid {
            name: "CURAPETS_API_BASE_URL",
            value: raw.to_string(),
        });
    }
    Ok(url.to_string())
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("curapets")
}

/// The runtime dir is wiped at logout on most desktops, matching a browser session.
fn default_session_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(env::temp_dir)
        .join("curapets")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("CURAPETS_API_BASE_URL", "https://api.curapets.test/");
        env::set_var("CURAPETS_HTTP_TIMEOUT_SECS", "12");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_base_url, "https://api.curapets.test");
        assert_eq!(config.http_timeout, Duration::from_secs(12));
        assert_eq!(config.ws_base_url(), "wss://api.curapets.test");
    }

    #[test]
    fn test_base_url_must_be_http() {
        let result = Config::default().with_api_base_url("localhost:8000");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_ws_url_for_plain_http() {
        let config = Config::default();
        assert_eq!(config.ws_base_url(), "ws://localhost:8000");
    }
}
