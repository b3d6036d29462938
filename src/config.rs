//! Configuration from environment variables.
//!
//! `HOST`, `PORT`: where the admin server listens (default 0.0.0.0:8080).
//! `BACKEND_URL`: fixture service base URL; unset runs against the in-process store.
//! `BACKEND_API_KEY`: static key sent with every backend request.
//! `BACKEND_TIMEOUT_SECS`: request timeout; unset keeps the HTTP client default.

use std::env;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BackendConfig {
    pub url: Option<String>,
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: BackendConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            backend: BackendConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        Self {
            host: get("HOST").unwrap_or_else(default_host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            backend: BackendConfig {
                url: get("BACKEND_URL"),
                api_key: get("BACKEND_API_KEY").unwrap_or_default(),
                timeout_secs: get("BACKEND_TIMEOUT_SECS").and_then(|s| s.parse().ok()),
            },
        }
    }
}
