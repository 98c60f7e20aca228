//! Client configuration.
//!
//! Values come from the environment (`GREENIFY_SERVER`, `GREENIFY_DATA_DIR`)
//! and can be overridden from the command line.

use std::path::PathBuf;

/// Server used when `GREENIFY_SERVER` is unset
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// Directory name under `$HOME` holding client state
pub const DATA_DIR_NAME: &str = ".greenify";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the backend, without a trailing slash
    pub server_url: String,
    /// Directory holding the persisted token
    pub data_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_url = lookup("GREENIFY_SERVER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let data_dir = lookup("GREENIFY_DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Self {
            server_url: normalize_url(server_url),
            data_dir,
        }
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn with_overrides(mut self, server_url: Option<String>, data_dir: Option<PathBuf>) -> Self {
        if let Some(url) = server_url {
            self.server_url = normalize_url(url);
        }
        if let Some(dir) = data_dir {
            self.data_dir = dir;
        }
        self
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DATA_DIR_NAME))
}

fn normalize_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
