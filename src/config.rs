//! Store configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CREDENTIALS_URL: &str = "../static/data/admin_credentials.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_STORAGE_PATH: &str = "site_admin_storage.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Location of the credential JSON document.
    pub credentials_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Backing file for `JsonFileStorage` in native deployments.
    pub storage_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            credentials_url: DEFAULT_CREDENTIALS_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }
}

impl StoreConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// Optional:
    /// - `SITE_ADMIN_CREDENTIALS_URL`
    /// - `SITE_ADMIN_REQUEST_TIMEOUT_SECS`: default 10
    /// - `SITE_ADMIN_CONNECT_TIMEOUT_SECS`: default 5
    /// - `SITE_ADMIN_STORAGE_PATH`
    #[must_use]
    pub fn from_env() -> Self {
        let credentials_url = std::env::var("SITE_ADMIN_CREDENTIALS_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_URL.to_owned());
        let storage_path = std::env::var("SITE_ADMIN_STORAGE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from);

        Self {
            credentials_url,
            request_timeout: Duration::from_secs(env_parse("SITE_ADMIN_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)),
            connect_timeout: Duration::from_secs(env_parse("SITE_ADMIN_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)),
            storage_path,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
