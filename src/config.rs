//! Runtime configuration from environment variables

use std::time::Duration;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 256;
const DEFAULT_NAMING_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Longest image side after downscaling, before sampling
    pub max_image_dimension: u32,
    /// Remote naming endpoint; the local pigment catalog is used when unset
    pub naming_service_url: Option<String>,
    pub naming_api_key: Option<String>,
    pub naming_timeout: Duration,
    /// How long an idle session's run token is remembered
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; missing or unparseable values use defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parsed = |key: &str| non_empty(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_image_dimension: non_empty("MAX_IMAGE_DIMENSION")
                .and_then(|v| v.parse().ok())
                .filter(|&v: &u32| v > 0)
                .unwrap_or(DEFAULT_MAX_IMAGE_DIMENSION),
            naming_service_url: non_empty("NAMING_SERVICE_URL"),
            naming_api_key: non_empty("NAMING_API_KEY"),
            naming_timeout: Duration::from_secs(
                parsed("NAMING_TIMEOUT_SECS").unwrap_or(DEFAULT_NAMING_TIMEOUT_SECS),
            ),
            session_ttl: Duration::from_secs(
                parsed("SESSION_TTL_SECS").unwrap_or(DEFAULT_SESSION_TTL_SECS),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
