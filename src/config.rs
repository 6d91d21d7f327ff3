use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:3000/api";
const DEFAULT_PREFS_URL: &str = "sqlite://creche-prefs.db?mode=rwc";
const DEFAULT_STAFF_LIMIT: u32 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STUB_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub prefs_url: String,
    pub staff_limit: u32,
    pub http_timeout: Duration,
    pub stub_addr: SocketAddr,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            prefs_url: DEFAULT_PREFS_URL.to_string(),
            staff_limit: DEFAULT_STAFF_LIMIT,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            stub_addr: DEFAULT_STUB_ADDR,
        }
    }
}

impl AppConfig {
    /// Reads the `CRECHE_*` variables; call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let api_url = env::var("CRECHE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let prefs_url =
            env::var("CRECHE_PREFS_URL").unwrap_or_else(|_| DEFAULT_PREFS_URL.to_string());
        let staff_limit = parse_var("CRECHE_STAFF_LIMIT", DEFAULT_STAFF_LIMIT)?;
        let timeout_secs = parse_var("CRECHE_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let stub_addr = parse_var("CRECHE_STUB_ADDR", DEFAULT_STUB_ADDR)?;

        Ok(Self {
            api_url,
            prefs_url,
            staff_limit,
            http_timeout: Duration::from_secs(timeout_secs),
            stub_addr,
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
