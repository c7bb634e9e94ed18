//! Server configuration from environment variables

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CHALLENGE_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// JSON word list used for size reporting
    pub dictionary_path: PathBuf,
    /// Directory served as the web client
    pub static_dir: PathBuf,
    /// How long a challenge stays open before the forced decision
    pub challenge_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            dictionary_path: PathBuf::from("data/words.json"),
            static_dir: PathBuf::from("static"),
            challenge_timeout: Duration::from_secs(DEFAULT_CHALLENGE_SECS),
        }
    }
}

/// Read and parse an env var, warning and returning None when it is malformed
fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={:?}, using default", name, raw);
            None
        }
    }
}

impl AppConfig {
    /// Load config from environment variables
    /// PORT, BIND_ADDR, DICTIONARY_PATH, STATIC_DIR, CHALLENGE_TIMEOUT_SECS
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let challenge_secs = match parse_var::<u64>("CHALLENGE_TIMEOUT_SECS") {
            Some(0) => {
                tracing::warn!("CHALLENGE_TIMEOUT_SECS must be at least 1, using default");
                DEFAULT_CHALLENGE_SECS
            }
            Some(secs) => secs,
            None => DEFAULT_CHALLENGE_SECS,
        };

        Self {
            bind_addr: parse_var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("PORT").unwrap_or(defaults.port),
            dictionary_path: parse_var("DICTIONARY_PATH").unwrap_or(defaults.dictionary_path),
            static_dir: parse_var("STATIC_DIR").unwrap_or(defaults.static_dir),
            challenge_timeout: Duration::from_secs(challenge_secs),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
