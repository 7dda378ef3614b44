use std::env;
use std::time::Duration;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const HOST: &str = "NOTES_HOST";
    pub const PORT: &str = "NOTES_PORT";
    pub const REDIS_URL: &str = "REDIS_URL";
    /// "redis" (default) or "memory" for a process-local store
    pub const STORE: &str = "NOTES_STORE";
    /// Per-request budget for store round-trips, in milliseconds
    pub const STORE_TIMEOUT_MS: &str = "NOTES_STORE_TIMEOUT_MS";
}

/// Default values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 1234;
    pub const REDIS_URL: &str = "redis://127.0.0.1:6379/0";
    pub const STORE_TIMEOUT_MS: u64 = 2000;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Which store backend the service runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Redis => "redis",
            StoreBackend::Memory => "memory",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Some(StoreBackend::Redis),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub redis_url: String,
    pub store: StoreBackend,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup(env_vars::PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: env_vars::PORT,
                expected: "a valid port number",
                value: raw,
            })?,
            None => defaults::PORT,
        };

        let store = match lookup(env_vars::STORE) {
            Some(raw) => StoreBackend::from_str(&raw).ok_or(ConfigError::Invalid {
                var: env_vars::STORE,
                expected: "\"redis\" or \"memory\"",
                value: raw,
            })?,
            None => StoreBackend::Redis,
        };

        let store_timeout_ms = match lookup(env_vars::STORE_TIMEOUT_MS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Invalid {
                    var: env_vars::STORE_TIMEOUT_MS,
                    expected: "a positive number of milliseconds",
                    value: raw,
                })?,
            None => defaults::STORE_TIMEOUT_MS,
        };

        Ok(Self {
            host: lookup(env_vars::HOST).unwrap_or_else(|| defaults::HOST.to_string()),
            port,
            redis_url: lookup(env_vars::REDIS_URL)
                .unwrap_or_else(|| defaults::REDIS_URL.to_string()),
            store,
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
