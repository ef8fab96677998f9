//! Poller and source configuration.
//!
//! Defaults match the stock widget this client drives: poll `AAPL` every five
//! minutes against the Alpha Vantage free tier. Every value can be overridden
//! from the environment:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TICKWATCH_SYMBOL` | `AAPL` |
//! | `TICKWATCH_INTERVAL_SECS` | `300` |
//! | `TICKWATCH_ALPHAVANTAGE_API_KEY` | `demo` |
//! | `TICKWATCH_ALPHAVANTAGE_URL` | `https://www.alphavantage.co/query` |
//! | `TICKWATCH_TIMEOUT_MS` | `5000` |

use std::time::Duration;

use crate::{Symbol, ValidationError};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const DEFAULT_ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

pub const ENV_SYMBOL: &str = "TICKWATCH_SYMBOL";
pub const ENV_INTERVAL_SECS: &str = "TICKWATCH_INTERVAL_SECS";
pub const ENV_API_KEY: &str = "TICKWATCH_ALPHAVANTAGE_API_KEY";
pub const ENV_BASE_URL: &str = "TICKWATCH_ALPHAVANTAGE_URL";
pub const ENV_TIMEOUT_MS: &str = "TICKWATCH_TIMEOUT_MS";

/// Cycle parameters for [`QuotePoller`](crate::QuotePoller).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub initial_symbol: Symbol,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            initial_symbol: Symbol::from_static(DEFAULT_SYMBOL),
        }
    }
}

impl PollerConfig {
    pub fn new(initial_symbol: &str, interval: Duration) -> Result<Self, ValidationError> {
        Ok(Self {
            interval: validate_interval(interval)?,
            initial_symbol: Symbol::parse(initial_symbol)?,
        })
    }

    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_SYMBOL) {
            config.initial_symbol = Symbol::parse(&raw)?;
        }
        if let Some(raw) = lookup(ENV_INTERVAL_SECS) {
            let secs = parse_u64(ENV_INTERVAL_SECS, &raw)?;
            config.interval = validate_interval(Duration::from_secs(secs))?;
        }
        Ok(config)
    }
}

/// Connection settings for [`AlphaVantageSource`](crate::AlphaVantageSource).
#[derive(Clone, PartialEq, Eq)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: String::from("demo"),
            base_url: String::from(DEFAULT_ALPHAVANTAGE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AlphaVantageConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(key) = lookup(ENV_API_KEY).filter(|key| !key.trim().is_empty()) {
            config.api_key = key.trim().to_owned();
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            let url = url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::InvalidConfig {
                    key: ENV_BASE_URL,
                    value: url.to_owned(),
                });
            }
            config.base_url = url.to_owned();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let timeout_ms = parse_u64(ENV_TIMEOUT_MS, &raw)?;
            if timeout_ms == 0 {
                return Err(ValidationError::InvalidConfig {
                    key: ENV_TIMEOUT_MS,
                    value: raw,
                });
            }
            config.timeout_ms = timeout_ms;
        }
        Ok(config)
    }
}

// The API key stays out of debug output and therefore out of logs.
impl std::fmt::Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

pub fn validate_interval(interval: Duration) -> Result<Duration, ValidationError> {
    if interval.is_zero() {
        Err(ValidationError::NonPositiveInterval)
    } else {
        Ok(interval)
    }
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ValidationError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ValidationError::InvalidConfig {
            key,
            value: raw.to_owned(),
        })
}
