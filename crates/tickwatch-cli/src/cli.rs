//! CLI argument definitions for tickwatch.
//!
//! Every option falls back to its `TICKWATCH_*` environment variable and then
//! to the built-in default (`AAPL` every 300 seconds).
//!
//! # Examples
//!
//! ```bash
//! # Watch the default symbol
//! tickwatch
//!
//! # Watch MSFT every minute with an explicit key
//! tickwatch --symbol msft --interval-secs 60 --api-key "$ALPHAVANTAGE_KEY"
//! ```
//!
//! While running, type a symbol and press enter to switch; `quit` exits.

use clap::Parser;
use tickwatch_core::config::{
    ENV_API_KEY, ENV_BASE_URL, ENV_INTERVAL_SECS, ENV_SYMBOL, ENV_TIMEOUT_MS,
};
use tickwatch_core::{AlphaVantageConfig, PollerConfig, ValidationError};

/// Poll a stock quote and print every update.
#[derive(Debug, Parser)]
#[command(name = "tickwatch", author, version, about = "Poll a stock quote and print every update")]
pub struct Cli {
    /// Ticker to watch first [env: TICKWATCH_SYMBOL] [default: AAPL]
    #[arg(long, short = 's')]
    pub symbol: Option<String>,

    /// Seconds between refreshes [env: TICKWATCH_INTERVAL_SECS] [default: 300]
    #[arg(long, short = 'i')]
    pub interval_secs: Option<u64>,

    /// Alpha Vantage API key [env: TICKWATCH_ALPHAVANTAGE_API_KEY] [default: demo]
    #[arg(long)]
    pub api_key: Option<String>,

    /// Quote endpoint [env: TICKWATCH_ALPHAVANTAGE_URL]
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds [env: TICKWATCH_TIMEOUT_MS] [default: 5000]
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl Cli {
    pub fn poller_config(&self) -> Result<PollerConfig, ValidationError> {
        PollerConfig::from_lookup(|key| self.lookup(key))
    }

    pub fn source_config(&self) -> Result<AlphaVantageConfig, ValidationError> {
        AlphaVantageConfig::from_lookup(|key| self.lookup(key))
    }

    /// Flags win over the environment; both go through the same validation.
    fn lookup(&self, key: &str) -> Option<String> {
        let flag = match key {
            ENV_SYMBOL => self.symbol.clone(),
            ENV_INTERVAL_SECS => self.interval_secs.map(|secs| secs.to_string()),
            ENV_API_KEY => self.api_key.clone(),
            ENV_BASE_URL => self.base_url.clone(),
            ENV_TIMEOUT_MS => self.timeout_ms.map(|ms| ms.to_string()),
            _ => None,
        };
        flag.or_else(|| std::env::var(key).ok())
    }
}

/// One line typed while the poller is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Skip,
    Quit,
    Switch(&'a str),
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Self::Skip
        } else if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            Self::Quit
        } else {
            Self::Switch(line)
        }
    }
}
