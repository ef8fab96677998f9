//! # Tickwatch Core
//!
//! Polling quote client: fetch the latest quote for one ticker on a fixed
//! interval, normalize it, and report freshness and failures to a consumer.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Concrete data sources (Alpha Vantage `GLOBAL_QUOTE`) |
//! | [`config`] | Poller and source configuration, environment loading |
//! | [`data_source`] | Data source trait and raw response type |
//! | [`domain`] | Symbol, Quote and FetchState |
//! | [`error`] | Validation and control errors |
//! | [`fetch`] | One fetch-and-normalize attempt |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`normalize`] | Raw response to `Quote` conversion |
//! | [`poller`] | Polling cycle management and observer notification |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐        ┌──────────────────┐
//! │  QuotePoller    │───────▶│ QuoteObserver    │
//! │  (one cycle)    │ state  │ (presentation)   │
//! └────────┬────────┘        └──────────────────┘
//!          │ fetch_quote
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ DataSource      │────▶│ HttpClient       │
//! │ (AlphaVantage)  │     │ (reqwest)        │
//! └────────┬────────┘     └──────────────────┘
//!          │ raw JSON
//!          ▼
//! ┌─────────────────┐
//! │ normalize       │──▶ Quote | FetchError
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Runtime failures never escape the poller; they arrive as
//! [`FetchState::Failed`] with a [`FetchErrorKind`]:
//!
//! ```rust
//! use tickwatch_core::{FetchErrorKind, FetchState};
//!
//! fn describe(state: &FetchState) -> &'static str {
//!     match state.failure_kind() {
//!         Some(FetchErrorKind::Transport) => "network problem, will retry on next tick",
//!         Some(FetchErrorKind::Upstream) => "no data for this symbol",
//!         Some(FetchErrorKind::Parse) => "unexpected response shape",
//!         None => "ok",
//!     }
//! }
//! ```
//!
//! Invalid configuration (blank symbol, zero interval) is rejected
//! synchronously with a [`ValidationError`].

pub mod adapters;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod normalize;
pub mod poller;

pub use adapters::AlphaVantageSource;

pub use config::{AlphaVantageConfig, PollerConfig};

pub use data_source::{DataSource, RawResponse, TransportError};

pub use domain::{FetchError, FetchErrorKind, FetchState, Quote, Symbol};

pub use error::{PollerError, ValidationError};

pub use fetch::fetch_quote;

pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

pub use normalize::normalize_global_quote;

pub use poller::{PollerSnapshot, QuoteObserver, QuotePoller};
