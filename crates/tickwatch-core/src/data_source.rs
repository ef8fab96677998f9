//! Data source contract consumed by the poller.
//!
//! A [`DataSource`] performs one transport round trip for a symbol and hands
//! back the decoded response body untouched. Deciding whether that body holds
//! a usable quote is the job of [`crate::normalize`], so sources stay free of
//! quote-shape knowledge and tests can feed arbitrary payloads.
//!
//! ```rust,ignore
//! use tickwatch_core::{DataSource, RawResponse, Symbol, TransportError};
//!
//! struct Fixed(RawResponse);
//!
//! impl DataSource for Fixed {
//!     fn id(&self) -> &'static str {
//!         "fixed"
//!     }
//!
//!     fn fetch<'a>(
//!         &'a self,
//!         _symbol: &'a Symbol,
//!     ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>> {
//!         let body = self.0.clone();
//!         Box::pin(async move { Ok(body) })
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::Symbol;

/// Loosely-typed response body as returned by the upstream service.
pub type RawResponse = serde_json::Value;

/// The request did not yield a usable response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TransportError {}

/// Source of raw quote responses.
///
/// Implementations must be `Send + Sync`; the poller shares one instance
/// across every cycle it runs.
pub trait DataSource: Send + Sync {
    /// Short identifier used in log events.
    fn id(&self) -> &'static str;

    /// Fetch the raw response for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response body could be obtained:
    /// network failure, timeout, non-success status or an undecodable body.
    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>>;
}
