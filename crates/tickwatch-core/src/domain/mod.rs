//! # Domain Models
//!
//! Validated value types shared by the data sources, the normalizer and the
//! poller.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Subscription key, trimmed and uppercased |
//! | [`Quote`] | Price, change and change percent for a symbol |
//! | [`FetchState`] | `Loading`, `Ready(Quote)` or `Failed(FetchError)` |
//! | [`FetchError`] | Failure kind plus message for one attempt |
//!
//! Construction validates invariants, so a `Quote` is never partially filled:
//!
//! ```rust
//! use tickwatch_core::{Quote, Symbol, ValidationError};
//!
//! let symbol = Symbol::parse("aapl").unwrap();
//! let quote = Quote::new(symbol, 150.25, -1.5, "-0.99%").unwrap();
//! assert_eq!(quote.symbol.as_str(), "AAPL");
//!
//! let invalid = Quote::new(Symbol::parse("AAPL").unwrap(), f64::NAN, 0.0, "0%");
//! assert!(matches!(invalid, Err(ValidationError::NonFiniteValue { .. })));
//! ```

mod fetch_state;
mod quote;
mod symbol;

pub use fetch_state::{FetchError, FetchErrorKind, FetchState};
pub use quote::Quote;
pub use symbol::Symbol;
