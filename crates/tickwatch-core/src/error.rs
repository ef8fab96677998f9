use thiserror::Error;

/// Validation errors raised synchronously by configuration and cycle control.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("polling interval must be greater than zero")]
    NonPositiveInterval,

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },

    #[error("invalid value for {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}

/// Errors returned by [`QuotePoller`](crate::QuotePoller) control methods.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PollerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no tokio runtime is available to drive the polling cycle")]
    RuntimeUnavailable,
}
