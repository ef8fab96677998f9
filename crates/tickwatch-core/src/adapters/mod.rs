//! Concrete [`DataSource`](crate::DataSource) implementations.

mod alphavantage;

pub use alphavantage::AlphaVantageSource;
