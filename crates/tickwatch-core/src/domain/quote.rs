use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Normalized latest-price record for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub price: f64,
    pub change: f64,
    /// Upstream-formatted percentage, e.g. `"-0.99%"`.
    pub change_percent: String,
}

impl Quote {
    pub fn new(
        symbol: Symbol,
        price: f64,
        change: f64,
        change_percent: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        validate_finite("price", price)?;
        validate_finite("change", change)?;

        Ok(Self {
            symbol,
            price,
            change,
            change_percent: change_percent.into(),
        })
    }

    pub fn is_gain(&self) -> bool {
        self.change >= 0.0
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteValue { field })
    }
}
