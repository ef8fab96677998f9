//! Conversion of a raw `GLOBAL_QUOTE` response into a [`Quote`].
//!
//! The upstream documents every field as a string (`"05. price": "150.2500"`),
//! but proxies and fixtures regularly hand back plain JSON numbers. Both forms
//! are accepted; anything else is a parse failure.

use serde_json::{Map, Value};

use crate::data_source::RawResponse;
use crate::{FetchError, Quote, Symbol};

/// Top-level key whose presence marks a quote payload.
pub const QUOTE_MARKER: &str = "Global Quote";

const SYMBOL_FIELD: &str = "01. symbol";
const PRICE_FIELD: &str = "05. price";
const CHANGE_FIELD: &str = "09. change";
const CHANGE_PERCENT_FIELD: &str = "10. change percent";

/// Keys the upstream uses for diagnostics in place of a payload.
const DIAGNOSTIC_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Normalize a raw response into a fully-populated quote.
///
/// # Errors
///
/// - [`FetchErrorKind::Upstream`](crate::FetchErrorKind::Upstream) when the
///   marker object is absent or empty.
/// - [`FetchErrorKind::Parse`](crate::FetchErrorKind::Parse) when a required
///   field is missing or cannot be coerced, including a `"01. symbol"` that is
///   not a valid [`Symbol`].
pub fn normalize_global_quote(raw: &RawResponse) -> Result<Quote, FetchError> {
    let payload = match raw.get(QUOTE_MARKER) {
        Some(Value::Object(payload)) if !payload.is_empty() => payload,
        Some(Value::Object(_)) => {
            return Err(FetchError::upstream(
                "upstream returned an empty quote for this symbol",
            ))
        }
        Some(other) => {
            return Err(FetchError::parse(format!(
                "'{QUOTE_MARKER}' must be an object, got {}",
                json_type(other)
            )))
        }
        None => return Err(FetchError::upstream(upstream_diagnostic(raw))),
    };

    // Quote symbols share the subscription key rules, so a `Quote` always
    // round-trips through serde.
    let symbol = text_field(payload, SYMBOL_FIELD)?;
    let symbol = Symbol::parse(&symbol)
        .map_err(|e| FetchError::parse(format!("field '{SYMBOL_FIELD}': {e}")))?;
    let price = numeric_field(payload, PRICE_FIELD)?;
    let change = numeric_field(payload, CHANGE_FIELD)?;
    let change_percent = text_field(payload, CHANGE_PERCENT_FIELD)?;

    Quote::new(symbol, price, change, change_percent).map_err(|e| FetchError::parse(e.to_string()))
}

fn upstream_diagnostic(raw: &RawResponse) -> String {
    DIAGNOSTIC_KEYS
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
        .map(|text| format!("upstream returned no quote: {}", text.trim()))
        .unwrap_or_else(|| format!("response has no '{QUOTE_MARKER}' object"))
}

fn required<'a>(payload: &'a Map<String, Value>, field: &str) -> Result<&'a Value, FetchError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(FetchError::parse(format!(
            "missing required field '{field}'"
        ))),
        Some(value) => Ok(value),
    }
}

fn numeric_field(payload: &Map<String, Value>, field: &str) -> Result<f64, FetchError> {
    let value = required(payload, field)?;
    coerce_f64(value).ok_or_else(|| {
        FetchError::parse(format!(
            "field '{field}' is not numeric: {}",
            truncate(&value.to_string())
        ))
    })
}

fn text_field(payload: &Map<String, Value>, field: &str) -> Result<String, FetchError> {
    match required(payload, field)? {
        Value::String(text) if !text.trim().is_empty() => Ok(text.trim().to_owned()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(FetchError::parse(format!(
            "field '{field}' must be non-empty text, got {}",
            json_type(other)
        ))),
    }
}

/// Numbers pass through; numeric strings are parsed after trimming.
/// Non-finite results (`"NaN"`, `"inf"`) are rejected.
fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        text.to_owned()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{head}...")
    }
}
