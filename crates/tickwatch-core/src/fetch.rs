use tracing::{debug, warn};

use crate::data_source::DataSource;
use crate::normalize::normalize_global_quote;
use crate::{FetchError, Quote, Symbol};

/// Run one fetch-and-normalize attempt.
///
/// Every failure is folded into a [`FetchError`]; nothing is retried here.
pub async fn fetch_quote(source: &dyn DataSource, symbol: &Symbol) -> Result<Quote, FetchError> {
    debug!(source = source.id(), %symbol, "fetching quote");

    let raw = source.fetch(symbol).await.map_err(|error| {
        warn!(source = source.id(), %symbol, error = %error, "quote transport failed");
        FetchError::transport(error.message())
    })?;

    normalize_global_quote(&raw).inspect_err(|error| {
        warn!(
            source = source.id(),
            %symbol,
            kind = error.kind().code(),
            error = error.message(),
            "quote response rejected"
        );
    })
}
