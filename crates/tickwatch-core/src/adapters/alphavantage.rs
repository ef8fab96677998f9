use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::config::AlphaVantageConfig;
use crate::data_source::{DataSource, RawResponse, TransportError};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{Symbol, ValidationError};

/// `GLOBAL_QUOTE` source for the Alpha Vantage REST API.
#[derive(Clone)]
pub struct AlphaVantageSource {
    http_client: Arc<dyn HttpClient>,
    config: AlphaVantageConfig,
}

impl AlphaVantageSource {
    pub fn new(config: AlphaVantageConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: AlphaVantageConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    pub fn from_env() -> Result<Self, ValidationError> {
        Ok(Self::new(AlphaVantageConfig::from_env()?))
    }

    pub fn config(&self) -> &AlphaVantageConfig {
        &self.config
    }

    fn quote_url(&self, symbol: &Symbol) -> String {
        let separator = if self.config.base_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{separator}function=GLOBAL_QUOTE&symbol={}&apikey={}",
            self.config.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.config.api_key),
        )
    }
}

impl DataSource for AlphaVantageSource {
    fn id(&self) -> &'static str {
        "alphavantage"
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + 'a>> {
        Box::pin(async move {
            let request = HttpRequest::get(self.quote_url(symbol))
                .with_header("accept", "application/json")
                .with_timeout_ms(self.config.timeout_ms);

            let response = self.http_client.execute(request).await.map_err(|e| {
                debug!(%symbol, timed_out = e.timed_out(), "alphavantage request failed");
                TransportError::new(format!("alphavantage transport error: {}", e.message()))
            })?;

            if !response.is_success() {
                return Err(TransportError::new(format!(
                    "alphavantage returned status {}",
                    response.status
                )));
            }

            debug!(%symbol, bytes = response.body.len(), "alphavantage response received");

            serde_json::from_str(&response.body).map_err(|e| {
                TransportError::new(format!("alphavantage returned a non-JSON body: {e}"))
            })
        })
    }
}
