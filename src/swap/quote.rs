//! Swap-quote service client.
//!
//! The quote service decides routing; its response hands back the type
//! arguments and loosely-typed value arguments for the router's entry
//! function, which the marshaller converts positionally.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;

use crate::config::schema::SwapConfig;
use crate::swap::SwapError;

/// Request body sent to the quote service.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteRequest {
    #[serde(rename = "inputTokenType")]
    pub input_token_type: String,
    #[serde(rename = "outputTokenType")]
    pub output_token_type: String,
    #[serde(rename = "amountIn")]
    pub amount_in: u64,
}

/// Quote service response: everything needed to call the router.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    #[serde(rename = "typeArguments")]
    pub type_arguments: Vec<String>,
    pub arguments: Vec<serde_json::Value>,
}

/// HTTP client for the quote endpoint.
#[derive(Clone)]
pub struct QuoteClient {
    http: reqwest::Client,
    url: String,
    timeout_duration: Duration,
}

impl QuoteClient {
    pub fn new(config: &SwapConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: config.quote_url.clone(),
            timeout_duration: Duration::from_secs(config.quote_timeout_secs),
        }
    }

    /// Fetch a quote, bounded by the configured timeout.
    pub async fn fetch(&self, request: &QuoteRequest) -> Result<QuoteResponse, SwapError> {
        let secs = self.timeout_duration.as_secs();
        let response = timeout(
            self.timeout_duration,
            self.http.post(&self.url).json(request).send(),
        )
        .await
        .map_err(|_| SwapError::QuoteUnavailable(format!("quote request timed out after {secs}s")))?
        .map_err(|e| SwapError::QuoteUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SwapError::QuoteUnavailable(format!(
                "quote service returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SwapError::QuoteUnavailable(format!("malformed quote response: {e}")))
    }
}
