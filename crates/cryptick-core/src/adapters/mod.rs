//! Provider adapters.
//!
//! One module per upstream: the primary internal API (canonical JSON), the
//! exchange-ticker provider (string-encoded numerics, positional kline
//! arrays), and the aggregator-index provider (single price points, no
//! prediction endpoint). Each adapter resolves canonical identifiers through
//! its own static table, builds the provider query, delegates to the
//! transport, and normalizes the raw payload before returning.

mod exchange;
mod index;
mod primary;

pub use exchange::{ExchangeTickerAdapter, DEFAULT_EXCHANGE_URL};
pub use index::{AggregatorIndexAdapter, DEFAULT_INDEX_URL};
pub use primary::{PrimaryApiAdapter, DEFAULT_PRIMARY_URL};

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::http_client::{upstream_message, HttpClient, HttpRequest};
use crate::provider::{ProviderError, ProviderId};

/// One GET against an upstream, decoded into the provider's payload type.
///
/// Every failure mode here is transport-class: network errors, non-success
/// statuses (with the best human-readable message the body yields), and
/// bodies that do not decode as the expected shape.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    http_client: &Arc<dyn HttpClient>,
    provider: ProviderId,
    url: &str,
    timeout_ms: u64,
) -> Result<T, ProviderError> {
    tracing::debug!(provider = %provider, url, "issuing upstream request");

    let request = HttpRequest::get(url).with_timeout_ms(timeout_ms);
    let response = http_client.execute(request).await.map_err(|error| {
        ProviderError::transport(format!("{provider} transport error: {}", error.message()))
    })?;

    if !response.is_success() {
        return Err(ProviderError::transport(format!(
            "{provider} returned status {}: {}",
            response.status,
            upstream_message(response.status, &response.body)
        )));
    }

    serde_json::from_str(&response.body).map_err(|error| {
        ProviderError::transport(format!("failed to decode {provider} response: {error}"))
    })
}
