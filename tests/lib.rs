//! Shared transport doubles and fixture payloads for the behavior suites.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cryptick_core::{
    CascadeBuilder, HttpClient, HttpError, HttpRequest, HttpResponse, ProviderCascade,
};

pub const PRIMARY_TEST_URL: &str = "http://primary.test/api";
pub const EXCHANGE_TEST_URL: &str = "http://exchange.test";
pub const INDEX_TEST_URL: &str = "http://index.test";

/// Scripted transport: the first rule whose pattern is a substring of the
/// request URL answers. Unmatched requests behave like a dead network.
pub struct ScriptedHttpClient {
    rules: Vec<(String, Result<HttpResponse, HttpError>)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_success(mut self, pattern: impl Into<String>, body: impl Into<String>) -> Self {
        self.rules
            .push((pattern.into(), Ok(HttpResponse::ok_json(body.into()))));
        self
    }

    pub fn on_status(
        mut self,
        pattern: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.rules.push((
            pattern.into(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        ));
        self
    }

    pub fn on_failure(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules
            .push((pattern.into(), Err(HttpError::new(message.into()))));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.url.contains(pattern))
            .count()
    }
}

impl Default for ScriptedHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .rules
            .iter()
            .find(|(pattern, _)| request.url.contains(pattern))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| {
                Err(HttpError::new(format!(
                    "no scripted response for {}",
                    request.url
                )))
            });

        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);

        Box::pin(async move { response })
    }
}

/// Cascade wired to the scripted transport with test base URLs.
pub fn cascade_with(client: Arc<ScriptedHttpClient>) -> ProviderCascade {
    CascadeBuilder::new()
        .with_primary_url(PRIMARY_TEST_URL)
        .with_exchange_url(EXCHANGE_TEST_URL)
        .with_index_url(INDEX_TEST_URL)
        .with_http_client(client)
        .build()
}

pub const PRIMARY_MARKETS_BODY: &str = r#"[
    {"symbol":"BTC","name":"Bitcoin","priceUsd":50000.12,"change24hPct":2.5,"volume24hUsd":28000000000.0,"marketCapUsd":980000000000.0},
    {"symbol":"ETH","name":"Ethereum","priceUsd":2650.4,"change24hPct":-1.1,"volume24hUsd":12000000000.0,"marketCapUsd":320000000000.0},
    {"symbol":"XRP","name":"XRP","priceUsd":0.52,"change24hPct":0.3,"volume24hUsd":900000000.0,"marketCapUsd":28000000000.0}
]"#;

pub const PRIMARY_PREDICTION_BODY: &str = r#"{
    "symbol":"BTC",
    "horizon":"1W",
    "predictedPriceUsd":51250.75,
    "confidencePct":71.0,
    "direction":"up",
    "lastModelRun":"2024-03-01T12:00:00Z"
}"#;

pub const EXCHANGE_TICKER_BODY: &str = r#"[
    {"symbol":"BTCUSDT","lastPrice":"50000.12","priceChangePercent":"2.500","quoteVolume":"28123456789.12"},
    {"symbol":"ETHUSDT","lastPrice":"2650.40","priceChangePercent":"-1.100","quoteVolume":"12123456789.00"},
    {"symbol":"XRPUSDT","lastPrice":"0.5200","priceChangePercent":"0.300","quoteVolume":"912345678.00"}
]"#;

/// Two klines whose closes move 100 -> 110 (momentum 0.1).
pub const EXCHANGE_KLINES_BODY: &str = r#"[
    [1704067200000, "100.0", "101.0", "99.0", "100.0", "1234.5", 1704070799999],
    [1704070800000, "110.0", "111.0", "109.0", "110.0", "2234.5", 1704074399999]
]"#;

pub const INDEX_MARKETS_BODY: &str = r#"[
    {"id":"bitcoin","name":"Bitcoin","current_price":50000.12,"price_change_percentage_24h":2.5,"total_volume":28000000000.0,"market_cap":980000000000.0},
    {"id":"ethereum","name":"Ethereum","current_price":2650.4,"price_change_percentage_24h":-1.1,"total_volume":12000000000.0,"market_cap":320000000000.0},
    {"id":"ripple","name":"XRP","current_price":0.52,"price_change_percentage_24h":null,"total_volume":null,"market_cap":28000000000.0}
]"#;

pub const INDEX_CHART_BODY: &str = r#"{
    "prices": [
        [1704067200000, 2500.5],
        [1704070800000, 2520.25],
        [1704074400000, 2510.75]
    ]
}"#;
