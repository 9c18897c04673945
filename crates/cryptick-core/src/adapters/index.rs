use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use super::fetch_json;
use crate::http_client::{HttpClient, DEFAULT_TIMEOUT_MS};
use crate::provider::{
    CapabilitySet, HistoryRequest, MarketDataProvider, Operation, PredictionRequest,
    ProviderError, ProviderId, SnapshotsRequest,
};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::ThrottlingQueue;
use crate::{
    AssetSymbol, Candle, CandleSeries, MarketSnapshot, PredictionResult, Timeframe, UtcDateTime,
};

/// Default base URL for the aggregator-index provider.
pub const DEFAULT_INDEX_URL: &str = "https://api.coingecko.com/api/v3";

/// Adapter for the aggregator-index provider.
///
/// Assets are addressed by slug rather than ticker. The market-chart endpoint
/// serves `[timestamp, price]` pairs only, so history candles are synthesized
/// with `open == high == low == close`. There is no prediction endpoint.
pub struct AggregatorIndexAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    slugs: HashMap<AssetSymbol, String>,
    throttling: ThrottlingQueue,
}

impl AggregatorIndexAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            slugs: default_slug_table(),
            throttling: ThrottlingQueue::from_policy(&ProviderPolicy::aggregator_index_default()),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_slug_table(mut self, slugs: HashMap<AssetSymbol, String>) -> Self {
        self.slugs = slugs;
        self
    }

    pub fn with_throttling(mut self, throttling: ThrottlingQueue) -> Self {
        self.throttling = throttling;
        self
    }

    fn resolve(&self, symbol: AssetSymbol) -> Result<&str, ProviderError> {
        self.slugs.get(&symbol).map(String::as_str).ok_or_else(|| {
            ProviderError::configuration(format!(
                "symbol '{symbol}' is not configured for aggregator_index"
            ))
        })
    }

    fn acquire_budget(&self) -> Result<(), ProviderError> {
        self.throttling.acquire().map_err(|delay| {
            ProviderError::rate_limited(format!(
                "aggregator_index rate budget exhausted; retry in {:.2}s",
                delay.as_secs_f64()
            ))
        })
    }
}

impl MarketDataProvider for AggregatorIndexAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::AggregatorIndex
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, true, false)
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketSnapshot>, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let slugs = req
                .symbols
                .iter()
                .map(|&symbol| self.resolve(symbol).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;

            self.acquire_budget()?;

            let url = format!(
                "{}/coins/markets?vs_currency=usd&ids={}&price_change_percentage=24h",
                self.base_url,
                slugs.join(",")
            );

            let payloads: Vec<IndexMarketPayload> =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;
            self.throttling.complete_one();

            req.symbols
                .iter()
                .zip(slugs.iter())
                .map(|(&symbol, slug)| {
                    let payload = payloads
                        .iter()
                        .find(|payload| payload.id == *slug)
                        .ok_or_else(|| {
                            ProviderError::transport(format!(
                                "aggregator_index response is missing id '{slug}'"
                            ))
                        })?;
                    normalize_market(symbol, payload)
                })
                .collect()
        })
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CandleSeries, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let slug = self.resolve(req.symbol)?.to_owned();
            self.acquire_budget()?;

            let url = format!(
                "{}/coins/{}/market_chart?vs_currency=usd&days={}",
                self.base_url,
                slug,
                chart_days(req.timeframe)
            );

            let payload: IndexMarketChartPayload =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;
            self.throttling.complete_one();

            let mut candles = payload
                .prices
                .iter()
                .map(|&(ts_ms, price)| normalize_price_point(ts_ms, price))
                .collect::<Result<Vec<_>, _>>()?;
            candles.sort_by_key(|candle| candle.ts);

            Ok(CandleSeries::new(req.symbol, req.timeframe, candles))
        })
    }

    fn prediction<'a>(
        &'a self,
        req: PredictionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PredictionResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let _ = req;
            Err(ProviderError::unsupported_operation(Operation::Prediction))
        })
    }
}

/// Slug identifiers for the tracked catalog.
fn default_slug_table() -> HashMap<AssetSymbol, String> {
    [
        (AssetSymbol::Btc, "bitcoin"),
        (AssetSymbol::Eth, "ethereum"),
        (AssetSymbol::Xrp, "ripple"),
    ]
    .into_iter()
    .map(|(symbol, slug)| (symbol, slug.to_owned()))
    .collect()
}

/// Chart window in days for a timeframe.
const fn chart_days(timeframe: Timeframe) -> u32 {
    match timeframe {
        Timeframe::OneDay => 1,
        Timeframe::OneWeek => 7,
        Timeframe::OneMonth => 30,
        Timeframe::ThreeMonths => 90,
        Timeframe::OneYear => 365,
    }
}

#[derive(Debug, Clone, Deserialize)]
struct IndexMarketPayload {
    id: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    total_volume: Option<f64>,
    market_cap: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct IndexMarketChartPayload {
    prices: Vec<(i64, f64)>,
}

fn normalize_market(
    symbol: AssetSymbol,
    payload: &IndexMarketPayload,
) -> Result<MarketSnapshot, ProviderError> {
    let name = if payload.name.trim().is_empty() {
        symbol.display_name().to_owned()
    } else {
        payload.name.clone()
    };

    // Nullable fields default to 0, never passed through as absent.
    MarketSnapshot::new(
        symbol,
        name,
        payload.current_price.unwrap_or(0.0),
        payload.price_change_percentage_24h.unwrap_or(0.0),
        payload.total_volume.unwrap_or(0.0),
        payload.market_cap.unwrap_or(0.0),
    )
    .map_err(|error| {
        ProviderError::transport(format!(
            "aggregator_index payload failed validation: {error}"
        ))
    })
}

fn normalize_price_point(ts_ms: i64, price: f64) -> Result<Candle, ProviderError> {
    let ts = UtcDateTime::from_unix_millis(ts_ms)
        .map_err(|error| ProviderError::transport(error.to_string()))?;
    Candle::from_single_price(ts, price).map_err(|error| {
        ProviderError::transport(format!(
            "aggregator_index price point failed validation: {error}"
        ))
    })
}
