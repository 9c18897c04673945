use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

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

/// Default base URL for the exchange-ticker provider.
pub const DEFAULT_EXCHANGE_URL: &str = "https://api.binance.com/api/v3";

/// Adapter for the exchange-ticker provider.
///
/// The upstream reports numerics as decimal strings and kline rows as
/// fixed-position arrays; it never reports market capitalization, so
/// snapshots carry `market_cap_usd == 0`. Calls are guarded by a local rate
/// budget; an exhausted budget fails the attempt as retryable so the
/// cascade advances.
pub struct ExchangeTickerAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    pairs: HashMap<AssetSymbol, String>,
    throttling: ThrottlingQueue,
}

impl ExchangeTickerAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            pairs: default_pair_table(),
            throttling: ThrottlingQueue::from_policy(&ProviderPolicy::exchange_ticker_default()),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_pair_table(mut self, pairs: HashMap<AssetSymbol, String>) -> Self {
        self.pairs = pairs;
        self
    }

    pub fn with_throttling(mut self, throttling: ThrottlingQueue) -> Self {
        self.throttling = throttling;
        self
    }

    fn resolve(&self, symbol: AssetSymbol) -> Result<&str, ProviderError> {
        self.pairs.get(&symbol).map(String::as_str).ok_or_else(|| {
            ProviderError::configuration(format!(
                "symbol '{symbol}' is not configured for exchange_ticker"
            ))
        })
    }

    fn acquire_budget(&self) -> Result<(), ProviderError> {
        self.throttling.acquire().map_err(|delay| {
            ProviderError::rate_limited(format!(
                "exchange_ticker rate budget exhausted; retry in {:.2}s",
                delay.as_secs_f64()
            ))
        })
    }
}

impl MarketDataProvider for ExchangeTickerAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::ExchangeTicker
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, true, false)
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketSnapshot>, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let pairs = req
                .symbols
                .iter()
                .map(|&symbol| self.resolve(symbol).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;

            self.acquire_budget()?;

            let symbols_param = serde_json::to_string(&pairs)
                .map_err(|error| ProviderError::transport(error.to_string()))?;
            let url = format!(
                "{}/ticker/24hr?symbols={}",
                self.base_url,
                urlencoding::encode(&symbols_param)
            );

            let payloads: Vec<ExchangeTickerPayload> =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;
            self.throttling.complete_one();

            req.symbols
                .iter()
                .zip(pairs.iter())
                .map(|(&symbol, pair)| {
                    let payload = payloads
                        .iter()
                        .find(|payload| payload.symbol == *pair)
                        .ok_or_else(|| {
                            ProviderError::transport(format!(
                                "exchange_ticker response is missing ticker '{pair}'"
                            ))
                        })?;
                    normalize_ticker(symbol, payload)
                })
                .collect()
        })
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CandleSeries, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let pair = self.resolve(req.symbol)?.to_owned();
            self.acquire_budget()?;

            let (interval, limit) = kline_params(req.timeframe);
            let url = format!(
                "{}/klines?symbol={}&interval={}&limit={}",
                self.base_url, pair, interval, limit
            );

            let rows: Vec<Vec<Value>> =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;
            self.throttling.complete_one();

            let mut candles = rows
                .iter()
                .map(|row| normalize_kline_row(row))
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

/// Trading-pair identifiers for the tracked catalog.
fn default_pair_table() -> HashMap<AssetSymbol, String> {
    [
        (AssetSymbol::Btc, "BTCUSDT"),
        (AssetSymbol::Eth, "ETHUSDT"),
        (AssetSymbol::Xrp, "XRPUSDT"),
    ]
    .into_iter()
    .map(|(symbol, pair)| (symbol, pair.to_owned()))
    .collect()
}

/// Kline interval/sample-count pair for a timeframe. Sample counts stay under
/// the provider's 1000-row cap.
const fn kline_params(timeframe: Timeframe) -> (&'static str, u32) {
    match timeframe {
        Timeframe::OneDay => ("15m", 96),
        Timeframe::OneWeek => ("1h", 168),
        Timeframe::OneMonth => ("12h", 60),
        Timeframe::ThreeMonths => ("1d", 90),
        Timeframe::OneYear => ("1w", 52),
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ExchangeTickerPayload {
    symbol: String,
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "priceChangePercent")]
    price_change_percent: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: String,
}

fn normalize_ticker(
    symbol: AssetSymbol,
    payload: &ExchangeTickerPayload,
) -> Result<MarketSnapshot, ProviderError> {
    let price_usd = parse_decimal("lastPrice", &payload.last_price)?;
    let change_24h_pct = parse_decimal("priceChangePercent", &payload.price_change_percent)?;
    let volume_24h_usd = parse_decimal("quoteVolume", &payload.quote_volume)?;

    // The exchange does not report capitalization; 0 means unknown.
    MarketSnapshot::new(
        symbol,
        symbol.display_name(),
        price_usd,
        change_24h_pct,
        volume_24h_usd,
        0.0,
    )
    .map_err(|error| {
        ProviderError::transport(format!("exchange_ticker payload failed validation: {error}"))
    })
}

/// One kline row: `[openTimeMs, open, high, low, close, …]` with prices as
/// strings. Trailing fields are ignored.
fn normalize_kline_row(row: &[Value]) -> Result<Candle, ProviderError> {
    if row.len() < 5 {
        return Err(ProviderError::transport(format!(
            "exchange_ticker kline row has {} fields, expected at least 5",
            row.len()
        )));
    }

    let open_time_ms = row[0].as_i64().ok_or_else(|| {
        ProviderError::transport("exchange_ticker kline openTime is not an integer")
    })?;
    let ts = UtcDateTime::from_unix_millis(open_time_ms)
        .map_err(|error| ProviderError::transport(error.to_string()))?;

    let open = decimal_value("open", &row[1])?;
    let high = decimal_value("high", &row[2])?;
    let low = decimal_value("low", &row[3])?;
    let close = decimal_value("close", &row[4])?;

    Candle::new(ts, open, high, low, close).map_err(|error| {
        ProviderError::transport(format!("exchange_ticker kline failed validation: {error}"))
    })
}

fn parse_decimal(field: &str, value: &str) -> Result<f64, ProviderError> {
    value.trim().parse::<f64>().map_err(|_| {
        ProviderError::transport(format!(
            "exchange_ticker field '{field}' is not a decimal: '{value}'"
        ))
    })
}

/// The provider mixes string-encoded and plain numerics across endpoints;
/// accept both.
fn decimal_value(field: &str, value: &Value) -> Result<f64, ProviderError> {
    match value {
        Value::String(text) => parse_decimal(field, text),
        Value::Number(number) => number.as_f64().ok_or_else(|| {
            ProviderError::transport(format!(
                "exchange_ticker field '{field}' is out of f64 range"
            ))
        }),
        other => Err(ProviderError::transport(format!(
            "exchange_ticker field '{field}' has unexpected type: {other}"
        ))),
    }
}
