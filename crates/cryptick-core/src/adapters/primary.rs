use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use super::fetch_json;
use crate::http_client::{HttpClient, DEFAULT_TIMEOUT_MS};
use crate::provider::{
    CapabilitySet, HistoryRequest, MarketDataProvider, PredictionRequest, ProviderError,
    ProviderId, SnapshotsRequest,
};
use crate::{
    AssetSymbol, Candle, CandleSeries, Direction, MarketSnapshot, PredictionResult, Timeframe,
    UtcDateTime, ValidationError,
};

/// Default base URL for the primary internal API.
pub const DEFAULT_PRIMARY_URL: &str = "http://localhost:4000/api";

/// Adapter for the primary internal API.
///
/// The upstream already speaks the canonical shape (camelCase JSON), so
/// normalization here is strict field mapping plus validation, so a schema
/// drift upstream fails the attempt instead of leaking through.
pub struct PrimaryApiAdapter {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    symbols: HashMap<AssetSymbol, String>,
}

impl PrimaryApiAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            symbols: default_symbol_table(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Replace the supported-symbol table. Symbols absent from the table fail
    /// with a configuration error before any network call.
    pub fn with_symbol_table(mut self, symbols: HashMap<AssetSymbol, String>) -> Self {
        self.symbols = symbols;
        self
    }

    fn resolve(&self, symbol: AssetSymbol) -> Result<&str, ProviderError> {
        self.symbols
            .get(&symbol)
            .map(String::as_str)
            .ok_or_else(|| {
                ProviderError::configuration(format!(
                    "symbol '{symbol}' is not configured for primary_api"
                ))
            })
    }
}

impl MarketDataProvider for PrimaryApiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::PrimaryApi
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn snapshots<'a>(
        &'a self,
        req: SnapshotsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketSnapshot>, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let ids = req
                .symbols
                .iter()
                .map(|&symbol| self.resolve(symbol).map(str::to_owned))
                .collect::<Result<Vec<_>, _>>()?;

            let url = format!("{}/markets?symbols={}", self.base_url, ids.join(","));
            let payloads: Vec<PrimaryMarketPayload> =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;

            payloads.into_iter().map(normalize_snapshot).collect()
        })
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CandleSeries, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let id = self.resolve(req.symbol)?;
            let url = format!(
                "{}/history?symbol={}&timeframe={}",
                self.base_url, id, req.timeframe
            );
            let payloads: Vec<PrimaryCandlePayload> =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;

            let candles = payloads
                .into_iter()
                .map(normalize_candle)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(CandleSeries::new(req.symbol, req.timeframe, candles))
        })
    }

    fn prediction<'a>(
        &'a self,
        req: PredictionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PredictionResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let id = self.resolve(req.symbol)?;
            let url = format!(
                "{}/prediction?symbol={}&timeframe={}",
                self.base_url, id, req.timeframe
            );
            let payload: PrimaryPredictionPayload =
                fetch_json(&self.http_client, self.id(), &url, self.timeout_ms).await?;

            normalize_prediction(payload)
        })
    }
}

fn default_symbol_table() -> HashMap<AssetSymbol, String> {
    AssetSymbol::ALL
        .into_iter()
        .map(|symbol| (symbol, symbol.as_str().to_owned()))
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryMarketPayload {
    symbol: String,
    name: String,
    price_usd: f64,
    change_24h_pct: f64,
    volume_24h_usd: f64,
    market_cap_usd: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PrimaryCandlePayload {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryPredictionPayload {
    symbol: String,
    horizon: String,
    predicted_price_usd: f64,
    confidence_pct: f64,
    direction: String,
    last_model_run: String,
}

fn normalize_snapshot(payload: PrimaryMarketPayload) -> Result<MarketSnapshot, ProviderError> {
    let symbol = AssetSymbol::from_str(&payload.symbol).map_err(validation_to_error)?;
    MarketSnapshot::new(
        symbol,
        payload.name,
        payload.price_usd,
        payload.change_24h_pct,
        payload.volume_24h_usd,
        payload.market_cap_usd,
    )
    .map_err(validation_to_error)
}

fn normalize_candle(payload: PrimaryCandlePayload) -> Result<Candle, ProviderError> {
    let ts = UtcDateTime::parse(&payload.timestamp).map_err(validation_to_error)?;
    Candle::new(ts, payload.open, payload.high, payload.low, payload.close)
        .map_err(validation_to_error)
}

fn normalize_prediction(
    payload: PrimaryPredictionPayload,
) -> Result<PredictionResult, ProviderError> {
    let symbol = AssetSymbol::from_str(&payload.symbol).map_err(validation_to_error)?;
    let horizon = Timeframe::from_str(&payload.horizon).map_err(validation_to_error)?;
    let generated_at = UtcDateTime::parse(&payload.last_model_run).map_err(validation_to_error)?;

    let direction = match payload.direction.as_str() {
        "up" => Direction::Up,
        "down" => Direction::Down,
        "flat" => Direction::Flat,
        other => {
            return Err(ProviderError::transport(format!(
                "primary_api reported unknown direction '{other}'"
            )))
        }
    };

    PredictionResult::new(
        symbol,
        horizon,
        payload.predicted_price_usd,
        payload.confidence_pct,
        direction,
        generated_at,
    )
    .map_err(validation_to_error)
}

fn validation_to_error(error: ValidationError) -> ProviderError {
    ProviderError::transport(format!("primary_api payload failed validation: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_canonical_market_payload() {
        let payload: PrimaryMarketPayload = serde_json::from_str(
            r#"{
                "symbol": "BTC",
                "name": "Bitcoin",
                "priceUsd": 50000.12,
                "change24hPct": -1.25,
                "volume24hUsd": 28000000000.0,
                "marketCapUsd": 980000000000.0
            }"#,
        )
        .expect("payload must decode");

        let snapshot = normalize_snapshot(payload).expect("must normalize");
        assert_eq!(snapshot.symbol, AssetSymbol::Btc);
        assert_eq!(snapshot.price_usd, 50000.12);
        assert_eq!(snapshot.change_24h_pct, -1.25);
    }

    #[test]
    fn rejects_untracked_symbol_in_payload() {
        let payload = PrimaryMarketPayload {
            symbol: String::from("DOGE"),
            name: String::from("Dogecoin"),
            price_usd: 0.1,
            change_24h_pct: 0.0,
            volume_24h_usd: 0.0,
            market_cap_usd: 0.0,
        };

        let error = normalize_snapshot(payload).expect_err("must fail");
        assert!(error.retryable());
    }

    #[test]
    fn normalizes_prediction_payload() {
        let payload: PrimaryPredictionPayload = serde_json::from_str(
            r#"{
                "symbol": "ETH",
                "horizon": "1W",
                "predictedPriceUsd": 2650.5,
                "confidencePct": 71.0,
                "direction": "up",
                "lastModelRun": "2024-03-01T12:00:00Z"
            }"#,
        )
        .expect("payload must decode");

        let prediction = normalize_prediction(payload).expect("must normalize");
        assert_eq!(prediction.symbol, AssetSymbol::Eth);
        assert_eq!(prediction.horizon, Timeframe::OneWeek);
        assert_eq!(prediction.direction, Direction::Up);
    }

    #[test]
    fn unknown_direction_fails_the_attempt() {
        let payload = PrimaryPredictionPayload {
            symbol: String::from("BTC"),
            horizon: String::from("1D"),
            predicted_price_usd: 1.0,
            confidence_pct: 60.0,
            direction: String::from("sideways"),
            last_model_run: String::from("2024-03-01T12:00:00Z"),
        };

        let error = normalize_prediction(payload).expect_err("must fail");
        assert!(error.message().contains("direction"));
    }
}
