//! Provider contract and request/response plumbing.
//!
//! This module defines the adapter contract ([`MarketDataProvider`]) that all
//! upstream implementations follow, the request types for each operation, and
//! the structured error the cascade uses to tell retryable upstream failures
//! apart from caller bugs.
//!
//! # Operations
//!
//! | Operation | Request | Response |
//! |-----------|---------|----------|
//! | Snapshots | [`SnapshotsRequest`] | `Vec<MarketSnapshot>` |
//! | History | [`HistoryRequest`] | [`CandleSeries`] |
//! | Prediction | [`PredictionRequest`] | [`PredictionResult`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    AssetSymbol, CandleSeries, MarketSnapshot, PredictionResult, Timeframe, ValidationError,
};

/// Canonical provider identifiers used in chains and envelope metadata.
///
/// `LocalHeuristic` is not a network provider; it is the terminal member of
/// the prediction chain and is reported in metadata when the momentum
/// fallback produced the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    PrimaryApi,
    ExchangeTicker,
    AggregatorIndex,
    LocalHeuristic,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [
        Self::PrimaryApi,
        Self::ExchangeTicker,
        Self::AggregatorIndex,
        Self::LocalHeuristic,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryApi => "primary_api",
            Self::ExchangeTicker => "exchange_ticker",
            Self::AggregatorIndex => "aggregator_index",
            Self::LocalHeuristic => "local_heuristic",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "primary_api" => Ok(Self::PrimaryApi),
            "exchange_ticker" => Ok(Self::ExchangeTicker),
            "aggregator_index" => Ok(Self::AggregatorIndex),
            "local_heuristic" => Ok(Self::LocalHeuristic),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}

/// Operation type used for chain selection and capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Snapshots,
    History,
    Prediction,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Snapshots => "snapshots",
            Self::History => "history",
            Self::Prediction => "prediction",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported operation matrix for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub snapshots: bool,
    pub history: bool,
    pub prediction: bool,
}

impl CapabilitySet {
    pub const fn new(snapshots: bool, history: bool, prediction: bool) -> Self {
        Self {
            snapshots,
            history,
            prediction,
        }
    }

    pub const fn full() -> Self {
        Self::new(true, true, true)
    }

    pub const fn supports(self, operation: Operation) -> bool {
        match operation {
            Operation::Snapshots => self.snapshots,
            Operation::History => self.history,
            Operation::Prediction => self.prediction,
        }
    }

    pub fn supported_operations(self) -> Vec<&'static str> {
        let mut values = Vec::with_capacity(3);
        if self.snapshots {
            values.push("snapshots");
        }
        if self.history {
            values.push("history");
        }
        if self.prediction {
            values.push("prediction");
        }
        values
    }
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Network failure, non-success status, or undecodable body. The cascade
    /// advances to the next provider.
    Transport,
    /// Provider-local rate budget exhausted. Transport-class for fallback
    /// purposes.
    RateLimited,
    /// Symbol/timeframe outside the provider's configured identifier space.
    /// A caller bug, never retried.
    Configuration,
    /// Operation not implemented by this provider.
    UnsupportedOperation,
}

/// Structured provider error consumed by the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Transport,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Configuration,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unsupported_operation(operation: Operation) -> Self {
        Self {
            kind: ProviderErrorKind::UnsupportedOperation,
            message: format!("operation '{operation}' is not supported by this provider"),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Transport => "provider.transport",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Configuration => "provider.configuration",
            ProviderErrorKind::UnsupportedOperation => "provider.unsupported_operation",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Request payload for the snapshots operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotsRequest {
    pub symbols: Vec<AssetSymbol>,
}

impl SnapshotsRequest {
    pub fn new(symbols: Vec<AssetSymbol>) -> Result<Self, ProviderError> {
        if symbols.is_empty() {
            return Err(ProviderError::configuration(
                "snapshots request must include at least one symbol",
            ));
        }
        Ok(Self { symbols })
    }

    /// Snapshot request for the whole tracked catalog.
    pub fn all() -> Self {
        Self {
            symbols: AssetSymbol::ALL.to_vec(),
        }
    }
}

/// Request payload for the history operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: AssetSymbol,
    pub timeframe: Timeframe,
}

impl HistoryRequest {
    pub const fn new(symbol: AssetSymbol, timeframe: Timeframe) -> Self {
        Self { symbol, timeframe }
    }
}

/// Request payload for the prediction operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionRequest {
    pub symbol: AssetSymbol,
    pub timeframe: Timeframe,
}

impl PredictionRequest {
    pub const fn new(symbol: AssetSymbol, timeframe: Timeframe) -> Self {
        Self { symbol, timeframe }
    }
}

/// Provider adapter contract.
///
/// One implementation per upstream. Each adapter owns its identifier lookup
/// tables, builds its provider-specific query, delegates to the transport,
/// and normalizes the raw payload into canonical types before returning.
///
/// Implementations must be `Send + Sync`; one adapter instance is shared
/// across concurrent operations.
pub trait MarketDataProvider: Send + Sync {
    /// Unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Operations this provider implements.
    fn capabilities(&self) -> CapabilitySet;

    /// Fetch market snapshots for the requested symbols.
    fn snapshots<'a>(
        &'a self,
        req: SnapshotsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<MarketSnapshot>, ProviderError>> + Send + 'a>>;

    /// Fetch the candle series for one symbol/timeframe pair.
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CandleSeries, ProviderError>> + Send + 'a>>;

    /// Fetch a prediction for one symbol/timeframe pair.
    fn prediction<'a>(
        &'a self,
        req: PredictionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PredictionResult, ProviderError>> + Send + 'a>>;
}
