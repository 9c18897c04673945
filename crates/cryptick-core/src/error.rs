use thiserror::Error;

/// Validation and contract errors exposed by `cryptick-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown asset symbol '{value}', expected one of BTC, ETH, XRP")]
    InvalidAssetSymbol { value: String },
    #[error("invalid timeframe '{value}', expected one of 1D, 1W, 1M, 3M, 1Y")]
    InvalidTimeframe { value: String },
    #[error("invalid provider '{value}', expected one of primary_api, exchange_ticker, aggregator_index, local_heuristic")]
    InvalidProvider { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
    #[error("epoch value {value} is out of the representable range")]
    TimestampOutOfRange { value: i64 },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("candle high must be >= low")]
    InvalidCandleRange,
    #[error("candle open/close must be within high/low range")]
    InvalidCandleBounds,

    #[error("confidence {value} is outside the [0, 100] range")]
    ConfidenceOutOfRange { value: f64 },
    #[error("candle history is empty, cannot derive a forecast")]
    EmptyCandleHistory,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("trace_id must be 32 hex characters")]
    InvalidTraceId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("provider_chain must contain at least one provider")]
    EmptyProviderChain,

    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
