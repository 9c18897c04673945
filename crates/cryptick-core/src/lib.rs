//! # Cryptick Core
//!
//! Market-data aggregation client for a tracked set of crypto assets.
//!
//! ## Overview
//!
//! This crate provides the foundational components for Cryptick:
//!
//! - **Canonical domain models** for snapshots, candles, and predictions
//! - **Provider contract** shared by every upstream adapter
//! - **Transport abstraction** with bounded per-attempt timeouts
//! - **Fallback cascade** with fixed, per-operation provider chains
//! - **Momentum forecast** used when no prediction upstream answers
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (primary API, exchange ticker, aggregator index) |
//! | [`domain`] | Canonical models (MarketSnapshot, Candle, PredictionResult) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`forecast`] | Local momentum forecast |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`provider`] | Provider contract, requests, structured errors |
//! | [`provider_policy`] | Rate-budget policies per provider |
//! | [`routing`] | Cascade engine and builder |
//! | [`throttling`] | Rate limiting support |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryptick_core::{AssetSymbol, CascadeBuilder, ChainStrategy, SnapshotsRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cascade = CascadeBuilder::new().with_env().build();
//!
//!     let request = SnapshotsRequest::new(vec![AssetSymbol::Btc, AssetSymbol::Eth])?;
//!     let result = cascade
//!         .fetch_snapshots(&request, ChainStrategy::Cascade)
//!         .await?;
//!
//!     for snapshot in &result.data {
//!         println!("{}: ${:.2}", snapshot.symbol, snapshot.price_usd);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Fallback chains
//!
//! Attempt order is fixed and asymmetric across operations:
//!
//! | Operation | Chain |
//! |-----------|-------|
//! | Snapshots | primary_api → exchange_ticker → aggregator_index |
//! | History | primary_api → exchange_ticker → aggregator_index |
//! | Prediction | primary_api → local momentum heuristic |
//!
//! Only transport-class failures advance a chain; configuration errors
//! surface immediately, and exhaustion is the single terminal failure
//! callers handle for degraded-network conditions.

pub mod adapters;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod forecast;
pub mod http_client;
pub mod provider;
pub mod provider_policy;
pub mod routing;
pub mod throttling;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{AggregatorIndexAdapter, ExchangeTickerAdapter, PrimaryApiAdapter};

// Domain models
pub use domain::{
    AssetSymbol, Candle, CandleSeries, Direction, MarketSnapshot, PredictionResult, Timeframe,
    UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{CoreError, ValidationError};

// Forecast
pub use forecast::forecast;

// HTTP client types
pub use http_client::{
    upstream_message, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
    DEFAULT_TIMEOUT_MS,
};

// Provider contract
pub use provider::{
    CapabilitySet, HistoryRequest, MarketDataProvider, Operation, PredictionRequest,
    ProviderError, ProviderErrorKind, ProviderId, SnapshotsRequest,
};

// Provider policies
pub use provider_policy::{BackoffPolicy, ProviderPolicy};

// Routing types
pub use routing::{
    CascadeBuilder, CascadeError, CascadeFailure, CascadeResult, ChainStrategy, FetchSuccess,
    ProviderCascade, ProviderSnapshot,
};

// Throttling
pub use throttling::ThrottlingQueue;
