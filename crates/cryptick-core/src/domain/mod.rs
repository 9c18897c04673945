//! # Domain Models
//!
//! Canonical, provider-agnostic types returned to callers.
//!
//! ## Overview
//!
//! Every provider response is normalized into the types here before it leaves
//! the crate. All models are:
//!
//! - **Type-safe**: the asset catalog and timeframes are closed enums
//! - **Validated**: construction enforces all numeric invariants
//! - **Serializable**: full serde support for JSON
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MarketSnapshot`] | Price, 24h change, volume, market cap |
//! | [`Candle`] | OHLC record with UTC timestamp |
//! | [`CandleSeries`] | Ascending candle collection for a symbol/timeframe |
//! | [`PredictionResult`] | Predicted price, confidence, direction |
//! | [`Direction`] | up / down / flat |
//! | [`AssetSymbol`] | Tracked ticker (BTC, ETH, XRP) |
//! | [`Timeframe`] | Horizon (1D, 1W, 1M, 3M, 1Y) |
//! | [`UtcDateTime`] | UTC instant |

mod asset;
mod models;
mod timeframe;
mod timestamp;

pub use asset::AssetSymbol;
pub use models::{Candle, CandleSeries, Direction, MarketSnapshot, PredictionResult};
pub use timeframe::Timeframe;
pub use timestamp::UtcDateTime;
