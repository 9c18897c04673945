use serde::{Deserialize, Serialize};

use crate::{AssetSymbol, Timeframe, UtcDateTime, ValidationError};

/// Canonical per-asset market snapshot.
///
/// `market_cap_usd` is `0.0` when the answering provider does not report
/// capitalization; the value is never fabricated from other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: AssetSymbol,
    pub name: String,
    pub price_usd: f64,
    pub change_24h_pct: f64,
    pub volume_24h_usd: f64,
    pub market_cap_usd: f64,
}

impl MarketSnapshot {
    pub fn new(
        symbol: AssetSymbol,
        name: impl Into<String>,
        price_usd: f64,
        change_24h_pct: f64,
        volume_24h_usd: f64,
        market_cap_usd: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("price_usd", price_usd)?;
        validate_finite("change_24h_pct", change_24h_pct)?;
        validate_non_negative("volume_24h_usd", volume_24h_usd)?;
        validate_non_negative("market_cap_usd", market_cap_usd)?;

        Ok(Self {
            symbol,
            name: name.into(),
            price_usd,
            change_24h_pct,
            volume_24h_usd,
            market_cap_usd,
        })
    }
}

/// OHLC candle for one sampled interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidCandleRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidCandleBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
        })
    }

    /// Candle synthesized from a single price point (open = high = low = close).
    pub fn from_single_price(ts: UtcDateTime, price: f64) -> Result<Self, ValidationError> {
        Self::new(ts, price, price, price, price)
    }
}

/// Candle series for one symbol/timeframe pair.
///
/// Candles are ordered ascending by timestamp; normalizers guarantee the
/// ordering, consumers rely on it. Gaps are the provider's responsibility
/// and are never interpolated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: AssetSymbol,
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: AssetSymbol, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        Self {
            symbol,
            timeframe,
            candles,
        }
    }
}

/// Predicted price direction over the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Flat => "flat",
        }
    }
}

/// Canonical prediction for one symbol/horizon pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub symbol: AssetSymbol,
    pub horizon: Timeframe,
    pub predicted_price_usd: f64,
    pub confidence_pct: f64,
    pub direction: Direction,
    pub generated_at: UtcDateTime,
}

impl PredictionResult {
    pub fn new(
        symbol: AssetSymbol,
        horizon: Timeframe,
        predicted_price_usd: f64,
        confidence_pct: f64,
        direction: Direction,
        generated_at: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("predicted_price_usd", predicted_price_usd)?;

        if !confidence_pct.is_finite() || !(0.0..=100.0).contains(&confidence_pct) {
            return Err(ValidationError::ConfidenceOutOfRange {
                value: confidence_pct,
            });
        }

        Ok(Self {
            symbol,
            horizon,
            predicted_price_usd,
            confidence_pct,
            direction,
            generated_at,
        })
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    Ok(())
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> UtcDateTime {
        UtcDateTime::parse("2024-01-01T00:00:00Z").expect("timestamp")
    }

    #[test]
    fn rejects_negative_price() {
        let err = MarketSnapshot::new(AssetSymbol::Btc, "Bitcoin", -1.0, 0.0, 0.0, 0.0)
            .expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::NegativeValue { field: "price_usd" }
        ));
    }

    #[test]
    fn accepts_negative_change() {
        let snapshot = MarketSnapshot::new(AssetSymbol::Eth, "Ethereum", 2500.0, -3.2, 1e9, 0.0)
            .expect("must construct");
        assert_eq!(snapshot.change_24h_pct, -3.2);
        assert_eq!(snapshot.market_cap_usd, 0.0);
    }

    #[test]
    fn rejects_invalid_candle_bounds() {
        let err = Candle::new(ts(), 10.0, 12.0, 9.0, 12.5).expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidCandleBounds));
    }

    #[test]
    fn single_price_candle_is_degenerate() {
        let candle = Candle::from_single_price(ts(), 42.5).expect("must construct");
        assert_eq!(candle.open, candle.close);
        assert_eq!(candle.high, candle.low);
        assert_eq!(candle.open, 42.5);
    }

    #[test]
    fn rejects_confidence_above_ceiling() {
        let err = PredictionResult::new(
            AssetSymbol::Xrp,
            Timeframe::OneWeek,
            1.0,
            101.0,
            Direction::Up,
            ts(),
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::ConfidenceOutOfRange { .. }));
    }
}
