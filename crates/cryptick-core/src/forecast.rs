//! Local momentum forecast, used when no upstream prediction source answers.
//!
//! The forecast is a deterministic function of a candle sequence and performs
//! no I/O; the cascade fetches the history and hands it in. Confidence is
//! presentation data bounded to [55, 92]: the heuristic never claims
//! near-certainty nor near-randomness.

use crate::{AssetSymbol, Candle, Direction, PredictionResult, Timeframe, UtcDateTime, ValidationError};

/// Fraction of observed momentum carried into the projection.
const MOMENTUM_DAMPING: f64 = 0.25;
/// Projected moves inside this band count as flat.
const FLAT_THRESHOLD: f64 = 0.005;
const CONFIDENCE_FLOOR: f64 = 55.0;
const CONFIDENCE_CEILING: f64 = 92.0;

/// Derive a prediction from a candle history ordered ascending by timestamp.
///
/// Momentum is the fractional close-to-close change across the window (zero
/// when the window starts at a zero close). A quarter of it is projected
/// forward; the projected price is floored at zero.
pub fn forecast(
    symbol: AssetSymbol,
    horizon: Timeframe,
    candles: &[Candle],
) -> Result<PredictionResult, ValidationError> {
    let (first, last) = match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(ValidationError::EmptyCandleHistory),
    };

    let momentum = if first.close == 0.0 {
        0.0
    } else {
        (last.close - first.close) / first.close
    };

    let projected_move = momentum * MOMENTUM_DAMPING;
    let predicted_price_usd = (last.close * (1.0 + projected_move)).max(0.0);

    let direction = if projected_move > FLAT_THRESHOLD {
        Direction::Up
    } else if projected_move < -FLAT_THRESHOLD {
        Direction::Down
    } else {
        Direction::Flat
    };

    let confidence_pct = (momentum.abs() * 100.0 + CONFIDENCE_FLOOR).min(CONFIDENCE_CEILING);

    PredictionResult::new(
        symbol,
        horizon,
        predicted_price_usd,
        confidence_pct,
        direction,
        UtcDateTime::now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(index, &close)| {
                let ts = UtcDateTime::from_unix_seconds(1_700_000_000 + index as i64 * 3_600)
                    .expect("timestamp");
                Candle::from_single_price(ts, close).expect("candle")
            })
            .collect()
    }

    #[test]
    fn projects_damped_momentum_forward() {
        let candles = candles_from_closes(&[100.0, 110.0]);
        let prediction =
            forecast(AssetSymbol::Btc, Timeframe::OneWeek, &candles).expect("must forecast");

        // momentum 0.1 -> projected move 0.025 -> 110 * 1.025
        assert!((prediction.predicted_price_usd - 112.75).abs() < 1e-9);
        assert_eq!(prediction.direction, Direction::Up);
        assert!((prediction.confidence_pct - 65.0).abs() < 1e-9);
    }

    #[test]
    fn zero_first_close_yields_flat_zero_momentum() {
        let candles = candles_from_closes(&[0.0, 50.0]);
        let prediction =
            forecast(AssetSymbol::Eth, Timeframe::OneDay, &candles).expect("must forecast");

        assert_eq!(prediction.direction, Direction::Flat);
        assert_eq!(prediction.predicted_price_usd, 50.0);
        assert_eq!(prediction.confidence_pct, CONFIDENCE_FLOOR);
    }

    #[test]
    fn confidence_is_capped_at_ceiling() {
        let candles = candles_from_closes(&[100.0, 250.0]);
        let prediction =
            forecast(AssetSymbol::Btc, Timeframe::OneYear, &candles).expect("must forecast");

        assert_eq!(prediction.confidence_pct, CONFIDENCE_CEILING);
        assert_eq!(prediction.direction, Direction::Up);
    }

    #[test]
    fn full_crash_floors_price_at_zero() {
        let candles = candles_from_closes(&[0.00001, 0.0]);
        let prediction =
            forecast(AssetSymbol::Xrp, Timeframe::OneMonth, &candles).expect("must forecast");

        assert_eq!(prediction.predicted_price_usd, 0.0);
        assert_eq!(prediction.confidence_pct, CONFIDENCE_CEILING);
        assert_eq!(prediction.direction, Direction::Down);
    }

    #[test]
    fn small_moves_are_flat() {
        let candles = candles_from_closes(&[100.0, 100.5]);
        let prediction =
            forecast(AssetSymbol::Eth, Timeframe::OneDay, &candles).expect("must forecast");

        // momentum 0.005 -> projected move 0.00125, inside the flat band
        assert_eq!(prediction.direction, Direction::Flat);
        assert!(prediction.confidence_pct >= CONFIDENCE_FLOOR);
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = forecast(AssetSymbol::Btc, Timeframe::OneDay, &[]).expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptyCandleHistory));
    }

    #[test]
    fn single_candle_window_is_flat() {
        let candles = candles_from_closes(&[123.0]);
        let prediction =
            forecast(AssetSymbol::Btc, Timeframe::OneDay, &candles).expect("must forecast");

        assert_eq!(prediction.direction, Direction::Flat);
        assert_eq!(prediction.predicted_price_usd, 123.0);
    }
}
