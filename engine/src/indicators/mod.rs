// Technical indicators module
pub mod ema;
pub mod pipeline;
pub mod rsi;

pub use ema::Ema;
pub use pipeline::compute_indicators;
pub use rsi::Rsi;

use shared::models::Candle;
use serde_json::Value;

pub const RSI_PERIOD: usize = 14;
pub const FAST_EMA_PERIOD: usize = 50;
pub const SLOW_EMA_PERIOD: usize = 200;

/// Bars needed before every indicator on the latest bar is defined.
pub const REQUIRED_HISTORY: usize = SLOW_EMA_PERIOD;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    // One value per input candle; None while the indicator lacks history.
    // Value i must depend only on data[..=i].
    fn calculate(&self, data: &[Candle]) -> Vec<Option<f64>>;
}

#[cfg(test)]
pub(crate) fn make_candles(closes: &[f64]) -> Vec<Candle> {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            symbol: "GC=F".to_string(),
            timestamp: start + Duration::hours(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 0.0,
        })
        .collect()
}
