// Attaches the RSI and the fast/slow EMAs to every candle of a series.
use super::{Ema, IndicatorCalculator, Rsi, FAST_EMA_PERIOD, RSI_PERIOD, SLOW_EMA_PERIOD};
use crate::error::EngineError;
use shared::models::{AnalyzedCandle, Candle, IndicatorSet};

/// Computes the indicator set for each bar from its prefix only.
///
/// Fails with `EmptyInput` for an empty slice and `UnorderedBars` when the
/// timestamps are not strictly increasing. The input is left untouched.
pub fn compute_indicators(bars: &[Candle]) -> Result<Vec<AnalyzedCandle>, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    if let Some(index) = bars
        .windows(2)
        .position(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        return Err(EngineError::UnorderedBars { index: index + 1 });
    }

    let rsi = Rsi::new(RSI_PERIOD);
    let ema_fast = Ema::new(FAST_EMA_PERIOD);
    let ema_slow = Ema::new(SLOW_EMA_PERIOD);

    let calculators: [&dyn IndicatorCalculator; 3] = [&rsi, &ema_fast, &ema_slow];

    let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(calculators.len());
    for calculator in calculators {
        tracing::trace!(
            indicator = calculator.name(),
            parameters = %calculator.parameters(),
            bars = bars.len(),
            "Calculating indicator"
        );
        series.push(calculator.calculate(bars));
    }
    let (rsi_values, fast_values, slow_values) = (&series[0], &series[1], &series[2]);

    let analyzed = bars
        .iter()
        .enumerate()
        .map(|(i, candle)| AnalyzedCandle {
            candle: candle.clone(),
            indicators: IndicatorSet {
                rsi: rsi_values[i],
                ema_fast: fast_values[i],
                ema_slow: slow_values[i],
            },
            bars_seen: i + 1,
        })
        .collect();

    tracing::debug!(bars = bars.len(), "Indicators computed");
    Ok(analyzed)
}
