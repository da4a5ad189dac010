//! One analysis pass: indicators, signal on the latest bar, dashboard snapshot.

use crate::error::EngineError;
use crate::indicators::{compute_indicators, REQUIRED_HISTORY};
use crate::signals::{evaluate_signal, validate_risk_distance, SignalInputs};
use serde::Serialize;
use shared::models::{AnalyzedCandle, Candle, MarketSnapshot, Signal, Trend};

pub const DEFAULT_CHART_WINDOW: usize = 80;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub candles: Vec<AnalyzedCandle>,
    pub signal: Signal,
    pub snapshot: MarketSnapshot,
}

impl AnalysisReport {
    pub fn latest(&self) -> Option<&AnalyzedCandle> {
        self.candles.last()
    }

    pub fn chart(&self, window: usize) -> &[AnalyzedCandle] {
        chart_window(&self.candles, window)
    }
}

pub fn run_analysis(bars: &[Candle], risk_distance: f64) -> Result<AnalysisReport, EngineError> {
    validate_risk_distance(risk_distance)?;
    if bars.is_empty() {
        return Err(EngineError::EmptyInput);
    }
    if bars.len() < REQUIRED_HISTORY {
        return Err(EngineError::InsufficientHistory {
            required: REQUIRED_HISTORY,
            available: bars.len(),
        });
    }

    let candles = compute_indicators(bars)?;
    let latest = candles.last().ok_or(EngineError::EmptyInput)?;
    let signal = evaluate_signal(latest, risk_distance)?;
    let snapshot = snapshot_from_series(&candles, risk_distance)?;

    tracing::info!(
        bars = candles.len(),
        kind = %signal.kind,
        trend = %snapshot.trend,
        close = snapshot.last_close,
        "Analysis complete"
    );
    Ok(AnalysisReport { candles, signal, snapshot })
}

/// Headline metrics from the last two candles of an analyzed series.
pub fn snapshot_from_series(candles: &[AnalyzedCandle], risk_distance: f64) -> Result<MarketSnapshot, EngineError> {
    let latest = candles.last().ok_or(EngineError::EmptyInput)?;
    let inputs = SignalInputs::try_from(latest)?;
    let previous = candles.len().checked_sub(2).map(|i| &candles[i]);

    let price_change = previous.map_or(0.0, |prev| inputs.close - prev.candle.close);
    let rsi_change = previous
        .and_then(|prev| prev.indicators.rsi)
        .map(|prev_rsi| inputs.rsi - prev_rsi);

    Ok(MarketSnapshot {
        timestamp: latest.candle.timestamp,
        last_close: inputs.close,
        price_change,
        rsi: inputs.rsi,
        rsi_change,
        trend: Trend::from_emas(inputs.ema_fast, inputs.ema_slow),
        risk_distance,
    })
}

/// The trailing `window` candles, or the whole series when it is shorter.
pub fn chart_window(candles: &[AnalyzedCandle], window: usize) -> &[AnalyzedCandle] {
    &candles[candles.len().saturating_sub(window)..]
}
