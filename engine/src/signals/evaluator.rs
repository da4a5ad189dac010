//! Trend-filtered RSI pullback rule.
//!
//! Only buys pullbacks inside an uptrend (EMA fast above EMA slow) and only
//! sells rallies inside a downtrend. Stops sit one risk distance away from
//! the close and targets three risk distances away.

use crate::error::EngineError;
use crate::indicators::REQUIRED_HISTORY;
use shared::models::{AnalyzedCandle, Signal, SignalKind, Trend};

pub const REWARD_TO_RISK: f64 = 3.0;

const UPTREND_OVERSOLD: f64 = 35.0;
const UPTREND_OVEREXTENDED: f64 = 70.0;
const DOWNTREND_OVERBOUGHT: f64 = 65.0;
const DOWNTREND_OVERSOLD: f64 = 30.0;

/// The numeric inputs the rule looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    pub close: f64,
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
}

impl TryFrom<&AnalyzedCandle> for SignalInputs {
    type Error = EngineError;

    fn try_from(candle: &AnalyzedCandle) -> Result<Self, Self::Error> {
        let indicators = &candle.indicators;
        match (indicators.rsi, indicators.ema_fast, indicators.ema_slow) {
            (Some(rsi), Some(ema_fast), Some(ema_slow)) => Ok(SignalInputs {
                close: candle.candle.close,
                rsi,
                ema_fast,
                ema_slow,
            }),
            _ => Err(EngineError::InsufficientHistory {
                required: REQUIRED_HISTORY,
                available: candle.bars_seen,
            }),
        }
    }
}

pub fn validate_risk_distance(risk_distance: f64) -> Result<f64, EngineError> {
    if risk_distance.is_finite() && risk_distance > 0.0 {
        Ok(risk_distance)
    } else {
        Err(EngineError::InvalidRiskDistance(risk_distance))
    }
}

/// Rejects inputs the rule cannot classify: non-finite values, a
/// non-positive close or an RSI outside 0..=100.
pub fn validate_inputs(inputs: &SignalInputs) -> Result<(), EngineError> {
    let SignalInputs { close, rsi, ema_fast, ema_slow } = *inputs;
    for (name, value) in [("close", close), ("rsi", rsi), ("ema_fast", ema_fast), ("ema_slow", ema_slow)] {
        if !value.is_finite() {
            return Err(EngineError::InvalidSignalInput(format!("{} must be finite, got {}", name, value)));
        }
    }
    if close <= 0.0 {
        return Err(EngineError::InvalidSignalInput(format!("close must be positive, got {}", close)));
    }
    if !(0.0..=100.0).contains(&rsi) {
        return Err(EngineError::InvalidSignalInput(format!("rsi {} is outside 0..=100", rsi)));
    }
    Ok(())
}

/// Evaluates the rule against the latest analyzed candle.
pub fn evaluate_signal(latest: &AnalyzedCandle, risk_distance: f64) -> Result<Signal, EngineError> {
    let inputs = SignalInputs::try_from(latest)?;
    evaluate(inputs, risk_distance)
}

pub fn evaluate(inputs: SignalInputs, risk_distance: f64) -> Result<Signal, EngineError> {
    let risk = validate_risk_distance(risk_distance)?;
    validate_inputs(&inputs)?;
    let SignalInputs { close, rsi, ema_fast, ema_slow } = inputs;

    let signal = match Trend::from_emas(ema_fast, ema_slow) {
        Trend::Bullish => {
            if rsi < UPTREND_OVERSOLD {
                Signal {
                    kind: SignalKind::Buy,
                    reason: "uptrend + oversold pullback".to_string(),
                    entry: Some(close),
                    stop_loss: Some(close - risk),
                    take_profit: Some(close + risk * REWARD_TO_RISK),
                }
            } else if rsi > UPTREND_OVEREXTENDED {
                Signal::passive(SignalKind::Warning, "overextended, avoid buying highs")
            } else {
                Signal::passive(SignalKind::Neutral, "uptrend, awaiting RSI pullback")
            }
        }
        Trend::Bearish => {
            if rsi > DOWNTREND_OVERBOUGHT {
                Signal {
                    kind: SignalKind::Sell,
                    reason: "downtrend + overbought pullback".to_string(),
                    entry: Some(close),
                    stop_loss: Some(close + risk),
                    take_profit: Some(close - risk * REWARD_TO_RISK),
                }
            } else if rsi < DOWNTREND_OVERSOLD {
                Signal::passive(SignalKind::Warning, "oversold, avoid selling lows")
            } else {
                Signal::passive(SignalKind::Neutral, "downtrend, awaiting RSI rally")
            }
        }
    };

    tracing::debug!(
        kind = %signal.kind,
        close,
        rsi,
        ema_fast,
        ema_slow,
        risk,
        "Signal evaluated"
    );
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Candle, IndicatorSet};

    fn inputs(close: f64, rsi: f64, ema_fast: f64, ema_slow: f64) -> SignalInputs {
        SignalInputs { close, rsi, ema_fast, ema_slow }
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let value = actual.expect("expected a price level");
        assert!((value - expected).abs() < 1e-9, "{} != {}", value, expected);
    }

    #[test]
    fn test_uptrend_oversold_buys() {
        let signal = evaluate(inputs(105.0, 30.0, 110.0, 100.0), 3.50).unwrap();
        assert_eq!(signal.kind, SignalKind::Buy);
        assert_eq!(signal.reason, "uptrend + oversold pullback");
        assert_eq!(signal.entry, Some(105.0));
        assert_close(signal.stop_loss, 101.50);
        assert_close(signal.take_profit, 115.50);
    }

    #[test]
    fn test_downtrend_overbought_sells() {
        let signal = evaluate(inputs(95.0, 68.0, 90.0, 100.0), 15.00).unwrap();
        assert_eq!(signal.kind, SignalKind::Sell);
        assert_eq!(signal.reason, "downtrend + overbought pullback");
        assert_close(signal.stop_loss, 110.0);
        assert_close(signal.take_profit, 50.0);
    }

    #[test]
    fn test_uptrend_overextended_warns_without_levels() {
        let signal = evaluate(inputs(105.0, 75.0, 110.0, 100.0), 3.50).unwrap();
        assert_eq!(signal.kind, SignalKind::Warning);
        assert_eq!(signal.reason, "overextended, avoid buying highs");
        assert_eq!((signal.entry, signal.stop_loss, signal.take_profit), (None, None, None));
    }

    #[test]
    fn test_downtrend_oversold_warns() {
        let signal = evaluate(inputs(95.0, 25.0, 90.0, 100.0), 3.50).unwrap();
        assert_eq!(signal.kind, SignalKind::Warning);
        assert_eq!(signal.reason, "oversold, avoid selling lows");
        assert!(signal.stop_loss.is_none() && signal.take_profit.is_none());
    }

    #[test]
    fn test_neutral_reasons() {
        let up = evaluate(inputs(105.0, 50.0, 110.0, 100.0), 3.50).unwrap();
        assert_eq!(up.kind, SignalKind::Neutral);
        assert_eq!(up.reason, "uptrend, awaiting RSI pullback");

        let down = evaluate(inputs(95.0, 50.0, 90.0, 100.0), 3.50).unwrap();
        assert_eq!(down.kind, SignalKind::Neutral);
        assert_eq!(down.reason, "downtrend, awaiting RSI rally");
    }

    #[test]
    fn test_thresholds_are_strict() {
        let up = |rsi| evaluate(inputs(105.0, rsi, 110.0, 100.0), 3.50).unwrap().kind;
        assert_eq!(up(35.0), SignalKind::Neutral);
        assert_eq!(up(34.999), SignalKind::Buy);
        assert_eq!(up(70.0), SignalKind::Neutral);
        assert_eq!(up(70.001), SignalKind::Warning);

        let down = |rsi| evaluate(inputs(95.0, rsi, 90.0, 100.0), 3.50).unwrap().kind;
        assert_eq!(down(65.0), SignalKind::Neutral);
        assert_eq!(down(65.001), SignalKind::Sell);
        assert_eq!(down(30.0), SignalKind::Neutral);
        assert_eq!(down(29.999), SignalKind::Warning);
    }

    #[test]
    fn test_equal_emas_follow_downtrend_branch() {
        let signal = evaluate(inputs(100.0, 68.0, 100.0, 100.0), 3.50).unwrap();
        assert_eq!(signal.kind, SignalKind::Sell);
        let signal = evaluate(inputs(100.0, 30.0, 100.0, 100.0), 3.50).unwrap();
        assert_eq!(signal.kind, SignalKind::Neutral);
    }

    #[test]
    fn test_reward_is_three_times_risk() {
        for risk in [0.5, 3.50, 15.00, 42.25] {
            let buy = evaluate(inputs(2031.4, 20.0, 2040.0, 2000.0), risk).unwrap();
            let (close, stop, target) = (2031.4, buy.stop_loss.unwrap(), buy.take_profit.unwrap());
            assert!(((target - close) - REWARD_TO_RISK * (close - stop)).abs() < 1e-9);

            let sell = evaluate(inputs(2031.4, 80.0, 1990.0, 2000.0), risk).unwrap();
            let (stop, target) = (sell.stop_loss.unwrap(), sell.take_profit.unwrap());
            assert!(((close - target) - REWARD_TO_RISK * (stop - close)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let a = evaluate(inputs(1987.2, 33.3, 1990.0, 1980.0), 3.50).unwrap();
        let b = evaluate(inputs(1987.2, 33.3, 1990.0, 1980.0), 3.50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_risk_distance_is_rejected() {
        for risk in [0.0, -3.5, f64::NAN, f64::INFINITY] {
            let result = evaluate(inputs(105.0, 30.0, 110.0, 100.0), risk);
            assert!(matches!(result, Err(EngineError::InvalidRiskDistance(_))));
        }
    }

    #[test]
    fn test_non_finite_inputs_are_rejected() {
        let cases = [
            inputs(95.0, f64::NAN, 90.0, 100.0),
            inputs(f64::NAN, 20.0, 110.0, 100.0),
            inputs(105.0, 20.0, f64::INFINITY, 100.0),
            inputs(105.0, 20.0, 110.0, f64::NEG_INFINITY),
        ];
        for case in cases {
            let result = evaluate(case, 3.50);
            assert!(matches!(result, Err(EngineError::InvalidSignalInput(_))), "{:?} -> {:?}", case, result);
        }
    }

    #[test]
    fn test_rsi_outside_range_is_rejected() {
        for rsi in [-0.1, 100.1, 250.0] {
            let result = evaluate(inputs(95.0, rsi, 90.0, 100.0), 3.50);
            assert!(matches!(result, Err(EngineError::InvalidSignalInput(ref msg)) if msg.contains("rsi")));
        }
        assert_eq!(evaluate(inputs(95.0, 0.0, 90.0, 100.0), 3.50).unwrap().kind, SignalKind::Warning);
        assert_eq!(evaluate(inputs(95.0, 100.0, 90.0, 100.0), 3.50).unwrap().kind, SignalKind::Sell);
    }

    #[test]
    fn test_non_positive_close_is_rejected() {
        for close in [0.0, -5.0] {
            let result = evaluate(inputs(close, 20.0, 110.0, 100.0), 3.50);
            assert!(matches!(result, Err(EngineError::InvalidSignalInput(ref msg)) if msg.contains("close")));
        }
    }

    #[test]
    fn test_missing_indicators_signal_insufficient_history() {
        let candle = AnalyzedCandle {
            candle: Candle {
                symbol: "GC=F".to_string(),
                timestamp: chrono::Utc::now(),
                open: 1950.0,
                high: 1955.0,
                low: 1948.0,
                close: 1952.0,
                volume: 0.0,
            },
            indicators: IndicatorSet { rsi: Some(40.0), ema_fast: Some(1949.0), ema_slow: None },
            bars_seen: 50,
        };
        let result = evaluate_signal(&candle, 3.50);
        assert!(matches!(
            result,
            Err(EngineError::InsufficientHistory { required: 200, available: 50 })
        ));
    }
}
