// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use shared::models::Candle;
use serde_json::Value;

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period,
        }
    }

    fn value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            // No losses: pure rally reads 100, a flat window reads 50.
            if avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    // Wilder smoothing (alpha = 1/period) applied from the first bar, which
    // contributes a zero change. The first `period - 1` values are None.
    fn calculate(&self, data: &[Candle]) -> Vec<Option<f64>> {
        if self.period == 0 {
            return vec![None; data.len()];
        }

        let mut results = Vec::with_capacity(data.len());
        let period = self.period as f64;
        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;

        for (i, candle) in data.iter().enumerate() {
            let change = match i {
                0 => 0.0,
                _ => candle.close - data[i - 1].close,
            };
            let (gain, loss) = if change > 0.0 { (change, 0.0) } else { (0.0, -change) };

            if i == 0 {
                avg_gain = gain;
                avg_loss = loss;
            } else {
                avg_gain += (gain - avg_gain) / period;
                avg_loss += (loss - avg_loss) / period;
            }

            if i + 1 < self.period {
                results.push(None);
            } else {
                results.push(Some(Self::value(avg_gain, avg_loss)));
            }
        }
        results
    }
}
