// Exponential Moving Average (EMA) indicator implementation
use super::IndicatorCalculator;
use shared::models::Candle;
use serde_json::Value;

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period,
        }
    }
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Option<f64>> {
        if self.period == 0 || data.len() < self.period {
            return vec![None; data.len()];
        }

        let mut results = vec![None; self.period - 1];
        let multiplier = 2.0 / (self.period as f64 + 1.0);

        // Seeded from the SMA of the first `period` closes. Running mean rather
        // than sum / n so a constant series seeds to exactly that price.
        let mut previous_ema = data
            .iter()
            .take(self.period)
            .enumerate()
            .fold(0.0, |mean, (i, c)| mean + (c.close - mean) / (i + 1) as f64);
        results.push(Some(previous_ema));

        for candle in data.iter().skip(self.period) {
            let ema = (candle.close - previous_ema) * multiplier + previous_ema;
            results.push(Some(ema));
            previous_ema = ema;
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn test_ema_calculation() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let results = Ema::new(3).calculate(&candles);
        // SMA seed (10+11+12)/3 = 11, then alpha = 0.5:
        // (13 - 11) * 0.5 + 11 = 12, (14 - 12) * 0.5 + 12 = 13
        assert_eq!(results.len(), 5);
        assert_eq!(results[0], None);
        assert_eq!(results[1], None);
        assert_eq!(results[2], Some(11.0));
        assert_eq!(results[3], Some(12.0));
        assert_eq!(results[4], Some(13.0));
    }

    #[test]
    fn test_ema_first_defined_index() {
        let candles = make_candles(&vec![100.0; 60]);
        let results = Ema::new(50).calculate(&candles);
        assert!(results[..49].iter().all(Option::is_none));
        assert!(results[49..].iter().all(Option::is_some));
    }

    #[test]
    fn test_ema_constant_series_has_no_drift() {
        let candles = make_candles(&vec![2034.7; 400]);
        let results = Ema::new(200).calculate(&candles);
        for value in results.iter().skip(199) {
            assert_eq!(*value, Some(2034.7));
        }
    }

    #[test]
    fn test_ema_insufficient_data() {
        let candles = make_candles(&[1.0, 2.0]);
        assert_eq!(Ema::new(3).calculate(&candles), vec![None, None]);
        assert!(Ema::new(3).calculate(&[]).is_empty());
    }

    #[test]
    fn test_ema_zero_period() {
        let candles = make_candles(&[1.0, 2.0, 3.0]);
        assert_eq!(Ema::new(0).calculate(&candles), vec![None; 3]);
    }
}
