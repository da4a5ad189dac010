// Bar sources: where the analysis pass gets its price history from
use crate::config::EngineSettings;
use crate::data::csv_parser::BarCsvParser;
use crate::error::EngineError;
use chrono::Duration;
use shared::models::{Candle, TimeFrame};
use std::collections::HashMap;
use std::path::PathBuf;

/// Supplies a time-ordered bar sequence for one symbol and sampling interval.
pub trait BarSource: Send + Sync {
    fn fetch_bars(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, EngineError>;
}

/// Reads `<data_dir>/<symbol>_<timeframe>.csv` exports.
pub struct CsvBarSource {
    data_dir: PathBuf,
    lookback: HashMap<TimeFrame, Duration>,
}

impl CsvBarSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        CsvBarSource {
            data_dir: data_dir.into(),
            lookback: HashMap::new(),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        let mut source = Self::new(settings.data_dir.clone());
        for timeframe in [TimeFrame::Hour1, TimeFrame::Day1] {
            let days = settings.timeframe(timeframe).lookback_days;
            match Duration::try_days(days) {
                Some(lookback) => source = source.with_lookback(timeframe, lookback),
                None => tracing::warn!(%timeframe, days, "Lookback out of range, keeping full history"),
            }
        }
        source
    }

    pub fn with_lookback(mut self, timeframe: TimeFrame, lookback: Duration) -> Self {
        self.lookback.insert(timeframe, lookback);
        self
    }

    pub fn file_path(&self, symbol: &str, timeframe: TimeFrame) -> PathBuf {
        self.data_dir.join(format!("{}_{}.csv", symbol, timeframe))
    }
}

impl BarSource for CsvBarSource {
    fn fetch_bars(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, EngineError> {
        let path = self.file_path(validate_symbol(symbol)?, timeframe);
        if !path.is_file() {
            return Err(EngineError::MarketDataError(format!(
                "Bar file not found for symbol '{}' and timeframe {}: {}",
                symbol,
                timeframe,
                path.display()
            )));
        }

        let candles = BarCsvParser::load_candles_from_csv(&path, symbol)?;
        let mut candles = normalize_bars(candles);
        if let Some(lookback) = self.lookback.get(&timeframe) {
            candles = trim_to_lookback(candles, *lookback);
        }

        tracing::debug!(symbol, %timeframe, path = %path.display(), count = candles.len(), "Fetched bars");
        Ok(candles)
    }
}

/// Symbols become file names, so only plain ticker characters are accepted.
pub fn validate_symbol(symbol: &str) -> Result<&str, EngineError> {
    let plain = !symbol.is_empty()
        && symbol != "."
        && !symbol.contains("..")
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '=' | '^' | '.' | '_' | '-'));
    if plain {
        Ok(symbol)
    } else {
        Err(EngineError::InvalidSymbol(symbol.to_string()))
    }
}

/// Sorts by timestamp and keeps the first bar of each duplicated timestamp.
pub fn normalize_bars(mut candles: Vec<Candle>) -> Vec<Candle> {
    let before = candles.len();
    candles.sort_by_key(|c| c.timestamp);
    candles.dedup_by_key(|c| c.timestamp);
    if candles.len() != before {
        tracing::warn!(dropped = before - candles.len(), "Dropped bars with duplicate timestamps");
    }
    candles
}

/// Keeps the bars within `lookback` of the newest bar. Expects sorted input.
/// A lookback reaching past the earliest representable time keeps everything.
pub fn trim_to_lookback(candles: Vec<Candle>, lookback: Duration) -> Vec<Candle> {
    let Some(newest) = candles.last().map(|c| c.timestamp) else {
        return candles;
    };
    let Some(start) = newest.checked_sub_signed(lookback) else {
        return candles;
    };
    candles.into_iter().filter(|c| c.timestamp >= start).collect()
}
