use crate::error::EngineError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use shared::models::Candle;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Timestamp parsing for vendor price exports.
pub mod vendor_format {
    use super::*;

    // Accepts "2024-05-02T14:00:00Z", "2024-05-02 14:00:00+00:00" and naive
    // "2024-05-02 14:00:00" (read as UTC).
    pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("Failed to parse datetime '{}': {}", s, e))
    }

    // Daily exports carry a bare date; the bar is stamped at midnight UTC.
    pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
        let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| format!("Failed to parse date '{}': {}", s, e))?;
        Ok(date.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn parse_price(s: &str) -> Result<f64, String> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse price '{}': {}", s, e))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(format!("Price must be positive and finite, got '{}'", s));
        }
        Ok(value)
    }

    pub fn parse_volume(s: &str) -> Result<f64, String> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse volume '{}': {}", s, e))?;
        if !value.is_finite() || value < 0.0 {
            return Err(format!("Volume must be non-negative and finite, got '{}'", s));
        }
        Ok(value)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Datelike, Timelike};

        #[test]
        fn test_parse_datetime_with_offset() {
            let dt = parse_datetime("2024-05-02 14:00:00+08:00").unwrap();
            assert_eq!(dt.hour(), 6);
            assert_eq!(dt.day(), 2);
        }

        #[test]
        fn test_parse_datetime_rfc3339_and_naive() {
            assert_eq!(
                parse_datetime("2024-05-02T14:00:00Z").unwrap(),
                parse_datetime("2024-05-02 14:00:00").unwrap()
            );
        }

        #[test]
        fn test_parse_datetime_invalid() {
            assert!(parse_datetime("02/05/2024 14:00").is_err());
        }

        #[test]
        fn test_parse_date() {
            let dt = parse_date("2023-11-30").unwrap();
            assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2023, 11, 30, 0));
            assert!(parse_date("2023-13-01").is_err());
        }

        #[test]
        fn test_parse_price() {
            assert_eq!(parse_price(" 2034.5 ").unwrap(), 2034.5);
            assert!(parse_price("0").is_err());
            assert!(parse_price("-1.0").is_err());
            assert!(parse_price("NaN").is_err());
            assert!(parse_price("abc").is_err());
        }

        #[test]
        fn test_parse_volume() {
            assert_eq!(parse_volume("0").unwrap(), 0.0);
            assert_eq!(parse_volume(" 1520 ").unwrap(), 1520.0);
            assert!(parse_volume("-50").is_err());
            assert!(parse_volume("NaN").is_err());
            assert!(parse_volume("inf").is_err());
        }
    }
}

pub struct BarCsvParser;

impl BarCsvParser {
    // Header: Datetime,Open,High,Low,Close[,Adj Close][,Volume]
    // Daily files use "Date" instead of "Datetime".
    pub fn load_candles_from_csv(file_path: &Path, symbol: &str) -> Result<Vec<Candle>, EngineError> {
        let file = File::open(file_path)?;
        Self::read_candles(BufReader::new(file), symbol)
    }

    pub fn read_candles<R: Read>(reader: R, symbol: &str) -> Result<Vec<Candle>, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        let (time_column, daily) = match (Self::position(&headers, "Datetime"), Self::position(&headers, "Date")) {
            (Some(pos), _) => (pos, false),
            (None, Some(pos)) => (pos, true),
            (None, None) => {
                return Err(EngineError::CsvDataFormatError(
                    "Missing 'Datetime' or 'Date' column in header".to_string(),
                ))
            }
        };

        let mut candles = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let time_str = Self::required(&record, time_column, "Datetime", line)?;
            let timestamp = if daily {
                vendor_format::parse_date(time_str)
            } else {
                vendor_format::parse_datetime(time_str)
            }
            .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing timestamp at line {}: {}", line, e)))?;

            let open = Self::price(&record, &headers, "Open", line)?;
            let high = Self::price(&record, &headers, "High", line)?;
            let low = Self::price(&record, &headers, "Low", line)?;
            let close = Self::price(&record, &headers, "Close", line)?;

            let volume = match Self::position(&headers, "Volume").and_then(|pos| record.get(pos)) {
                Some(s) if !s.is_empty() => vendor_format::parse_volume(s).map_err(|e| {
                    EngineError::CsvDataFormatError(format!("Error parsing 'Volume' at line {}: {}", line, e))
                })?,
                _ => 0.0,
            };

            candles.push(Candle {
                symbol: symbol.to_string(),
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        tracing::debug!(symbol, count = candles.len(), daily, "Parsed bars from CSV");
        Ok(candles)
    }

    fn price(record: &StringRecord, headers: &StringRecord, name: &str, line: usize) -> Result<f64, EngineError> {
        let pos = Self::position(headers, name)
            .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' column in header", name)))?;
        let raw = Self::required(record, pos, name, line)?;
        vendor_format::parse_price(raw)
            .map_err(|e| EngineError::CsvDataFormatError(format!("Error parsing '{}' at line {}: {}", name, line, e)))
    }

    fn required<'a>(record: &'a StringRecord, pos: usize, name: &str, line: usize) -> Result<&'a str, EngineError> {
        match record.get(pos) {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(EngineError::CsvDataFormatError(format!(
                "Missing '{}' field in CSV record at line {}",
                name, line
            ))),
        }
    }

    fn position(headers: &StringRecord, name: &str) -> Option<usize> {
        headers.iter().position(|header| header.eq_ignore_ascii_case(name))
    }
}
