// Engine settings, loaded from a JSON file or taken from defaults
use crate::data::market_data::validate_symbol;
use crate::error::EngineError;
use serde::Deserialize;
use shared::models::TimeFrame;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV_VAR: &str = "SNIPER_CONFIG";

/// A century of history is the most a bar file can be trimmed to.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// Per-interval defaults: how far to stop out and how much history to load.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TimeFrameSettings {
    pub risk_distance: f64,
    pub lookback_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub symbol: String,
    pub chart_window: usize,
    pub hourly: TimeFrameSettings,
    pub daily: TimeFrameSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            host: "localhost".to_string(),
            port: 50051,
            data_dir: PathBuf::from("data"),
            symbol: "GC=F".to_string(),
            chart_window: 80,
            // $3.50 on hourly bars over ~6 months of history
            hourly: TimeFrameSettings { risk_distance: 3.50, lookback_days: 182 },
            // $15.00 on daily bars over ~2 years of history
            daily: TimeFrameSettings { risk_distance: 15.00, lookback_days: 730 },
        }
    }
}

impl EngineSettings {
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings file '{}': {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Explicit path first, then `SNIPER_CONFIG`, then defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, EngineError> {
        let env_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading engine settings");
                Self::from_file(&path)
            }
            None => {
                tracing::info!("No settings file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, tf) in [("hourly", &self.hourly), ("daily", &self.daily)] {
            if !(tf.risk_distance.is_finite() && tf.risk_distance > 0.0) {
                return Err(EngineError::ConfigError(format!(
                    "{}.risk_distance must be positive, got {}",
                    name, tf.risk_distance
                )));
            }
            if !(1..=MAX_LOOKBACK_DAYS).contains(&tf.lookback_days) {
                return Err(EngineError::ConfigError(format!(
                    "{}.lookback_days must be between 1 and {}, got {}",
                    name, MAX_LOOKBACK_DAYS, tf.lookback_days
                )));
            }
        }
        if self.chart_window == 0 {
            return Err(EngineError::ConfigError("chart_window must be at least 1".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(EngineError::ConfigError("symbol must not be empty".to_string()));
        }
        validate_symbol(&self.symbol).map_err(|e| EngineError::ConfigError(e.to_string()))?;
        Ok(())
    }

    pub fn timeframe(&self, timeframe: TimeFrame) -> &TimeFrameSettings {
        match timeframe {
            TimeFrame::Hour1 => &self.hourly,
            TimeFrame::Day1 => &self.daily,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.timeframe(TimeFrame::Hour1).risk_distance, 3.50);
        assert_eq!(settings.timeframe(TimeFrame::Day1).risk_distance, 15.00);
        assert_eq!(settings.listen_addr(), "localhost:50051");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "port": 6000, "daily": {{ "risk_distance": 20.0, "lookback_days": 365 }} }}"#).unwrap();
        let settings = EngineSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.port, 6000);
        assert_eq!(settings.symbol, "GC=F");
        assert_eq!(settings.daily, TimeFrameSettings { risk_distance: 20.0, lookback_days: 365 });
        assert_eq!(settings.hourly.risk_distance, 3.50);
    }

    #[test]
    fn test_invalid_risk_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "hourly": {{ "risk_distance": 0.0, "lookback_days": 30 }} }}"#).unwrap();
        let err = EngineSettings::from_file(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert!(err.to_string().contains("hourly.risk_distance"));
    }

    #[test]
    fn test_lookback_is_capped() {
        let mut settings = EngineSettings::default();
        settings.hourly.lookback_days = 100_000_000;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("hourly.lookback_days"));

        settings.hourly.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(settings.validate().is_ok());

        settings.daily.lookback_days = 0;
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_path_like_symbol_is_rejected() {
        let settings = EngineSettings { symbol: "../GC=F".to_string(), ..EngineSettings::default() };
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(EngineSettings::from_file(file.path()), Err(EngineError::ConfigError(_))));
    }
}
