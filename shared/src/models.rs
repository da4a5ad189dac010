use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One sampled OHLC price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Indicator values attached to a single candle. `None` means the indicator
/// does not have enough history yet at that position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedCandle {
    pub candle: Candle,
    pub indicators: IndicatorSet,
    /// Bars of history up to and including this one.
    pub bars_seen: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Hour1 => "1h",
            TimeFrame::Day1 => "1d",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1h" | "h1" | "hour" | "hourly" => Ok(TimeFrame::Hour1),
            "1d" | "d1" | "day" | "daily" => Ok(TimeFrame::Day1),
            other => Err(anyhow::anyhow!("Unknown timeframe '{}'. Use '1h' or '1d'.", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Warning,
    Neutral,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::Warning => "WARNING",
            SignalKind::Neutral => "NEUTRAL",
        }
    }

    /// Whether the signal carries entry/stop/target levels.
    pub fn is_actionable(&self) -> bool {
        matches!(self, SignalKind::Buy | SignalKind::Sell)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub reason: String,
    pub entry: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Signal {
    /// A signal without price levels (WARNING or NEUTRAL).
    pub fn passive(kind: SignalKind, reason: &str) -> Self {
        Signal {
            kind,
            reason: reason.to_string(),
            entry: None,
            stop_loss: None,
            take_profit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    // Equal averages fall through to bearish; there is no flat state.
    pub fn from_emas(ema_fast: f64, ema_slow: f64) -> Self {
        if ema_fast > ema_slow {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "BULLISH",
            Trend::Bearish => "BEARISH",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline metrics for the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub last_close: f64,
    pub price_change: f64,
    pub rsi: f64,
    pub rsi_change: Option<f64>,
    pub trend: Trend,
    pub risk_distance: f64,
}
