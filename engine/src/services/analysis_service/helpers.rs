// Helper functions for the analysis service RPC implementations
use std::sync::Arc;

use crate::config::EngineSettings;
use crate::data::market_data::{validate_symbol, BarSource};
use crate::error::EngineError;
use crate::services::{ProtoCandle, ProtoSnapshot, SignalResponse};
use shared::models::{AnalyzedCandle, Candle, MarketSnapshot, Signal, TimeFrame};

/// An `AnalyzeRequest` with defaults filled in from the settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub risk_distance: f64,
}

pub fn resolve_request(
    symbol: &str,
    timeframe: &str,
    risk_distance: Option<f64>,
    settings: &EngineSettings,
) -> Result<ResolvedRequest, EngineError> {
    let timeframe: TimeFrame = timeframe
        .parse()
        .map_err(|e: anyhow::Error| EngineError::InvalidTimeFrame(e.to_string()))?;
    let symbol = match symbol.trim() {
        "" => settings.symbol.clone(),
        s => validate_symbol(s)?.to_string(),
    };
    let risk_distance = risk_distance.unwrap_or(settings.timeframe(timeframe).risk_distance);
    crate::signals::validate_risk_distance(risk_distance)?;
    Ok(ResolvedRequest { symbol, timeframe, risk_distance })
}

/// Runs the (blocking) bar fetch off the async runtime.
pub async fn fetch_bars(source: Arc<dyn BarSource>, request: &ResolvedRequest) -> Result<Vec<Candle>, EngineError> {
    let symbol = request.symbol.clone();
    let timeframe = request.timeframe;
    tokio::task::spawn_blocking(move || source.fetch_bars(&symbol, timeframe))
        .await
        .map_err(|e| EngineError::ProcessingError(format!("Bar fetch task failed: {}", e)))?
}

pub fn to_proto_candle(analyzed: &AnalyzedCandle) -> ProtoCandle {
    let candle = &analyzed.candle;
    ProtoCandle {
        timestamp: candle.timestamp.timestamp_millis(),
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volume: candle.volume,
        rsi: analyzed.indicators.rsi,
        ema_fast: analyzed.indicators.ema_fast,
        ema_slow: analyzed.indicators.ema_slow,
    }
}

pub fn to_proto_signal(signal: &Signal) -> SignalResponse {
    SignalResponse {
        kind: signal.kind.to_string(),
        reason: signal.reason.clone(),
        entry: signal.entry,
        stop_loss: signal.stop_loss,
        take_profit: signal.take_profit,
    }
}

pub fn to_proto_snapshot(snapshot: &MarketSnapshot) -> ProtoSnapshot {
    ProtoSnapshot {
        timestamp: snapshot.timestamp.timestamp_millis(),
        last_close: snapshot.last_close,
        price_change: snapshot.price_change,
        rsi: snapshot.rsi,
        rsi_change: snapshot.rsi_change,
        trend: snapshot.trend.to_string(),
        risk_distance: snapshot.risk_distance,
    }
}
