// Handler for the AnalyzeMarket RPC
use std::sync::Arc;
use tonic::{Response, Status};
use uuid::Uuid;

use super::helpers::{fetch_bars, resolve_request, to_proto_candle, to_proto_signal, to_proto_snapshot};
use crate::analysis::run_analysis;
use crate::config::EngineSettings;
use crate::data::market_data::BarSource;
use crate::services::{AnalyzeRequest, AnalyzeResponse};

pub async fn handle_analyze_market(
    req_payload: AnalyzeRequest,
    settings: Arc<EngineSettings>,
    source: Arc<dyn BarSource>,
) -> Result<Response<AnalyzeResponse>, Status> {
    let analysis_id = Uuid::new_v4().to_string();
    let request = resolve_request(&req_payload.symbol, &req_payload.timeframe, req_payload.risk_distance, &settings)?;
    tracing::debug!(%analysis_id, ?request, "Handling AnalyzeMarketRequest in dedicated handler");

    let bars = fetch_bars(source, &request).await?;
    if bars.is_empty() {
        tracing::warn!(%analysis_id, symbol = %request.symbol, timeframe = %request.timeframe, "Bar source returned no data");
    }
    let report = run_analysis(&bars, request.risk_distance)?;

    let chart = report.chart(settings.chart_window).iter().map(to_proto_candle).collect();
    tracing::info!(
        %analysis_id,
        symbol = %request.symbol,
        timeframe = %request.timeframe,
        kind = %report.signal.kind,
        reason = %report.signal.reason,
        "Market analyzed (handler)"
    );

    Ok(Response::new(AnalyzeResponse {
        analysis_id,
        symbol: request.symbol,
        timeframe: request.timeframe.to_string(),
        signal: Some(to_proto_signal(&report.signal)),
        snapshot: Some(to_proto_snapshot(&report.snapshot)),
        chart,
        candles_analyzed: report.candles.len() as i32,
    }))
}
