// Handler for the StreamIndicators RPC
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use super::helpers::{fetch_bars, resolve_request, to_proto_candle};
use crate::config::EngineSettings;
use crate::data::market_data::BarSource;
use crate::indicators::compute_indicators;
use crate::services::{AnalyzeRequest, IndicatorChunk, ProtoCandle};

pub const CHUNK_SIZE: usize = 250;

pub async fn handle_stream_indicators(
    req_payload: AnalyzeRequest,
    settings: Arc<EngineSettings>,
    source: Arc<dyn BarSource>,
) -> Result<Response<ReceiverStream<Result<IndicatorChunk, Status>>>, Status> {
    let request = resolve_request(&req_payload.symbol, &req_payload.timeframe, req_payload.risk_distance, &settings)?;
    let bars = fetch_bars(source, &request).await?;

    // The chart may be drawn before the slow EMA is defined, so only an
    // empty series is refused here.
    let analyzed = compute_indicators(&bars)?;
    let candles: Vec<ProtoCandle> = analyzed.iter().map(to_proto_candle).collect();

    let (tx, rx) = mpsc::channel(4);
    let symbol_for_log = request.symbol.clone();

    tokio::spawn(async move {
        tracing::debug!(symbol = %symbol_for_log, count = candles.len(), "Streaming indicator series (handler).");
        for chunk in candles.chunks(CHUNK_SIZE) {
            let response = IndicatorChunk { candles: chunk.to_vec() };
            if let Err(e) = tx.send(Ok(response)).await {
                tracing::error!(error = ?e, symbol = %symbol_for_log, "Failed to send indicator chunk to stream (handler)");
                return;
            }
        }
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}
