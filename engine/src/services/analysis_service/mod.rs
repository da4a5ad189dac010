// engine/src/services/analysis_service/mod.rs
// MarketAnalysisEngine and its AnalysisEngine impl; each RPC is handled in
// its own submodule.

use super::{
    AnalysisEngine, AnalyzeRequest, AnalyzeResponse, EvaluateSignalRequest, IndicatorChunk,
    SignalResponse,
};
use crate::config::EngineSettings;
use crate::data::market_data::BarSource;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

pub mod analyze_market;
pub mod evaluate_signal;
pub mod helpers;
pub mod stream_indicators;

pub struct MarketAnalysisEngine {
    settings: Arc<EngineSettings>,
    source: Arc<dyn BarSource>,
}

impl MarketAnalysisEngine {
    pub fn new(settings: Arc<EngineSettings>, source: Arc<dyn BarSource>) -> Self {
        MarketAnalysisEngine { settings, source }
    }
}

#[tonic::async_trait]
impl AnalysisEngine for MarketAnalysisEngine {
    async fn analyze_market(&self, request: Request<AnalyzeRequest>) -> Result<Response<AnalyzeResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            timeframe = %req_payload.timeframe,
            risk_distance = ?req_payload.risk_distance,
            "Received AnalyzeMarketRequest, dispatching to handler."
        );
        analyze_market::handle_analyze_market(req_payload, self.settings.clone(), self.source.clone()).await
    }

    type StreamIndicatorsStream = ReceiverStream<Result<IndicatorChunk, Status>>;
    async fn stream_indicators(&self, request: Request<AnalyzeRequest>) -> Result<Response<Self::StreamIndicatorsStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            timeframe = %req_payload.timeframe,
            "Received StreamIndicatorsRequest, dispatching to handler."
        );
        stream_indicators::handle_stream_indicators(req_payload, self.settings.clone(), self.source.clone()).await
    }

    async fn evaluate_signal(&self, request: Request<EvaluateSignalRequest>) -> Result<Response<SignalResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            close = req_payload.close,
            rsi = req_payload.rsi,
            ema_fast = req_payload.ema_fast,
            ema_slow = req_payload.ema_slow,
            risk_distance = req_payload.risk_distance,
            "Received EvaluateSignalRequest, dispatching to handler."
        );
        evaluate_signal::handle_evaluate_signal(req_payload)
    }
}
