// gRPC surface of the engine
pub mod generated {
    tonic::include_proto!("analysis");
}

pub use generated::analysis_engine_server::{AnalysisEngine, AnalysisEngineServer};
pub use generated::{
    AnalyzeRequest, AnalyzeResponse, ChartCandle as ProtoCandle, EvaluateSignalRequest,
    IndicatorChunk, MarketSnapshot as ProtoSnapshot, SignalResponse,
};

pub mod analysis_service;
