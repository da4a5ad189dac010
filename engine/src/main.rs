// Engine main entry point: serves the AnalysisEngine gRPC service
use engine::config::EngineSettings;
use engine::data::market_data::CsvBarSource;
use engine::services::analysis_service::MarketAnalysisEngine;
use engine::services::AnalysisEngineServer;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    info!("Starting Trend Sniper Engine...");

    // Settings file from SNIPER_CONFIG, defaults otherwise
    let settings = Arc::new(EngineSettings::load(None)?);
    let addr = tokio::net::lookup_host(settings.listen_addr())
        .await?
        .next()
        .ok_or_else(|| format!("Could not resolve listen address {}", settings.listen_addr()))?;
    info!(data_dir = %settings.data_dir.display(), symbol = %settings.symbol, "Engine will listen on {}", addr);

    let source = Arc::new(CsvBarSource::from_settings(&settings));
    let analysis_service = MarketAnalysisEngine::new(settings.clone(), source);

    Server::builder()
        .add_service(AnalysisEngineServer::new(analysis_service))
        .serve(addr)
        .await?;

    Ok(())
}
