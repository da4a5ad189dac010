use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV data format error: {0}")]
    CsvDataFormatError(String),

    // Upstream fetch failure; kept apart from the history conditions below so
    // callers can retry the fetch instead of waiting for more bars.
    #[error("Market data error: {0}")]
    MarketDataError(String),

    #[error("Empty input: no bars to analyze")]
    EmptyInput,

    #[error("Insufficient history: {required} bars required, {available} available")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Bars out of order: timestamp at index {index} does not follow its predecessor")]
    UnorderedBars { index: usize },

    #[error("Invalid risk distance {0}: must be a positive finite amount")]
    InvalidRiskDistance(f64),

    #[error("Invalid signal input: {0}")]
    InvalidSignalInput(String),

    #[error("Invalid symbol '{0}': only letters, digits and '=^._-' are allowed")]
    InvalidSymbol(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeFrame(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        match &err {
            EngineError::EmptyInput
            | EngineError::InsufficientHistory { .. }
            | EngineError::UnorderedBars { .. } => {
                tracing::warn!("Analysis precondition not met: {}", err);
            }
            _ => tracing::error!("Mapping EngineError to tonic::Status: {:?}", err),
        }
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            EngineError::CsvSystemError { source } => tonic::Status::invalid_argument(format!("CSV parsing system error: {}", source)),
            EngineError::IoError { source } => tonic::Status::internal(format!("I/O error: {}", source)),
            EngineError::CsvDataFormatError(msg) => tonic::Status::invalid_argument(format!("CSV data format error: {}", msg)),

            EngineError::MarketDataError(msg) => {
                if msg.to_lowercase().contains("not found") {
                    tonic::Status::not_found(msg)
                } else {
                    tonic::Status::unavailable(format!("Market data error: {}", msg))
                }
            }
            e @ EngineError::EmptyInput => tonic::Status::failed_precondition(e.to_string()),
            e @ EngineError::InsufficientHistory { .. } => tonic::Status::failed_precondition(e.to_string()),
            e @ EngineError::UnorderedBars { .. } => tonic::Status::failed_precondition(e.to_string()),
            e @ EngineError::InvalidRiskDistance(_) => tonic::Status::invalid_argument(e.to_string()),
            e @ EngineError::InvalidSignalInput(_) => tonic::Status::invalid_argument(e.to_string()),
            e @ EngineError::InvalidSymbol(_) => tonic::Status::invalid_argument(e.to_string()),
            EngineError::InvalidTimeFrame(msg) => tonic::Status::invalid_argument(format!("Invalid timeframe: {}", msg)),
            EngineError::ProcessingError(msg) => tonic::Status::internal(format!("Processing error: {}", msg)),
        }
    }
}
