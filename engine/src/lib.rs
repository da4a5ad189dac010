// Engine library root: indicator pipeline, signal rule, bar sources and the gRPC surface.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod services;
pub mod signals;

pub use analysis::{run_analysis, AnalysisReport};
pub use error::EngineError;
