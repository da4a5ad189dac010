// Trading signal evaluation for the latest analyzed bar
pub mod evaluator;

pub use evaluator::{evaluate, evaluate_signal, validate_risk_distance, SignalInputs, REWARD_TO_RISK};
