// Data models and display helpers shared by the engine library and its binaries.
pub mod models;
pub mod utils;
