pub mod chart_engine;
pub mod config;

pub use chart_engine::*;
pub use config::{EngineConfig, MAX_HOLD_DURATION_MS};
