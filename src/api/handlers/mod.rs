// src/api/handlers/mod.rs
mod analyze;
mod health;
mod relay;

pub use analyze::{AnalyzeRequest, AnalyzeResponse, analyze};
pub use health::health_check;
pub use relay::analyze_entry;
