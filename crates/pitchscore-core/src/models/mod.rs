//! Data models shared across the pipeline.

pub mod analysis;
pub mod config;

pub use analysis::{AnalysisResult, Breakdown, Category};
pub use config::{LimitsConfig, PitchConfig, RemoteConfig, ScoringConfig, ScoringMode};
