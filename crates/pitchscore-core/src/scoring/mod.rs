//! Deck scoring strategies.

mod heuristic;
pub mod patterns;
pub mod recommend;
pub mod remote;

pub use heuristic::HeuristicScorer;
pub use patterns::PatternTable;
pub use recommend::recommend;
pub use remote::{ChatModelScorer, ModelScorer};
