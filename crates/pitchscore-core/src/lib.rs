//! Core library for pitch-deck scoring.
//!
//! This crate provides:
//! - Text extraction from PDF and PPTX decks
//! - A keyword heuristic scorer over five rubric categories
//! - A remote language-model scorer with score normalization
//! - An analyzer that falls back from the remote scorer to the heuristic

pub mod analyzer;
pub mod error;
pub mod extract;
pub mod models;
pub mod scoring;

pub use analyzer::{AnalysisReport, Analyzer, Strategy};
pub use error::{DecodeError, PitchError, RemoteScoreError, Result};
pub use extract::{DeckExtractor, DocumentKind, TextExtractor};
pub use models::{AnalysisResult, Breakdown, Category, PitchConfig, ScoringMode};
pub use scoring::{ChatModelScorer, HeuristicScorer, ModelScorer, PatternTable};
