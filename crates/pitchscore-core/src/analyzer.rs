//! Analysis orchestration: extract once, try the remote scorer if configured,
//! fall back to the keyword heuristic.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::extract::{DeckExtractor, TextExtractor};
use crate::models::{AnalysisResult, PitchConfig, ScoringMode};
use crate::scoring::{ChatModelScorer, HeuristicScorer, ModelScorer};

/// Scorer that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Heuristic,
    Remote,
}

impl Strategy {
    /// Lowercase identifier used in JSON and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Heuristic => "heuristic",
            Strategy::Remote => "remote",
        }
    }
}

/// An analysis result with details about how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// The analysis result.
    pub result: AnalysisResult,
    /// Scorer that produced the result.
    pub strategy: Strategy,
    /// Why the remote scorer was abandoned, if it was tried and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_cause: Option<String>,
    /// Characters of extracted text.
    pub text_chars: usize,
    /// Wall-clock time for the whole analysis.
    pub processing_time_ms: u64,
    /// When the analysis finished.
    pub analyzed_at: DateTime<Utc>,
}

/// Turns document bytes into an [`AnalysisResult`].
///
/// Holds no per-call state; one analyzer can serve concurrent calls.
pub struct Analyzer {
    extractor: Box<dyn TextExtractor>,
    heuristic: HeuristicScorer,
    remote: Option<Box<dyn ModelScorer>>,
}

impl Analyzer {
    /// Heuristic-only analyzer with the default PDF/PPTX extractor.
    pub fn new() -> Self {
        Self {
            extractor: Box::new(DeckExtractor::new()),
            heuristic: HeuristicScorer::new(),
            remote: None,
        }
    }

    /// Build an analyzer from configuration.
    ///
    /// The remote scorer is attached only in remote mode with an API key.
    /// Remote mode without a usable key silently runs heuristic-only.
    pub fn from_config(config: &PitchConfig) -> Self {
        let mut analyzer = Self::new().with_heuristic(HeuristicScorer::from_config(&config.scoring));

        if config.remote_enabled() {
            match ChatModelScorer::new(&config.remote) {
                Ok(scorer) => {
                    info!("Remote scoring enabled with model {}", config.remote.model);
                    analyzer.remote = Some(Box::new(scorer));
                }
                Err(e) => warn!(cause = e.kind(), error = %e, "remote scorer unavailable, using heuristic only"),
            }
        } else if config.scoring.mode == ScoringMode::Remote {
            info!("Remote scoring requested without an API key, using heuristic only");
        }

        analyzer
    }

    /// Replace the text extractor.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the heuristic scorer.
    pub fn with_heuristic(mut self, heuristic: HeuristicScorer) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Attach a remote scorer, enabling the remote path.
    pub fn with_remote(mut self, remote: Box<dyn ModelScorer>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Drop the remote scorer.
    pub fn without_remote(mut self) -> Self {
        self.remote = None;
        self
    }

    /// Whether a remote scorer is attached.
    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Analyze a document. Only decode failures are returned as errors.
    pub async fn analyze(&self, data: &[u8], filename: Option<&str>) -> Result<AnalysisResult, DecodeError> {
        self.analyze_report(data, filename).await.map(|r| r.result)
    }

    /// Analyze a document and report how the result was produced.
    pub async fn analyze_report(
        &self,
        data: &[u8],
        filename: Option<&str>,
    ) -> Result<AnalysisReport, DecodeError> {
        let start = Instant::now();

        let text = self.extractor.extract(data, filename)?;
        let text_chars = text.chars().count();
        debug!("Extracted {} chars from {}", text_chars, filename.unwrap_or("<unnamed>"));

        let (result, strategy, fallback_cause) = self.score_text(&text).await;

        Ok(AnalysisReport {
            result,
            strategy,
            fallback_cause,
            text_chars,
            processing_time_ms: start.elapsed().as_millis() as u64,
            analyzed_at: Utc::now(),
        })
    }

    /// Score already-extracted text with the configured strategy.
    pub async fn score_text(&self, text: &str) -> (AnalysisResult, Strategy, Option<String>) {
        let mut fallback_cause = None;

        if let Some(remote) = &self.remote {
            match remote.score(text).await {
                Ok(result) => {
                    info!("Scored with {}", remote.name());
                    return (result, Strategy::Remote, None);
                }
                Err(e) => {
                    warn!(
                        cause = e.kind(),
                        error = %e,
                        scorer = remote.name(),
                        "remote scoring failed, falling back to heuristic"
                    );
                    fallback_cause = Some(e.kind().to_string());
                }
            }
        }

        info!("Scored with keyword heuristic");
        (self.heuristic.analyze(text), Strategy::Heuristic, fallback_cause)
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
