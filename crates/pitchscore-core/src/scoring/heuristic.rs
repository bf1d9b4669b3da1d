//! Keyword heuristic scorer.

use tracing::trace;

use super::patterns::PatternTable;
use super::recommend::recommend;
use crate::models::{AnalysisResult, Breakdown, Category, ScoringConfig};

/// Deterministic, network-free scorer.
///
/// For each category, every pattern that matches at least once earns a point,
/// and one more if it matches more than `bonus_threshold` times. The category
/// score is `floor(points / (patterns + 2) * 100)`, capped at 100.
#[derive(Debug, Clone)]
pub struct HeuristicScorer {
    patterns: PatternTable,
    bonus_threshold: usize,
}

impl HeuristicScorer {
    /// Create a scorer over the built-in patterns with a bonus threshold of 2.
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::default(),
            bonus_threshold: 2,
        }
    }

    /// Create a scorer from configuration.
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new().with_bonus_threshold(config.bonus_threshold)
    }

    /// Use a custom pattern table.
    pub fn with_patterns(mut self, patterns: PatternTable) -> Self {
        self.patterns = patterns;
        self
    }

    /// Set the match count a pattern must exceed to earn the frequency bonus.
    pub fn with_bonus_threshold(mut self, threshold: usize) -> Self {
        self.bonus_threshold = threshold;
        self
    }

    /// Score every category.
    pub fn score(&self, text: &str) -> Breakdown {
        let lowered = text.to_lowercase();
        Breakdown::from_fn(|category| self.category_score(&lowered, category))
    }

    /// Score every category and attach the lookup-table recommendations.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let breakdown = self.score(text);
        let recommendations = recommend(&breakdown);
        AnalysisResult::new(breakdown, recommendations)
    }

    fn category_score(&self, lowered: &str, category: Category) -> u32 {
        let patterns = self.patterns.patterns(category);
        let mut found = 0usize;

        for pattern in patterns {
            // Counting past the threshold cannot change the result.
            let count = pattern
                .find_iter(lowered)
                .take(self.bonus_threshold.saturating_add(1))
                .count();
            if count > 0 {
                found += 1;
            }
            if count > self.bonus_threshold {
                found += 1;
            }
            trace!("{} pattern {} matched {} time(s)", category, pattern.as_str(), count);
        }

        let max_possible = patterns.len() + 2;
        ((found * 100 / max_possible) as u32).min(100)
    }
}

impl Default for HeuristicScorer {
    fn default() -> Self {
        Self::new()
    }
}
