//! Rubric categories, score breakdowns and analysis results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five rubric dimensions a deck is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Team,
    Market,
    Product,
    Finance,
    Design,
}

impl Category {
    /// All categories in rubric order.
    pub const ALL: [Category; 5] = [
        Category::Team,
        Category::Market,
        Category::Product,
        Category::Finance,
        Category::Design,
    ];

    /// Weight in whole percent. The five weights sum to 100.
    pub fn weight_percent(self) -> u32 {
        match self {
            Category::Team => 25,
            Category::Market => 20,
            Category::Product => 30,
            Category::Finance => 20,
            Category::Design => 5,
        }
    }

    /// Weight as a fraction of the composite score.
    pub fn weight(self) -> f64 {
        f64::from(self.weight_percent()) / 100.0
    }

    /// Lowercase identifier used in JSON and CSV output.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Team => "team",
            Category::Market => "market",
            Category::Product => "product",
            Category::Finance => "finance",
            Category::Design => "design",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Category::Team => 0,
            Category::Market => 1,
            Category::Product => 2,
            Category::Finance => 3,
            Category::Design => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-category scores, each in `0..=100`. All five categories are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub team: u8,
    pub market: u8,
    pub product: u8,
    pub finance: u8,
    pub design: u8,
}

impl Breakdown {
    /// Build a breakdown by evaluating `f` for every category.
    ///
    /// Values above 100 are clamped.
    pub fn from_fn(mut f: impl FnMut(Category) -> u32) -> Self {
        let mut breakdown = Self::default();
        for category in Category::ALL {
            breakdown.set(category, f(category));
        }
        breakdown
    }

    /// Score for a category.
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Team => self.team,
            Category::Market => self.market,
            Category::Product => self.product,
            Category::Finance => self.finance,
            Category::Design => self.design,
        }
    }

    /// Set a category score, clamping to 100.
    pub fn set(&mut self, category: Category, score: u32) {
        let score = score.min(100) as u8;
        match category {
            Category::Team => self.team = score,
            Category::Market => self.market = score,
            Category::Product => self.product = score,
            Category::Finance => self.finance = score,
            Category::Design => self.design = score,
        }
    }

    /// Iterate `(category, score)` pairs in rubric order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, u8)> + '_ {
        Category::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// Weighted composite score: `round(sum(score[c] * weight[c]))`.
    ///
    /// Computed in integer percent so halves round up exactly.
    pub fn composite(&self) -> u8 {
        let weighted: u32 = self
            .iter()
            .map(|(c, s)| u32::from(s) * c.weight_percent())
            .sum();
        ((weighted + 50) / 100) as u8
    }
}

/// Final result of one deck analysis.
///
/// The headline score is always derived from the breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    score: u8,
    breakdown: Breakdown,
    recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn new(breakdown: Breakdown, recommendations: Vec<String>) -> Self {
        Self {
            score: breakdown.composite(),
            breakdown,
            recommendations,
        }
    }

    /// Composite score in `0..=100`.
    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn breakdown(&self) -> &Breakdown {
        &self.breakdown
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    /// Recommendations joined one per line, as stored alongside a saved result.
    pub fn notes(&self) -> String {
        self.recommendations.join("\n")
    }
}
