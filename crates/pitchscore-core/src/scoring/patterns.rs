//! Keyword pattern tables for the heuristic scorer.
//!
//! Each category owns an ordered list of word-boundary patterns matched
//! against lowercased deck text.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Category;

const TEAM: &[&str] = &[
    r"\bteam\b",
    r"\bfounder\b",
    r"\bco[- ]?founder\b",
    r"\bcto\b",
    r"\bceo\b",
    r"\bexperience\b",
    r"\baward\b",
    r"\badvisor\b",
    r"\bmentor\b",
];

const MARKET: &[&str] = &[
    r"\bmarket\b",
    r"\btam\b",
    r"\bsam\b",
    r"\bsom\b",
    r"\busers?\b",
    r"\bgrowth\b",
    r"\bcustomer\b",
    r"\bsegment\b",
    r"\btraction\b",
    r"\bcampaign\b",
    r"\binfluencer\b",
    r"\bpilot\b",
];

const PRODUCT: &[&str] = &[
    r"\bproduct\b",
    r"\bproblem\b",
    r"\bsolution\b",
    r"\bmvp\b",
    r"\bprototype\b",
    r"\btech(nology)?\b",
    r"\barchitecture\b",
    r"\balgorithm\b",
    r"\broadmap\b",
    r"\bapi\b",
    r"\bmobile app\b",
    r"\bbackend\b",
    r"\bfrontend\b",
];

const FINANCE: &[&str] = &[
    r"\brevenue\b",
    r"\bpricing\b",
    r"\bcost\b",
    r"\bunit\b",
    r"\bcogs\b",
    r"\bcac\b",
    r"\bltv\b",
    r"\bmargin\b",
    r"\bmoneti[sz]ation\b",
    r"\bgtm\b",
];

const DESIGN: &[&str] = &[
    r"\bdesign\b",
    r"\bui\b",
    r"\bux\b",
    r"\bmockups?\b",
    r"\bwireframes?\b",
    r"\bfigma\b",
    r"\bprototype\b",
    r"\bvisuals?\b",
    r"\btypography\b",
    r"\blayout\b",
    r"\bstyle\b",
    r"\bbrand(ing)?\b",
];

lazy_static! {
    static ref BUILTIN: PatternTable = PatternTable {
        sets: [
            compile_builtin(TEAM),
            compile_builtin(MARKET),
            compile_builtin(PRODUCT),
            compile_builtin(FINANCE),
            compile_builtin(DESIGN),
        ],
    };
}

fn compile_builtin(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|s| Regex::new(s).unwrap()).collect()
}

/// Category -> ordered pattern list. Immutable once built.
#[derive(Debug, Clone)]
pub struct PatternTable {
    sets: [Vec<Regex>; 5],
}

impl PatternTable {
    /// The built-in pitch-deck keyword table, compiled once.
    pub fn builtin() -> &'static PatternTable {
        &BUILTIN
    }

    /// Patterns for a category, in order.
    pub fn patterns(&self, category: Category) -> &[Regex] {
        &self.sets[category.index()]
    }

    /// Replace one category's pattern set.
    pub fn with_category(mut self, category: Category, sources: &[&str]) -> Result<Self, regex::Error> {
        self.sets[category.index()] = sources
            .iter()
            .map(|s| Regex::new(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self)
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}
