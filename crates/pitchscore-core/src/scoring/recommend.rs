//! Fixed improvement tips keyed by category.

use crate::models::{Breakdown, Category};

/// Categories scoring below this get a tip.
pub const RECOMMENDATION_THRESHOLD: u8 = 70;

/// Given when every category clears the threshold.
pub const GENERIC_TIP: &str = "Great fundamentals. Add traction metrics and a clear 'ask'.";

/// Improvement tip for a weak category.
pub fn tip(category: Category) -> &'static str {
    match category {
        Category::Team => "Add a team slide: roles, achievements, why this team wins.",
        Category::Market => "Quantify TAM/SAM/SOM and add customer validation/segments.",
        Category::Product => "Clarify problem→solution; show MVP screenshots or demo link.",
        Category::Finance => "Explain pricing, unit economics (CAC/LTV, margin) and GTM.",
        Category::Design => "Improve visuals: consistent UI/UX, Figma mockups, clear layout.",
    }
}

/// One tip per category below the threshold, in rubric order, or the generic
/// tip alone. Never empty.
pub fn recommend(breakdown: &Breakdown) -> Vec<String> {
    let mut tips: Vec<String> = breakdown
        .iter()
        .filter(|(_, score)| *score < RECOMMENDATION_THRESHOLD)
        .map(|(category, _)| tip(category).to_string())
        .collect();

    if tips.is_empty() {
        tips.push(GENERIC_TIP.to_string());
    }
    tips
}
