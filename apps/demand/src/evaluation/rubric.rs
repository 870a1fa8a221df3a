//! Rubric scoring: resolves free-form category labels to the nine canonical
//! categories and folds their 1–5 scores into one weighted total.
//!
//! The total is the plain `Σ score × weight` over resolved categories. It is NOT
//! divided by the weight actually matched: an evaluation that omits categories
//! scores lower, and comparison rankings rely on that.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One scored rubric line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub score: u8,
    pub explanation: String,
}

/// Raw category label (as the model wrote it) → score.
pub type CategoryScores = BTreeMap<String, CategoryScore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    StructureAndOrganization,
    FactualPresentation,
    MedicalDocumentation,
    DamagesCalculation,
    PrecedentAndLegalAuthority,
    LegalStrategy,
    Persuasiveness,
    SettlementJustification,
    SourceDocumentRepresentation,
}

impl Category {
    /// Declaration order. Substring matching walks this list and takes the first hit.
    pub const ALL: [Category; 9] = [
        Category::StructureAndOrganization,
        Category::FactualPresentation,
        Category::MedicalDocumentation,
        Category::DamagesCalculation,
        Category::PrecedentAndLegalAuthority,
        Category::LegalStrategy,
        Category::Persuasiveness,
        Category::SettlementJustification,
        Category::SourceDocumentRepresentation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::StructureAndOrganization => "Structure and Organization",
            Category::FactualPresentation => "Factual Presentation",
            Category::MedicalDocumentation => "Medical Documentation",
            Category::DamagesCalculation => "Damages Calculation",
            Category::PrecedentAndLegalAuthority => "Precedent and Legal Authority",
            Category::LegalStrategy => "Legal Strategy",
            Category::Persuasiveness => "Persuasiveness",
            Category::SettlementJustification => "Settlement Justification",
            Category::SourceDocumentRepresentation => "Source Document Representation",
        }
    }

    /// Lowercase form used for matching.
    pub fn key(self) -> String {
        self.name().to_lowercase()
    }

    /// Weights sum to 1.0 across all nine categories.
    pub fn weight(self) -> f64 {
        match self {
            Category::StructureAndOrganization => 0.10,
            Category::FactualPresentation => 0.10,
            Category::MedicalDocumentation => 0.15,
            Category::DamagesCalculation => 0.25,
            Category::PrecedentAndLegalAuthority => 0.10,
            Category::LegalStrategy => 0.05,
            Category::Persuasiveness => 0.10,
            Category::SettlementJustification => 0.10,
            Category::SourceDocumentRepresentation => 0.05,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Label resolution
// ────────────────────────────────────────────────────────────────────────────

/// Strategies for mapping a cleaned label to a category, tried in `MATCHERS` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryMatcher {
    /// Cleaned label equals the canonical key.
    Exact,
    /// Canonical key appears inside the cleaned label; first category in
    /// declaration order wins.
    Substring,
}

pub const MATCHERS: [CategoryMatcher; 2] = [CategoryMatcher::Exact, CategoryMatcher::Substring];

impl CategoryMatcher {
    pub fn resolve(self, cleaned: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| {
            let key = c.key();
            match self {
                CategoryMatcher::Exact => cleaned == key,
                CategoryMatcher::Substring => cleaned.contains(&key),
            }
        })
    }
}

/// Strips markdown heading markers and surrounding whitespace, then lowercases.
pub fn normalize_label(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_lowercase()
}

pub fn resolve_category(raw_label: &str) -> Option<Category> {
    let cleaned = normalize_label(raw_label);
    MATCHERS.into_iter().find_map(|m| m.resolve(&cleaned))
}

// ────────────────────────────────────────────────────────────────────────────
// Weighted score
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of scoring one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedScore {
    /// `Σ score × weight` over resolved labels, not renormalized.
    pub total: f64,
    /// Sum of the weights that contributed; below 1.0 when categories were missed.
    pub matched_weight: f64,
    pub matched: Vec<(Category, u8)>,
}

pub fn score_categories(scores: &CategoryScores) -> WeightedScore {
    let mut total = 0.0;
    let mut matched_weight = 0.0;
    let mut matched = Vec::new();

    debug!("Raw scores: {scores:?}");

    for (raw_label, entry) in scores {
        let Some(category) = resolve_category(raw_label) else {
            debug!("No rubric category for label {raw_label:?}");
            continue;
        };
        let weight = category.weight();
        debug!(
            "Adding score for {}: {} x {}",
            category.name(),
            entry.score,
            weight
        );
        total += f64::from(entry.score) * weight;
        matched_weight += weight;
        matched.push((category, entry.score));
    }

    if matched_weight > 0.0 {
        debug!("Final weighted score: {total} (matched weight {matched_weight})");
        WeightedScore {
            total,
            matched_weight,
            matched,
        }
    } else {
        warn!("No valid categories found for scoring");
        WeightedScore {
            total: 0.0,
            matched_weight: 0.0,
            matched,
        }
    }
}
