//! Cross-letter comparison report (markdown).

use chrono::{DateTime, Utc};

use crate::evaluation::evaluator::EvaluationResult;
use crate::evaluation::rubric::{resolve_category, Category, CategoryScore};

pub const TOO_FEW_EVALUATIONS: &str = "Need at least two evaluations to compare.";

/// Evaluations by weighted score, highest first. Ties keep their input order.
pub fn ranked(evaluations: &[EvaluationResult]) -> Vec<&EvaluationResult> {
    let mut sorted: Vec<&EvaluationResult> = evaluations.iter().collect();
    sorted.sort_by(|a, b| b.weighted_score.total_cmp(&a.weighted_score));
    sorted
}

/// The first raw label in `evaluation` that resolves to `category`.
fn category_entry(evaluation: &EvaluationResult, category: Category) -> Option<&CategoryScore> {
    evaluation
        .category_scores
        .iter()
        .find(|(label, _)| resolve_category(label) == Some(category))
        .map(|(_, entry)| entry)
}

pub fn compare_evaluations(evaluations: &[EvaluationResult], generated_at: DateTime<Utc>) -> String {
    if evaluations.len() < 2 {
        return TOO_FEW_EVALUATIONS.to_string();
    }

    let mut out = String::from("# Demand Letter Evaluation Comparison\n\n");
    out.push_str(&format!(
        "_Generated {}_\n\n",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    out.push_str("## Overall Ranking\n\n");
    for (i, evaluation) in ranked(evaluations).iter().enumerate() {
        out.push_str(&format!(
            "{}. {} - Score: {:.2}\n",
            i + 1,
            evaluation.letter_name,
            evaluation.weighted_score
        ));
    }

    out.push_str("\n## Category Comparison\n\n");
    for category in Category::ALL {
        out.push_str(&format!("\n### {}\n\n", category.name()));

        let mut by_score: Vec<(&EvaluationResult, Option<&CategoryScore>)> = evaluations
            .iter()
            .map(|e| (e, category_entry(e, category)))
            .collect();
        by_score.sort_by_key(|(_, entry)| std::cmp::Reverse(entry.map_or(0, |c| c.score)));

        for (evaluation, entry) in by_score {
            match entry {
                Some(c) => out.push_str(&format!(
                    "- {}: {}/5 - {}\n",
                    evaluation.letter_name, c.score, c.explanation
                )),
                None => out.push_str(&format!(
                    "- {}: N/A/5 - No explanation provided\n",
                    evaluation.letter_name
                )),
            }
        }
    }

    out
}
