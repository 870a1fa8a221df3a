//! Letter Evaluation: orchestrates the rubric scoring run.
//!
//! Flow: ensure folders → case facts (cached) → for each letter PDF:
//!       extract text → render prompt → model call → parse → score → write JSON
//!       → optional comparison report.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::data_dir::{write_file, DataDir};
use crate::documents::{document_name, extract_text, list_with_extension};
use crate::errors::AppError;
use crate::evaluation::compare::{compare_evaluations, ranked};
use crate::evaluation::parser::parse_evaluation_response;
use crate::evaluation::prompts::{
    EVALUATION_PROMPT_TEMPLATE, EVALUATION_TEMPLATE_NAME, EVALUATOR_SYSTEM,
};
use crate::evaluation::rubric::{score_categories, CategoryScores};
use crate::evaluation::template::PromptTemplate;
use crate::facts::{extract_case_facts, CachePolicy, ExtractedFacts};
use crate::llm_client::{ChatModel, ChatRequest};

const NO_FACTS: &str = "No consolidated facts available.";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Per-letter result, persisted as `results/<stem>_evaluation.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub letter_name: String,
    pub model_used: String,
    pub category_scores: CategoryScores,
    pub weighted_score: f64,
    pub full_evaluation: String,
}

#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    pub model: String,
    pub cache: CachePolicy,
    pub compare: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Evaluates every letter in `demand_letters/` and returns the results in file order.
pub async fn run_evaluation(
    llm: &dyn ChatModel,
    data: &DataDir,
    templates_dir: &Path,
    options: &EvaluateOptions,
) -> Result<Vec<EvaluationResult>, AppError> {
    data.ensure()?;

    let facts = extract_case_facts(llm, data, options.cache).await?;

    let letters = list_with_extension(&data.demand_letters(), "pdf")?;
    if letters.is_empty() {
        error!(
            "No demand letters found in {}",
            data.demand_letters().display()
        );
        return Ok(Vec::new());
    }

    let template = PromptTemplate::load(
        templates_dir,
        EVALUATION_TEMPLATE_NAME,
        EVALUATION_PROMPT_TEMPLATE,
    )?;

    let mut evaluations = Vec::with_capacity(letters.len());
    for letter_path in &letters {
        let result = evaluate_letter(llm, &template, letter_path, &facts, &options.model).await?;

        let result_path = data.evaluation_result(&document_name(letter_path));
        write_file(&result_path, &serde_json::to_string_pretty(&result)?)?;
        info!("Evaluation saved to {}", result_path.display());

        evaluations.push(result);
    }

    if options.compare && evaluations.len() >= 2 {
        let report = compare_evaluations(&evaluations, Utc::now());
        let report_path = data.comparison_report();
        write_file(&report_path, &report)?;
        info!("Comparison saved to {}", report_path.display());

        println!("\nDemand Letter Comparison Summary:");
        println!("---------------------------------");
        for evaluation in ranked(&evaluations) {
            println!("{}: {:.2}", evaluation.letter_name, evaluation.weighted_score);
        }
    }

    Ok(evaluations)
}

/// Scores a single letter PDF against the case facts.
pub async fn evaluate_letter(
    llm: &dyn ChatModel,
    template: &PromptTemplate,
    letter_path: &Path,
    facts: &ExtractedFacts,
    model: &str,
) -> Result<EvaluationResult, AppError> {
    info!("Evaluating demand letter: {}", letter_path.display());

    let letter_text = extract_text(letter_path);
    let facts_text = if facts.consolidated_summary.trim().is_empty() {
        NO_FACTS
    } else {
        facts.consolidated_summary.as_str()
    };
    debug!(
        "Facts for evaluation: {}...",
        facts_text.chars().take(500).collect::<String>()
    );

    let prompt = template.render(&[
        ("source_document_facts", facts_text),
        ("demand_letter_content", &letter_text),
    ]);

    info!("Submitting evaluation to {model} using {}", template.name());
    let response = llm
        .complete(ChatRequest::new(model).system(EVALUATOR_SYSTEM).text(prompt))
        .await?;

    let letter_name = letter_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(build_result(letter_name, model, response.text))
}

/// Parses and scores a raw evaluation response.
pub fn build_result(letter_name: String, model: &str, evaluation_text: String) -> EvaluationResult {
    let category_scores = parse_evaluation_response(&evaluation_text);
    let weighted = score_categories(&category_scores);

    info!(
        "{letter_name}: weighted score {:.2} ({} categories, {:.0}% of rubric weight)",
        weighted.total,
        weighted.matched.len(),
        weighted.matched_weight * 100.0
    );

    EvaluationResult {
        letter_name,
        model_used: model.to_string(),
        category_scores,
        weighted_score: weighted.total,
        full_evaluation: evaluation_text,
    }
}
