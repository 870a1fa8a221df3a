// Demand letter evaluation.
// Implements: response parsing, rubric scoring, prompt templating, per-letter
// evaluation and cross-letter comparison. Model calls go through llm_client.

pub mod compare;
pub mod evaluator;
pub mod parser;
pub mod prompts;
pub mod rubric;
pub mod template;
