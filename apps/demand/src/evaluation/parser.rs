//! Turns a model's free-text rubric evaluation into `CategoryScores`.
//!
//! A scored line looks like `Label: ... <digit 1-5> ... explanation`. Lines that
//! don't fit are skipped silently; a sloppy response just scores fewer categories.

use std::sync::LazyLock;

use regex::Regex;

use crate::evaluation::rubric::{CategoryScore, CategoryScores};

static SCORE_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[1-5]\b").expect("score pattern is valid"));

pub fn parse_evaluation_response(text: &str) -> CategoryScores {
    let lines: Vec<&str> = text.trim().lines().collect();
    let mut scores = CategoryScores::new();

    for (i, line) in lines.iter().enumerate() {
        let Some((label, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(found) = SCORE_DIGIT.find(rest) else {
            continue;
        };
        let Ok(score) = found.as_str().parse::<u8>() else {
            continue;
        };

        let mut explanation = rest[found.end()..]
            .trim_matches(|c| c == ' ' || c == '-')
            .to_string();
        if explanation.is_empty() {
            if let Some(next) = lines.get(i + 1) {
                explanation = next.trim().to_string();
            }
        }

        scores.insert(label.trim().to_string(), CategoryScore { score, explanation });
    }

    scores
}
