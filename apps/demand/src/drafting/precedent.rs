//! Precedent augmentation: digest → research → synthesis → splice.
//!
//! Best effort. Any failure along the way is logged and the caller gets the
//! original letter back unchanged.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::drafting::prompts::{
    digest_system, synthesis_prompt_template, synthesis_system, DIGEST_INPUT_CHARS,
    DIGEST_PROMPT_TEMPLATE, RESEARCH_PROMPT_TEMPLATE, RESEARCH_SYSTEM,
};
use crate::drafting::splice::SectionSplicer;
use crate::evaluation::template::PromptTemplate;
use crate::llm_client::{
    strip_code_fences, ChatModel, ChatRequest, ChatResponse, LlmError, DIGEST_MODEL,
    DRAFTING_MODEL, RESEARCH_MODEL,
};

#[derive(Debug, Error)]
pub enum AugmentError {
    #[error("{stage} call failed: {source}")]
    Call {
        stage: &'static str,
        #[source]
        source: LlmError,
    },

    #[error("synthesis returned no `## ` sections")]
    NoSections,
}

fn call_failed(stage: &'static str) -> impl FnOnce(LlmError) -> AugmentError {
    move |source| AugmentError::Call { stage, source }
}

/// Returns `letter` with comparable-case sections spliced in, or `letter`
/// itself when any step fails.
pub async fn augment_with_precedent(
    text: &dyn ChatModel,
    search: &dyn ChatModel,
    letter: &str,
) -> String {
    match try_augment(text, search, letter, &SectionSplicer::default()).await {
        Ok(augmented) => {
            info!("Precedent sections added to letter");
            augmented
        }
        Err(e) => {
            warn!("Precedent augmentation skipped, keeping original letter: {e}");
            letter.to_string()
        }
    }
}

pub async fn try_augment(
    text: &dyn ChatModel,
    search: &dyn ChatModel,
    letter: &str,
    splicer: &SectionSplicer,
) -> Result<String, AugmentError> {
    // Call A: short digest of the claim for the search model.
    let excerpt: String = letter.chars().take(DIGEST_INPUT_CHARS).collect();
    let digest = text
        .complete(
            ChatRequest::new(DIGEST_MODEL)
                .system(digest_system())
                .text(DIGEST_PROMPT_TEMPLATE.replace("{letter}", &excerpt))
                .temperature(0.2),
        )
        .await
        .map_err(call_failed("digest"))?
        .text;
    debug!("Case digest: {digest}");

    // Call B: comparable verdict from the search-augmented model.
    let research = search
        .complete(
            ChatRequest::new(RESEARCH_MODEL)
                .system(RESEARCH_SYSTEM)
                .text(RESEARCH_PROMPT_TEMPLATE.replace("{digest}", digest.trim())),
        )
        .await
        .map_err(call_failed("research"))?;
    let case_text = with_sources(&research);
    info!(
        "Precedent research returned {} chars, {} sources",
        case_text.len(),
        research.citations.len()
    );

    // Call C: the two new sections, written against everything before the splice point.
    let prompt = PromptTemplate::inline("synthesis", &synthesis_prompt_template()).render(&[
        ("letter_prefix", splicer.prefix(letter)),
        ("case_text", &case_text),
    ]);
    let synthesis = text
        .complete(
            ChatRequest::new(DRAFTING_MODEL)
                .system(synthesis_system())
                .text(prompt),
        )
        .await
        .map_err(call_failed("synthesis"))?;

    let sections = strip_code_fences(&synthesis.text);
    if !sections.lines().any(|line| line.starts_with("## ")) {
        return Err(AugmentError::NoSections);
    }

    Ok(splicer.splice(letter, sections))
}

/// Research text followed by its citation URLs, if the provider returned any.
fn with_sources(response: &ChatResponse) -> String {
    let body = response.text.trim();
    if response.citations.is_empty() {
        return body.to_string();
    }
    let sources: Vec<String> = response
        .citations
        .iter()
        .enumerate()
        .map(|(i, url)| format!("[{}] {url}", i + 1))
        .collect();
    format!("{body}\n\nSources:\n{}", sources.join("\n"))
}
