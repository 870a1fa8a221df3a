// Prompt constants for letter drafting and precedent augmentation.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::drafting::splice::{
    PLACEHOLDER_HEADING, PRECEDENT_HEADING, SETTLEMENT_HEADING, TERMINAL_HEADING,
};
use crate::llm_client::prompts::{LEGAL_ASSISTANT_ROLE, MARKDOWN_SECTIONS_INSTRUCTION};

/// Leading text part of the drafting message; the evidence files follow it.
pub fn drafting_instruction() -> String {
    format!(
        "Generate a professional demand letter based on the provided documents. \
        The letter should be formal, assertive, and include relevant details from the documents. \
        Format the response in markdown.\n\n\
        Include a section headed exactly `{placeholder}` containing only the line \
        `[Comparable verdicts to be researched]`. \
        End the letter with a section headed exactly `{terminal}` stating the demand and the response deadline.",
        placeholder = PLACEHOLDER_HEADING.trim_end(),
        terminal = TERMINAL_HEADING,
    )
}

/// Letters are truncated to this many characters before the digest call.
pub const DIGEST_INPUT_CHARS: usize = 12_000;

pub fn digest_system() -> String {
    format!(
        "{LEGAL_ASSISTANT_ROLE} Summarize cases for a legal researcher. \
        Respond in plain text, no more than 120 words."
    )
}

/// Digest prompt template. Replace `{letter}` before sending.
pub const DIGEST_PROMPT_TEMPLATE: &str = r#"Summarize the key facts of the personal injury claim described in this demand letter.

Include, when stated:
- Jurisdiction (state and county)
- Type of incident and how liability arose
- Injuries and treatment
- Total medical specials and lost wages
- The amount demanded

DEMAND LETTER:
{letter}"#;

pub const RESEARCH_SYSTEM: &str = "You are a legal research assistant. \
    Find real, verifiable jury verdicts and settlements. \
    Never invent a case. If nothing comparable can be found, say so.";

/// Research prompt template. Replace `{digest}` before sending.
pub const RESEARCH_PROMPT_TEMPLATE: &str = r#"Find one reported jury verdict or settlement comparable to the claim below, preferably from the same jurisdiction and within the last ten years.

Give the case name, court, year, outcome amount, and a two-sentence summary of why it is comparable.

CLAIM:
{digest}"#;

pub fn synthesis_system() -> String {
    format!("{LEGAL_ASSISTANT_ROLE} {MARKDOWN_SECTIONS_INSTRUCTION}")
}

/// Synthesis prompt body. Variables: `letter_prefix`, `case_text`.
pub fn synthesis_prompt_template() -> String {
    format!(
        r#"Below is the beginning of a demand letter and research on a comparable case.

Write exactly two new sections that continue the letter:

{precedent}
Present the comparable case (name, court, year, outcome) and explain why it supports this claim. Use only the facts given in the research.

{settlement}
State the settlement demand and justify the amount with the damages in the letter and the comparable outcome.

LETTER SO FAR:
{{{{ letter_prefix }}}}

COMPARABLE CASE RESEARCH:
{{{{ case_text }}}}"#,
        precedent = PRECEDENT_HEADING,
        settlement = SETTLEMENT_HEADING,
    )
}
