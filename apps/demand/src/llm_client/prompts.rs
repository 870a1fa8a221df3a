// Shared prompt fragments.
// Each pipeline that calls a model keeps its own prompts.rs alongside it;
// only cross-cutting pieces live here.

/// Base persona for every assistant-style call on personal injury material.
pub const LEGAL_ASSISTANT_ROLE: &str = "You are a legal assistant working on personal injury \
    demand letters.";

/// Appended to prompts whose output is spliced into a markdown letter.
pub const MARKDOWN_SECTIONS_INSTRUCTION: &str = "\
    Format the response in markdown. Use `## ` level-two headings for sections. \
    Do NOT wrap the response in code fences. \
    Do NOT add commentary before or after the requested content.";
