// Prompt constants for case-fact extraction.

/// System prompt for per-document extraction.
pub const DOCUMENT_FACTS_SYSTEM: &str = "You are a legal assistant who extracts key facts from \
    legal and medical documents for personal injury cases.";

/// Per-document extraction prompt. Replace `{doc_name}` and `{doc_text}` before sending.
pub const DOCUMENT_FACTS_PROMPT_TEMPLATE: &str = "Extract the most important facts from this \
document that would be relevant for a demand letter. Focus on dates, injuries, treatments, and \
damages.

Document: {doc_name}

{doc_text}";

/// System prompt for consolidating per-document facts.
pub const CONSOLIDATION_SYSTEM: &str = "You are a legal assistant who summarizes and organizes \
    case facts for personal injury demand letters.";

/// Consolidation prompt. Replace `{documents}` before sending.
pub const CONSOLIDATION_PROMPT_TEMPLATE: &str = "Based on these extracted facts from multiple \
documents, create a consolidated and organized summary of the most important facts for this \
case. Organize by categories like incident details, injuries, treatment, damages, etc.

{documents}";
