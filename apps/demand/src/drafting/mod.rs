// Demand letter drafting.
// Implements: evidence-to-letter drafting, precedent research and section splicing.
// All model calls go through llm_client.

pub mod drafter;
pub mod precedent;
pub mod prompts;
pub mod splice;
