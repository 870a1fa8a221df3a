// Prompt constants for rubric evaluation.

/// File name looked up in the templates folder before falling back to
/// `EVALUATION_PROMPT_TEMPLATE`.
pub const EVALUATION_TEMPLATE_NAME: &str = "evaluation_prompt.j2";

/// System prompt for the evaluator. Deliberately strict.
pub const EVALUATOR_SYSTEM: &str = "You are an expert legal evaluator who specializes in \
    assessing demand letters for personal injury cases. You have a reputation for being \
    thorough, critical, and having very high standards. You should be strict in your \
    evaluation and only give high scores when fully warranted by exceptional work. Apply the \
    critical failure conditions rigorously.";

/// Built-in evaluation prompt. Variables: `source_document_facts`, `demand_letter_content`.
/// Category names must stay in sync with `rubric::Category::name`.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate the following personal injury demand letter against the verified facts from the source documents.

SOURCE DOCUMENT FACTS (ground truth):
{{ source_document_facts }}

DEMAND LETTER:
{{ demand_letter_content }}

Score the letter from 1 (poor) to 5 (exceptional) in each category below. Weights are shown for context only.

- Structure and Organization (10%): logical flow, clear headings, professional formatting.
- Factual Presentation (10%): accurate, complete, chronological account of the incident.
- Medical Documentation (15%): injuries, treatment, providers and prognosis supported by records.
- Damages Calculation (25%): itemized specials, correct arithmetic, future costs, general damages.
- Precedent and Legal Authority (10%): relevant verdicts, settlements or statutes, correctly cited.
- Legal Strategy (5%): liability theory, anticipation of defenses, use of leverage.
- Persuasiveness (10%): tone, narrative strength, credibility.
- Settlement Justification (10%): demand amount tied to the evidence and comparable outcomes.
- Source Document Representation (5%): every fact traceable to the source documents.

CRITICAL FAILURE CONDITIONS:
- Any fact, figure or date that contradicts the source documents caps Factual Presentation and Source Document Representation at 2.
- Arithmetic errors in the damages total cap Damages Calculation at 2.
- A fabricated or unverifiable case citation caps Precedent and Legal Authority at 1.
- A missing explicit demand amount caps Settlement Justification at 1.

OUTPUT FORMAT (one line per category, exactly):
Category Name: <score> - <one or two sentence explanation>

After the nine category lines, add a short overall assessment paragraph."#;
