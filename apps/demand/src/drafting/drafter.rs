//! Letter Drafter: evidence folder in, markdown letter out.
//!
//! Flow: collect files → encode attachments → drafting call → strip fences
//!       → optional precedent augmentation → write output.

use std::path::Path;

use tracing::info;

use crate::data_dir::write_file;
use crate::documents::{collect_files, encode_attachment};
use crate::drafting::precedent::augment_with_precedent;
use crate::drafting::prompts::drafting_instruction;
use crate::errors::AppError;
use crate::llm_client::{strip_code_fences, ChatRequest, ContentPart, Services};

#[derive(Debug, Clone)]
pub struct DraftOptions {
    pub model: String,
    /// Run precedent research when a search model is configured.
    pub research: bool,
}

/// Drafts a letter from every file under `input_dir` and writes it to `output_file`.
/// Returns the final letter text.
pub async fn generate_demand_letter(
    services: &Services,
    input_dir: &Path,
    output_file: &Path,
    options: &DraftOptions,
) -> Result<String, AppError> {
    let files = collect_files(input_dir)?;
    if files.is_empty() {
        return Err(AppError::Validation(format!(
            "No files found in {}",
            input_dir.display()
        )));
    }
    info!("Found {} files in {}", files.len(), input_dir.display());

    let attachments = files
        .iter()
        .map(|path| encode_attachment(path))
        .collect::<Result<Vec<ContentPart>, AppError>>()?;

    let request = ChatRequest::new(&options.model)
        .text(drafting_instruction())
        .parts(attachments);

    info!("Generating demand letter with {}", options.model);
    let response = services.text.complete(request).await?;
    let mut letter = strip_code_fences(&response.text).to_string();
    letter.push('\n');

    match (&services.search, options.research) {
        (Some(search), true) => {
            info!("Researching comparable case precedent");
            letter = augment_with_precedent(services.text.as_ref(), search.as_ref(), &letter).await;
        }
        (None, true) => info!("No search model configured, skipping precedent research"),
        (_, false) => info!("Precedent research disabled"),
    }

    write_file(output_file, &letter)?;
    info!(
        "Demand letter successfully generated and saved to {}",
        output_file.display()
    );

    Ok(letter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::DRAFTING_MODEL;

    const DRAFT: &str = "```markdown
# Demand Letter

## Facts
Rear-end collision.

## Similar Case Verdicts
[Comparable verdicts to be researched]

## ASK
Pay $250,000 within 30 days.
```";

    const SYNTHESIS: &str = "## Comparable Case Precedent\nSmith v. Jones, $500,000, 2019.\n\n## Settlement Demand\nWe demand $250,000.";

    fn evidence_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("police_report.txt"), "Vehicle 2 failed to stop.").unwrap();
        std::fs::create_dir(dir.path().join("medical")).unwrap();
        std::fs::write(dir.path().join("medical").join("er_visit.pdf"), b"%PDF-1.4 fake").unwrap();
        dir
    }

    fn options(research: bool) -> DraftOptions {
        DraftOptions {
            model: DRAFTING_MODEL.to_string(),
            research,
        }
    }

    #[tokio::test]
    async fn test_draft_without_search_model_writes_letter() {
        let input = evidence_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("letters").join("draft.md");
        let text = Arc::new(ScriptedModel::new().reply(DRAFT));
        let services = Services {
            text: text.clone(),
            search: None,
        };

        let letter = generate_demand_letter(&services, input.path(), &output, &options(true))
            .await
            .unwrap();

        assert!(letter.starts_with("# Demand Letter\n"));
        assert!(letter.ends_with("within 30 days.\n"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), letter);

        let requests = text.requests();
        assert_eq!(requests.len(), 1);
        let parts = &requests[0].parts;
        // Instruction, then files in walk order: medical/er_visit.pdf, police_report.txt.
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], ContentPart::Text(t) if t.starts_with("Generate a professional demand letter")));
        assert!(matches!(&parts[1], ContentPart::File { filename, .. } if filename == "er_visit.pdf"));
        assert_eq!(parts[2], ContentPart::Text("Vehicle 2 failed to stop.".to_string()));
    }

    #[tokio::test]
    async fn test_draft_with_research_splices_precedent() {
        let input = evidence_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("draft.md");
        let services = Services {
            text: Arc::new(ScriptedModel::new().reply(DRAFT).reply("digest").reply(SYNTHESIS)),
            search: Some(Arc::new(ScriptedModel::new().reply("Smith v. Jones, $500,000, 2019"))),
        };

        let letter = generate_demand_letter(&services, input.path(), &output, &options(true))
            .await
            .unwrap();

        assert!(!letter.contains("## Similar Case Verdicts"));
        assert!(letter.find("## Settlement Demand").unwrap() < letter.find("## ASK").unwrap());
    }

    #[tokio::test]
    async fn test_research_disabled_skips_search() {
        let input = evidence_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let search = Arc::new(ScriptedModel::new());
        let services = Services {
            text: Arc::new(ScriptedModel::new().reply(DRAFT)),
            search: Some(search.clone()),
        };

        generate_demand_letter(&services, input.path(), &out_dir.path().join("d.md"), &options(false))
            .await
            .unwrap();
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_research_keeps_draft() {
        let input = evidence_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let services = Services {
            text: Arc::new(ScriptedModel::new().reply(DRAFT).reply("digest")),
            search: Some(Arc::new(ScriptedModel::new().fail(500))),
        };

        let letter = generate_demand_letter(&services, input.path(), &out_dir.path().join("d.md"), &options(true))
            .await
            .unwrap();
        assert!(letter.contains("## Similar Case Verdicts\n[Comparable verdicts to be researched]"));
    }

    #[tokio::test]
    async fn test_empty_input_dir_is_fatal() {
        let input = tempfile::tempdir().unwrap();
        let services = Services {
            text: Arc::new(ScriptedModel::new()),
            search: None,
        };

        let err = generate_demand_letter(&services, input.path(), &input.path().join("d.md"), &options(false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_drafting_failure_is_fatal() {
        let input = evidence_dir();
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("d.md");
        let services = Services {
            text: Arc::new(ScriptedModel::new().fail(401)),
            search: None,
        };

        let err = generate_demand_letter(&services, input.path(), &output, &options(false))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert!(!output.exists());
    }
}
