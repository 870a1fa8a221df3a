//! Case facts: consolidated summary of the source documents, cached on disk.
//!
//! Resolution order (first that applies wins):
//!   fresh cache → provided `facts.json` → `*.txt` documents → `*.pdf` documents → empty.
//!
//! The cache is keyed by a SHA-256 fingerprint of the source folder, so edits to
//! the evidence invalidate it even without `--reprocess`. Cache files written
//! before fingerprints existed carry none and are trusted as-is.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};

use crate::data_dir::{write_file, DataDir};
use crate::documents::{document_name, extract_text, list_with_extension};
use crate::errors::AppError;
use crate::facts::prompts::{
    CONSOLIDATION_PROMPT_TEMPLATE, CONSOLIDATION_SYSTEM, DOCUMENT_FACTS_PROMPT_TEMPLATE,
    DOCUMENT_FACTS_SYSTEM,
};
use crate::llm_client::{ChatModel, ChatRequest, LlmError, EXTRACTION_MODEL};

pub mod prompts;

const EXTRACTION_TEMPERATURE: f32 = 0.2;
/// Pause between per-document extraction calls.
const DOCUMENT_PAUSE: Duration = Duration::from_millis(500);
/// How much of a `.txt` file is sniffed for an opening brace.
const JSON_SNIFF_CHARS: usize = 100;

pub const NO_DOCUMENTS_SUMMARY: &str = "No source documents were available for processing.";
pub const SUMMARY_UNAVAILABLE: &str =
    "Unable to generate consolidated summary. Please review individual documents.";

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

/// Facts extracted from the source documents, as persisted in `case_facts.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFacts {
    #[serde(default)]
    pub consolidated_summary: String,
    /// Document identifier (file stem) → that document's extracted facts.
    #[serde(default)]
    pub individual_documents: BTreeMap<String, String>,
    /// SHA-256 of the source folder contents when these facts were produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_fingerprint: Option<String>,
}

impl ExtractedFacts {
    fn summary_only(summary: impl Into<String>) -> Self {
        Self {
            consolidated_summary: summary.into(),
            ..Self::default()
        }
    }

    /// A cache entry is reusable unless it records a different fingerprint.
    fn is_fresh(&self, fingerprint: &str) -> bool {
        self.source_fingerprint
            .as_deref()
            .map_or(true, |stored| stored == fingerprint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Use `case_facts.json` when it is present and fresh.
    Reuse,
    /// Ignore any cached facts and extract again.
    Reprocess,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Produces the case facts for this data folder and refreshes the cache.
pub async fn extract_case_facts(
    llm: &dyn ChatModel,
    data: &DataDir,
    policy: CachePolicy,
) -> Result<ExtractedFacts, AppError> {
    let source_dir = data.source_documents();
    let cache_path = data.facts_cache();
    let fingerprint = source_fingerprint(&source_dir)?;

    if policy == CachePolicy::Reuse && cache_path.exists() {
        info!("Loading existing extracted facts.");
        match load_facts(&cache_path) {
            Ok(facts) if facts.is_fresh(&fingerprint) => return Ok(facts),
            Ok(_) => info!("Source documents changed since facts were cached; reprocessing."),
            Err(e) => error!("Error loading existing facts file: {e}"),
        }
    }

    let provided = data.provided_facts();
    if provided.exists() {
        info!("Found facts.json in source_documents, using it directly.");
        match load_facts(&provided) {
            Ok(facts) => return save_facts(&cache_path, facts, &fingerprint),
            Err(e) => error!("Error loading facts.json from source_documents: {e}"),
        }
    }

    let text_files = list_with_extension(&source_dir, "txt")?;
    if !text_files.is_empty() {
        info!(
            "Found {} text files in source_documents, processing them.",
            text_files.len()
        );
        let facts = facts_from_text_files(llm, &text_files).await;
        return save_facts(&cache_path, facts, &fingerprint);
    }

    let pdf_files = list_with_extension(&source_dir, "pdf")?;
    if pdf_files.is_empty() {
        warn!("No source documents found in {}", source_dir.display());
        return save_facts(
            &cache_path,
            ExtractedFacts::summary_only(NO_DOCUMENTS_SUMMARY),
            &fingerprint,
        );
    }

    info!("Processing source documents to extract key facts.");
    let facts = match facts_from_pdfs(llm, &pdf_files).await {
        Ok(facts) => facts,
        Err(e) => {
            error!("Error processing source documents: {e}");
            ExtractedFacts::summary_only(format!("Error processing source documents: {e}"))
        }
    };
    save_facts(&cache_path, facts, &fingerprint)
}

/// Plain-text evidence. A file that looks like a complete facts document is used wholesale.
async fn facts_from_text_files(llm: &dyn ChatModel, files: &[PathBuf]) -> ExtractedFacts {
    let mut facts = ExtractedFacts::default();

    for path in files {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                error!("Error processing text file {}: {e}", path.display());
                continue;
            }
        };
        let name = document_name(path);

        if looks_like_json(&name, &content) {
            match serde_json::from_str::<ExtractedFacts>(&content) {
                Ok(parsed) => {
                    info!("Successfully loaded JSON data from {}", path.display());
                    facts = parsed;
                    break;
                }
                Err(_) => {
                    facts.individual_documents.insert(name, content);
                }
            }
        } else {
            facts.individual_documents.insert(name, content);
        }
    }

    if !facts.individual_documents.is_empty() && facts.consolidated_summary.is_empty() {
        match consolidate(llm, &facts.individual_documents).await {
            Ok(summary) => {
                facts.consolidated_summary = summary;
                info!("Generated consolidated summary from individual documents");
            }
            Err(e) => {
                error!("Error generating consolidated summary: {e}");
                facts.consolidated_summary = SUMMARY_UNAVAILABLE.to_string();
            }
        }
    }

    facts
}

/// PDF evidence: one extraction call per document, then a consolidation call.
async fn facts_from_pdfs(
    llm: &dyn ChatModel,
    files: &[PathBuf],
) -> Result<ExtractedFacts, LlmError> {
    let mut documents = BTreeMap::new();

    for path in files {
        info!("Processing source document: {}", path.display());
        let doc_name = document_name(path);
        let doc_text = extract_text(path);

        let prompt = DOCUMENT_FACTS_PROMPT_TEMPLATE
            .replace("{doc_name}", &doc_name)
            .replace("{doc_text}", &doc_text);
        let request = ChatRequest::new(EXTRACTION_MODEL)
            .system(DOCUMENT_FACTS_SYSTEM)
            .text(prompt)
            .temperature(EXTRACTION_TEMPERATURE);

        let response = llm.complete(request).await?;
        documents.insert(doc_name, response.text);

        tokio::time::sleep(DOCUMENT_PAUSE).await;
    }

    let consolidated_summary = consolidate(llm, &documents).await?;

    Ok(ExtractedFacts {
        consolidated_summary,
        individual_documents: documents,
        source_fingerprint: None,
    })
}

async fn consolidate(
    llm: &dyn ChatModel,
    documents: &BTreeMap<String, String>,
) -> Result<String, LlmError> {
    let joined = documents
        .iter()
        .map(|(name, facts)| format!("## {name}\n{facts}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    let request = ChatRequest::new(EXTRACTION_MODEL)
        .system(CONSOLIDATION_SYSTEM)
        .text(CONSOLIDATION_PROMPT_TEMPLATE.replace("{documents}", &joined))
        .temperature(EXTRACTION_TEMPERATURE);

    Ok(llm.complete(request).await?.text)
}

fn looks_like_json(name: &str, content: &str) -> bool {
    let head: String = content.chars().take(JSON_SNIFF_CHARS).collect();
    name.to_lowercase().ends_with("json") || head.contains('{')
}

// ────────────────────────────────────────────────────────────────────────────
// Cache
// ────────────────────────────────────────────────────────────────────────────

/// SHA-256 over every file directly inside `dir` (name and contents, in name order).
/// A missing folder hashes like an empty one.
pub fn source_fingerprint(dir: &Path) -> Result<String, AppError> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(AppError::io(dir, e)),
    };
    files.sort();

    let mut hasher = Sha256::new();
    for path in &files {
        let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn load_facts(path: &Path) -> Result<ExtractedFacts, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

fn save_facts(
    path: &Path,
    mut facts: ExtractedFacts,
    fingerprint: &str,
) -> Result<ExtractedFacts, AppError> {
    facts.source_fingerprint = Some(fingerprint.to_string());
    write_file(path, &serde_json::to_string_pretty(&facts)?)?;
    info!("Extracted facts saved to {}", path.display());
    Ok(facts)
}
