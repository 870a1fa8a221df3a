use std::path::{Path, PathBuf};

use tracing::info;

use crate::errors::AppError;

/// Fixed directory layout of the evaluator's data folder.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn source_documents(&self) -> PathBuf {
        self.root.join("source_documents")
    }

    pub fn demand_letters(&self) -> PathBuf {
        self.root.join("demand_letters")
    }

    pub fn extracted_facts(&self) -> PathBuf {
        self.root.join("extracted_facts")
    }

    pub fn results(&self) -> PathBuf {
        self.root.join("results")
    }

    /// `extracted_facts/case_facts.json`
    pub fn facts_cache(&self) -> PathBuf {
        self.extracted_facts().join("case_facts.json")
    }

    /// A hand-prepared facts file dropped next to the source documents.
    pub fn provided_facts(&self) -> PathBuf {
        self.source_documents().join("facts.json")
    }

    pub fn evaluation_result(&self, letter_stem: &str) -> PathBuf {
        self.results().join(format!("{letter_stem}_evaluation.json"))
    }

    pub fn comparison_report(&self) -> PathBuf {
        self.results().join("comparison.md")
    }

    /// Creates every folder of the layout if missing.
    pub fn ensure(&self) -> Result<(), AppError> {
        for dir in [
            self.source_documents(),
            self.demand_letters(),
            self.extracted_facts(),
            self.results(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| AppError::io(&dir, e))?;
        }
        info!("Folder structure verified under {}", self.root.display());
        Ok(())
    }
}

/// Writes `contents`, creating parent directories first.
pub fn write_file(path: &Path, contents: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| AppError::io(path, e))
}
