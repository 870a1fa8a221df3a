//! Document handling: input discovery, attachment encoding, and text extraction.
//!
//! Text extraction never fails: PDFs run a chain of extractors (direct parse,
//! tolerant page-by-page parse, OCR) and the first non-blank result wins. Total failure
//! yields an empty string and a warning.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, bail, Context};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::errors::AppError;
use crate::llm_client::ContentPart;

pub const PDF_MIME: &str = "application/pdf";
const FALLBACK_MIME: &str = "application/octet-stream";
const OCR_DPI: &str = "300";

// ────────────────────────────────────────────────────────────────────────────
// Discovery
// ────────────────────────────────────────────────────────────────────────────

/// All regular files below `dir`, recursively, in file-name order.
pub fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            AppError::Validation(format!("Cannot read input directory {}: {e}", dir.display()))
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Files directly inside `dir` with the given extension (case-insensitive), sorted.
/// A missing directory yields an empty list.
pub fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, AppError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AppError::io(dir, e))?.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File stem as a display-friendly document identifier.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Attachments
// ────────────────────────────────────────────────────────────────────────────

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => PDF_MIME,
        Some("txt") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("json") => "application/json",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => FALLBACK_MIME,
    }
}

/// Turns one input file into a message part.
///
/// PDFs travel as base64 file attachments; every other file is inlined as
/// (lossy) UTF-8 text.
pub fn encode_attachment(path: &Path) -> Result<ContentPart, AppError> {
    let bytes = std::fs::read(path).map_err(|e| AppError::io(path, e))?;
    let mime_type = guess_mime_type(path);

    if mime_type == PDF_MIME {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Ok(ContentPart::File {
            filename,
            mime_type: mime_type.to_string(),
            data_base64: STANDARD.encode(&bytes),
        });
    }

    Ok(ContentPart::Text(String::from_utf8_lossy(&bytes).into_owned()))
}

// ────────────────────────────────────────────────────────────────────────────
// Text extraction
// ────────────────────────────────────────────────────────────────────────────

/// One stage of the PDF extraction chain.
trait TextExtractor {
    fn name(&self) -> &'static str;
    fn extract(&self, path: &Path) -> anyhow::Result<String>;
}

/// Whole-document parse via `pdf-extract`.
struct DirectPdf;

/// Independent `lopdf` parse, one page at a time. Pages that fail are skipped.
struct TolerantPdf;

/// Rasterise with `pdftoppm`, then OCR each page with `tesseract`.
struct OcrPdf;

impl TextExtractor for DirectPdf {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn extract(&self, path: &Path) -> anyhow::Result<String> {
        let bytes = std::fs::read(path)?;
        // pdf-extract panics on some malformed inputs.
        catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|_| anyhow!("pdf-extract panicked"))?
            .map_err(|e| anyhow!("{e}"))
    }
}

impl TextExtractor for TolerantPdf {
    fn name(&self) -> &'static str {
        "tolerant"
    }

    fn extract(&self, path: &Path) -> anyhow::Result<String> {
        let bytes = std::fs::read(path)?;
        let doc = catch_unwind(|| lopdf::Document::load_mem(&bytes))
            .map_err(|_| anyhow!("lopdf panicked while loading"))?
            .map_err(|e| anyhow!("loading PDF with lopdf: {e}"))?;

        let mut pages = Vec::new();
        for page in doc.get_pages().into_keys() {
            match catch_unwind(AssertUnwindSafe(|| doc.extract_text(&[page]))) {
                Ok(Ok(text)) => pages.push(text),
                Ok(Err(e)) => debug!("Skipping page {page} of {}: {e}", path.display()),
                Err(_) => debug!("Skipping page {page} of {}: parser panicked", path.display()),
            }
        }
        if pages.is_empty() {
            bail!("no readable pages");
        }
        Ok(pages.join("\n"))
    }
}

impl TextExtractor for OcrPdf {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn extract(&self, path: &Path) -> anyhow::Result<String> {
        let workdir = tempfile::tempdir().context("creating OCR scratch directory")?;
        let prefix = workdir.path().join("page");

        let status = Command::new("pdftoppm")
            .args(["-r", OCR_DPI, "-png"])
            .arg(path)
            .arg(&prefix)
            .status()
            .context("running pdftoppm")?;
        if !status.success() {
            bail!("pdftoppm exited with {status}");
        }

        let mut images: Vec<PathBuf> = std::fs::read_dir(workdir.path())?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
            .collect();
        images.sort();

        let mut pages = Vec::new();
        for image in &images {
            let output = Command::new("tesseract")
                .arg(image)
                .arg("stdout")
                .output()
                .context("running tesseract")?;
            if !output.status.success() {
                bail!("tesseract exited with {}", output.status);
            }
            let text = String::from_utf8_lossy(&output.stdout).into_owned();
            if !text.trim().is_empty() {
                pages.push(text);
            }
        }
        Ok(pages.join("\n"))
    }
}

const PDF_CHAIN: &[&dyn TextExtractor] = &[&DirectPdf, &TolerantPdf, &OcrPdf];

/// Best-effort text for any document. Non-PDF files are read as text.
pub fn extract_text(path: &Path) -> String {
    if guess_mime_type(path) != PDF_MIME {
        return match std::fs::read(path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("Could not read {}: {e}", path.display());
                String::new()
            }
        };
    }

    for extractor in PDF_CHAIN {
        match extractor.extract(path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(
                    "Extracted {} chars from {} via {}",
                    text.len(),
                    path.display(),
                    extractor.name()
                );
                return text;
            }
            Ok(_) => debug!("{} extractor found no text in {}", extractor.name(), path.display()),
            Err(e) if extractor.name() == "ocr" => {
                error!("OCR failed on {}: {e}", path.display())
            }
            Err(e) => debug!("{} extractor failed on {}: {e}", extractor.name(), path.display()),
        }
    }

    warn!("Could not extract text from {}", path.display());
    String::new()
}
