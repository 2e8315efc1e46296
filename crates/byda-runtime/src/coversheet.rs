//! Coversheet analysis: locate, decode, and parse the reference document.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use byda_jobs::coversheet_text::parse_expected_providers;

use crate::collector::coversheet_file_name;

/// Decodes a PDF byte stream into per-page plain text.
///
/// Consumed as a black box; the engine never inspects PDF structure itself.
pub trait PdfTextExtractor: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>>;
}

/// Pass-through extractor for coversheets that are already plain text.
pub struct PlainTextExtractor;

impl PdfTextExtractor for PlainTextExtractor {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<String>> {
        Ok(vec![String::from_utf8_lossy(bytes).into_owned()])
    }
}

/// Why a coversheet could not be analysed this sweep.
#[derive(Debug, Error)]
pub enum CoversheetError {
    /// No coversheet file in the workspace; the job is retried next sweep.
    #[error("coversheet not found at {}", .0.display())]
    Missing(PathBuf),
    /// The coversheet decoded to no text; treated like a missing document so
    /// an empty expected list can never mark a job complete.
    #[error("coversheet at {} decoded to empty text", .0.display())]
    Empty(PathBuf),
    #[error("failed to analyse coversheet: {0}")]
    Unreadable(anyhow::Error),
}

/// Reads and parses the expected-respondent list for a job.
pub fn read_expected_providers(
    workspace: &Path,
    job_number: u32,
    extractor: &dyn PdfTextExtractor,
) -> Result<Vec<String>, CoversheetError> {
    let path = workspace.join(coversheet_file_name(job_number));
    if !path.is_file() {
        return Err(CoversheetError::Missing(path));
    }
    let bytes = std::fs::read(&path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CoversheetError::Unreadable)?;
    let pages = extractor
        .extract_pages(&bytes)
        .map_err(CoversheetError::Unreadable)?;
    let text = pages.join("\n");
    if text.trim().is_empty() {
        return Err(CoversheetError::Empty(path));
    }
    Ok(parse_expected_providers(&text))
}
