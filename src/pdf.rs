// Syllabus text from uploaded or local PDF files

use anyhow::{Context, Result};
use std::path::Path;

/// How far into the file the `%PDF-` header may start
const HEADER_WINDOW: usize = 1024;

/// Text layer of a PDF document.
///
/// Parsing is CPU-bound and runs on the blocking pool. A scanned PDF with no
/// text layer yields an empty string, not an error.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String> {
    if bytes.is_empty() {
        anyhow::bail!("PDF file is empty");
    }
    if !has_pdf_header(&bytes) {
        anyhow::bail!("Not a PDF file (missing %PDF header)");
    }

    let size = bytes.len();
    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .context("PDF parser crashed")?
        .map_err(|e| anyhow::anyhow!("Failed to extract text from PDF: {}", e))?;

    let text = tidy(&raw);
    tracing::debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");
    Ok(text)
}

pub async fn read_pdf_text(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    extract_pdf_text(bytes)
        .await
        .with_context(|| format!("Failed to read PDF {}", path.display()))
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Trim trailing whitespace and collapse runs of blank lines
fn tidy(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut blank_run = 0;
    for line in raw.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
