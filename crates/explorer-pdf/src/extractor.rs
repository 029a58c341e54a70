//! `ContentExtractor` port adapter for PDF content:
//!
//! - `title`: PDF metadata `Title`, falling back to the first non-empty line
//!   of page 1.
//! - `description`: the first three non-empty lines of the document,
//!   concatenated and truncated to 200 characters.

use crate::pdf_extraction::PdfExtractor as LopdfExtractor;
use async_trait::async_trait;
use explorer_types::ports::ContentExtractor;
use explorer_types::{ContentKind, ExplorerError, Result, ScrapeResult};

const DESCRIPTION_MAX_CHARS: usize = 200;

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn first_non_empty_lines(text: &str, count: usize) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(count)
        .collect()
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[async_trait]
impl ContentExtractor for PdfExtractor {
    async fn extract(&self, bytes: &[u8], kind: ContentKind, url: &str) -> Result<ScrapeResult> {
        if kind != ContentKind::Pdf {
            return Err(ExplorerError::Extract(format!(
                "PdfExtractor cannot handle content kind {kind:?} for {url}"
            )));
        }

        let bytes = bytes.to_vec();
        let content = tokio::task::spawn_blocking(move || -> Result<_> {
            let extractor = LopdfExtractor::from_bytes(&bytes)
                .map_err(|e| ExplorerError::Extract(e.to_string()))?;
            Ok(extractor.extract_all())
        })
        .await
        .map_err(|e| ExplorerError::Extract(format!("PDF extraction task panicked: {e}")))??;

        let title = content
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| first_non_empty_lines(&content.text, 1).first().map(|s| s.to_string()))
            .unwrap_or_default();

        let description = truncate_chars(
            &first_non_empty_lines(&content.text, 3).join(" "),
            DESCRIPTION_MAX_CHARS,
        );

        Ok(ScrapeResult {
            url: url.to_string(),
            title,
            description,
            text: content.text,
        })
    }
}
