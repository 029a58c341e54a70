//! Combines the HTML and PDF `ContentExtractor` adapters behind a single
//! port implementation, dispatching on the `ContentKind` the Content Fetcher
//! reported: HTML and PDF are separate extraction paths, but the Explorer
//! Orchestrator composes against one `Arc<dyn ContentExtractor>`.
//!
//! Lives in `explorer-cli` rather than `explorer-orchestrator` so the
//! orchestrator crate never needs to depend on `explorer-pdf`'s `lopdf`
//! stack — a facade picking a concrete strategy per request rather than
//! baking the choice into the pipeline core.

use async_trait::async_trait;
use explorer_extraction::HtmlExtractor;
use explorer_pdf::PdfExtractor;
use explorer_types::ports::ContentExtractor;
use explorer_types::{ContentKind, ExplorerError, Result, ScrapeResult};

pub struct DispatchExtractor {
    html: HtmlExtractor,
    pdf: PdfExtractor,
}

impl DispatchExtractor {
    pub fn new() -> Self {
        Self {
            html: HtmlExtractor::new(),
            pdf: PdfExtractor::new(),
        }
    }
}

impl Default for DispatchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentExtractor for DispatchExtractor {
    async fn extract(&self, bytes: &[u8], kind: ContentKind, url: &str) -> Result<ScrapeResult> {
        match kind {
            ContentKind::Html => self.html.extract(bytes, kind, url).await,
            ContentKind::Pdf => self.pdf.extract(bytes, kind, url).await,
            ContentKind::Other => Err(ExplorerError::Extract(format!(
                "no extractor for content kind Other at {url}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dispatches_html_to_the_html_extractor() {
        let extractor = DispatchExtractor::new();
        let result = extractor
            .extract(b"<html><body><p>hi</p></body></html>", ContentKind::Html, "https://example.test")
            .await
            .unwrap();
        assert!(result.text.contains("hi"));
    }

    #[tokio::test]
    async fn other_kind_is_rejected() {
        let extractor = DispatchExtractor::new();
        let result = extractor.extract(b"", ContentKind::Other, "https://example.test").await;
        assert!(result.is_err());
    }
}
