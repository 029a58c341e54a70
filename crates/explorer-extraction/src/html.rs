//! HTML Content Extractor: boilerplate removal plus metadata parsing over
//! `scraper` (strip non-content elements, prefer `article`/`main`, fall back
//! to `body`).

use async_trait::async_trait;
use explorer_types::ports::ContentExtractor;
use explorer_types::{ContentKind, ExplorerError, Result, ScrapeResult};
use scraper::{Html, Selector};

const BOILERPLATE_SELECTORS: &[&str] = &["script", "style", "nav", "footer", "aside", "noscript"];
const CONTENT_SELECTORS: &[&str] = &["article", "main"];

pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_title(document: &Html) -> String {
    let selector = Selector::parse("title").expect("static selector is valid");
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_meta_content(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_description(document: &Html) -> String {
    extract_meta_content(document, r#"meta[name="description"]"#)
        .or_else(|| extract_meta_content(document, r#"meta[property="og:description"]"#))
        .unwrap_or_default()
}

/// Removes script/style/nav/footer/aside/noscript subtrees from the text
/// stream, then prefers `article`/`main` content over the whole `body`.
fn extract_body_text(document: &Html) -> String {
    let boilerplate_selectors: Vec<Selector> = BOILERPLATE_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect();

    for content_selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(content_selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = collect_text_excluding(element, &boilerplate_selectors);
                if !text.trim().is_empty() {
                    return text;
                }
            }
        }
    }

    let body_selector = Selector::parse("body").expect("static selector is valid");
    match document.select(&body_selector).next() {
        Some(body) => collect_text_excluding(body, &boilerplate_selectors),
        None => document.root_element().text().collect::<String>(),
    }
}

fn collect_text_excluding(element: scraper::ElementRef, excluded: &[Selector]) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let is_boilerplate = node
            .ancestors()
            .filter_map(scraper::ElementRef::wrap)
            .any(|ancestor| excluded.iter().any(|sel| sel.matches(&ancestor)));
        if !is_boilerplate {
            parts.push(trimmed.to_string());
        }
    }
    parts.join(" ")
}

#[async_trait]
impl ContentExtractor for HtmlExtractor {
    async fn extract(&self, bytes: &[u8], kind: ContentKind, url: &str) -> Result<ScrapeResult> {
        if kind != ContentKind::Html {
            return Err(ExplorerError::Extract(format!(
                "HtmlExtractor cannot handle content kind {kind:?} for {url}"
            )));
        }

        let body = String::from_utf8_lossy(bytes);
        let document = Html::parse_document(&body);

        let title = extract_title(&document);
        let description = extract_description(&document);
        let text = extract_body_text(&document);

        Ok(ScrapeResult {
            url: url.to_string(),
            title,
            description,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extracts_title_description_and_body_text() {
        let html = r#"
            <html>
              <head>
                <title>Example Page</title>
                <meta name="description" content="An example page for testing.">
              </head>
              <body>
                <nav>Site navigation</nav>
                <article><p>The real content lives here.</p></article>
                <footer>Copyright notice</footer>
              </body>
            </html>
        "#;
        let extractor = HtmlExtractor::new();
        let result = extractor
            .extract(html.as_bytes(), ContentKind::Html, "https://example.test/page")
            .await
            .unwrap();

        assert_eq!(result.title, "Example Page");
        assert_eq!(result.description, "An example page for testing.");
        assert!(result.text.contains("real content"));
        assert!(!result.text.contains("Site navigation"));
        assert!(!result.text.contains("Copyright notice"));
    }

    #[tokio::test]
    async fn falls_back_to_og_description_when_meta_missing() {
        let html = r#"
            <html><head>
              <meta property="og:description" content="From open graph.">
            </head><body><p>Body text.</p></body></html>
        "#;
        let extractor = HtmlExtractor::new();
        let result = extractor
            .extract(html.as_bytes(), ContentKind::Html, "https://example.test/og")
            .await
            .unwrap();
        assert_eq!(result.description, "From open graph.");
    }

    #[tokio::test]
    async fn empty_page_yields_empty_text_not_an_error() {
        let html = "<html><head></head><body></body></html>";
        let extractor = HtmlExtractor::new();
        let result = extractor
            .extract(html.as_bytes(), ContentKind::Html, "https://example.test/empty")
            .await
            .unwrap();
        assert_eq!(result.text, "");
    }

    #[tokio::test]
    async fn non_html_kind_is_rejected() {
        let extractor = HtmlExtractor::new();
        let result = extractor
            .extract(b"not html", ContentKind::Pdf, "https://example.test/doc.pdf")
            .await;
        assert!(result.is_err());
    }
}
