//! PDF text and metadata extraction using `lopdf`.
//!
//! Walks the content stream directly (`BT`/`ET` text blocks, `Tj`/`TJ`/`'`
//! operators, PDF string escape decoding); table detection and markdown
//! conversion are out of scope since nothing downstream of the Explorer
//! Engine consumes them.

use anyhow::{Context, Result};
use lopdf::{Document, Object, ObjectId};

/// All pages' text concatenated, plus document metadata.
#[derive(Debug, Clone)]
pub struct PdfContent {
    pub text: String,
    pub title: Option<String>,
    pub page_count: u32,
}

pub struct PdfExtractor {
    document: Document,
}

impl PdfExtractor {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < 10 {
            anyhow::bail!("PDF data too small (minimum 10 bytes required)");
        }
        if !data.starts_with(b"%PDF-") {
            anyhow::bail!("invalid PDF header - missing %PDF- signature");
        }
        let document = Document::load_mem(data).context("failed to load PDF document")?;
        Ok(Self { document })
    }

    /// Parses all pages, concatenating their extracted text. A page that
    /// fails to parse contributes no text but does not abort the rest of
    /// the document.
    pub fn extract_all(&self) -> PdfContent {
        let pages = self.document.get_pages();
        let page_count = pages.len() as u32;

        let mut all_text = String::new();
        for page_number in 1..=page_count {
            match self.extract_page_text(page_number) {
                Ok(text) => {
                    all_text.push_str(&text);
                    all_text.push_str("\n\n");
                }
                Err(err) => {
                    tracing::debug!(page_number, error = %err, "PDF page text extraction failed");
                }
            }
        }

        let title = self.metadata_title();

        PdfContent {
            text: all_text.trim().to_string(),
            title,
            page_count,
        }
    }

    fn metadata_title(&self) -> Option<String> {
        let info_id = self.document.trailer.get(b"Info").ok()?;
        let Object::Reference(id) = info_id else {
            return None;
        };
        let info_dict = self.document.get_object(*id).ok()?;
        let Object::Dictionary(dict) = info_dict else {
            return None;
        };
        match dict.get(b"Title").ok()? {
            Object::String(bytes, _) => String::from_utf8(bytes.clone()).ok(),
            _ => None,
        }
    }

    fn extract_page_text(&self, page_number: u32) -> Result<String> {
        let page_id = self.page_id(page_number)?;
        let content = self
            .document
            .get_page_content(page_id)
            .with_context(|| format!("failed to read content stream for page {page_number}"))?;
        Ok(parse_text_from_content(&content))
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        if page_number == 0 {
            anyhow::bail!("page numbers must be >= 1");
        }
        let pages = self.document.get_pages();
        let page_index = page_number - 1;
        pages
            .get(&page_index)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("page {page_number} not found"))
    }
}

fn parse_text_from_content(content: &[u8]) -> String {
    let mut text = String::new();
    let mut in_text_block = false;
    let mut current_string = String::new();

    for line in content.split(|&b| b == b'\n') {
        let line_str = String::from_utf8_lossy(line);

        if line_str.contains("BT") {
            in_text_block = true;
            continue;
        }
        if line_str.contains("ET") {
            in_text_block = false;
            if !current_string.is_empty() {
                text.push_str(&current_string);
                text.push('\n');
                current_string.clear();
            }
            continue;
        }
        if in_text_block {
            if let Some(extracted) = extract_text_from_operators(&line_str) {
                current_string.push_str(&extracted);
                current_string.push(' ');
            }
        }
    }

    text
}

fn extract_text_from_operators(line: &str) -> Option<String> {
    if line.contains("TJ") {
        return Some(extract_from_tj_array(line));
    }
    if (line.contains("Tj") || line.contains('\'')) && line.contains('(') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if start < end {
            return Some(decode_pdf_string(&line[start + 1..end]));
        }
    }
    None
}

fn extract_from_tj_array(line: &str) -> String {
    let mut result = String::new();
    let mut in_string = false;
    let mut current_string = String::new();

    for ch in line.chars() {
        match ch {
            '(' if !in_string => {
                in_string = true;
                current_string.clear();
            }
            ')' if in_string => {
                in_string = false;
                result.push_str(&decode_pdf_string(&current_string));
                result.push(' ');
            }
            c if in_string => current_string.push(c),
            _ => {}
        }
    }

    result
}

fn decode_pdf_string(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next_ch) = chars.peek() {
                match next_ch {
                    'n' => {
                        chars.next();
                        result.push('\n');
                    }
                    'r' => {
                        chars.next();
                        result.push('\r');
                    }
                    't' => {
                        chars.next();
                        result.push('\t');
                    }
                    '(' | ')' | '\\' => {
                        chars.next();
                        result.push(next_ch);
                    }
                    _ => result.push(ch),
                }
            } else {
                result.push(ch);
            }
        } else {
            result.push(ch);
        }
    }

    result
}
