//! # Explorer PDF
//!
//! PDF half of the Content Extractor: page-text extraction and metadata via
//! `lopdf`, plus `title`/`description` derivation for PDF documents (title
//! from metadata falling back to page 1's first line; description from the
//! document's first three non-empty lines, truncated to 200 characters).

pub mod extractor;
pub mod pdf_extraction;

pub use extractor::PdfExtractor;
