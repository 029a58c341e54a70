//! # Explorer Extraction
//!
//! The Content Extractor (HTML main-text and metadata) and Text Chunker
//! (token-aware paragraph/sentence chunking) for the Explorer Engine.
//!
//! ```rust,ignore
//! use explorer_extraction::{HtmlExtractor, TextChunker, ChunkingStrategy};
//!
//! let extractor = HtmlExtractor::new();
//! let scrape = extractor.extract(&bytes, ContentKind::Html, url).await?;
//! let chunker = TextChunker::new(400, 50);
//! let chunks = chunker.chunk(&scrape.text).await;
//! ```
//!
//! PDF extraction lives in the sibling `explorer-pdf` crate, kept separate so
//! pulling in `lopdf` stays optional for consumers that only fetch HTML.

pub mod chunking;
pub mod html;

pub use chunking::{chunk_text, count_tokens, ChunkingStrategy, TextChunker};
pub use html::HtmlExtractor;
