//! Shared error type for port-trait boundaries.
//!
//! Concrete crates (`explorer-fetch`, `explorer-search`, ...) define their own
//! richer `thiserror` enums and convert into this one at the port boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("extraction failed: {0}")]
    Extract(String),

    #[error("search failed: {0}")]
    Search(String),

    #[error("vector store failed: {0}")]
    Store(String),

    #[error("embedding failed: {0}")]
    Embed(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
