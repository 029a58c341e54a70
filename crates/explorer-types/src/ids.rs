//! Newtype identifiers.
//!
//! `Query` and `WorkspaceId` are both plain strings at rest, but are kept as
//! distinct types so a call site cannot accidentally pass a query where a
//! tenant id is expected (or vice versa) — the kind of mixup tenant
//! isolation depends on never happening.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A natural-language search/retrieval query, soft-capped at 512 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

/// Soft cap on query length. Queries longer than this are truncated
/// rather than rejected, since the cap is advisory.
pub const QUERY_SOFT_CAP: usize = 512;

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if text.len() > QUERY_SOFT_CAP {
            text.truncate(QUERY_SOFT_CAP);
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque tenant boundary. All vector store reads/writes are scoped to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkspaceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize a URL string: prepend `http://` if no scheme is present. Does
/// not validate the result further than `url::Url::parse`.
pub fn normalize_url(raw: &str) -> std::result::Result<url::Url, url::ParseError> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    url::Url::parse(&candidate)
}

/// Compute the composite ChunkRecord id: `md5(url) || "_chunk_" || chunk_id`.
pub fn chunk_record_id(url: &str, chunk_id: u32) -> String {
    format!("{:x}_chunk_{}", md5::compute(url.as_bytes()), chunk_id)
}

/// The id of the sentinel "chunk 0" record used by the URL-existence check.
pub fn chunk_zero_id(url: &str) -> String {
    chunk_record_id(url, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_truncates_past_soft_cap() {
        let long = "a".repeat(QUERY_SOFT_CAP + 50);
        let q = Query::new(long);
        assert_eq!(q.as_str().len(), QUERY_SOFT_CAP);
    }

    #[test]
    fn normalize_url_prepends_scheme() {
        let url = normalize_url("example.com/page").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn normalize_url_keeps_existing_scheme() {
        let url = normalize_url("https://example.com").unwrap();
        assert_eq!(url.scheme(), "https");
    }

    #[test]
    fn chunk_record_id_is_stable_and_namespaced() {
        let id0 = chunk_record_id("https://example.com", 0);
        let id1 = chunk_record_id("https://example.com", 1);
        assert_ne!(id0, id1);
        assert_eq!(id0, chunk_zero_id("https://example.com"));
        assert!(id0.ends_with("_chunk_0"));
    }
}
