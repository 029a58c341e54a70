//! Port traits: the contracts this core depends on but does not itself
//! constitute. One trait per external collaborator, `Send + Sync`,
//! `async_trait`, so each concrete integration stays swappable and
//! independently testable.

mod embedding;
mod extractor;
mod fetch;
mod search;
mod vector_store;

pub use embedding::EmbeddingService;
pub use extractor::ContentExtractor;
pub use fetch::{ContentFetcher, ContentKind, FetchOutcome, JsRenderFallback};
pub use search::{NoopFilter, ResultFilter, SearchHit, SearchProvider};
pub use vector_store::{StoreFilter, VectorHit, VectorStore};
