//! # Explorer Search
//!
//! The Search Client: a throttled, retrying SearXNG client implementing
//! `explorer_types::ports::SearchProvider`.
//!
//! The optional relevance filter is not implemented here — it is an
//! external "filter LLM" collaborator out of this core's scope. Compose
//! `explorer_types::ports::NoopFilter` or a caller-supplied `ResultFilter`
//! on top of this provider's raw results.

pub mod searxng;
pub mod throttle;

pub use searxng::{SearchConfig, SearxngProvider};
pub use throttle::Throttle;
