//! # Explorer Reliability
//!
//! HTTP client with integrated fault tolerance for the Explorer Engine's
//! Content Fetcher and Web Search Client components:
//!
//! ```rust,ignore
//! use explorer_reliability::{HttpClientService, HttpConfig, FetchOptions};
//!
//! let service = HttpClientService::new(HttpConfig::default())?;
//! let response = service.get("https://example.com", FetchOptions::default()).await?;
//! ```
//!
//! The circuit breaker and retry policy themselves live in
//! [`explorer_utils`], kept separate from the HTTP-specific wiring here so
//! other collaborators (the vector store, the embedding service) can reuse
//! the same primitives without depending on `reqwest`.

pub mod http_client;

pub use explorer_utils::{guarded_call, CircuitBreaker, CircuitConfig, Clock, RealClock, State};
pub use http_client::{FetchOptions, HttpClientService, HttpConfig};
