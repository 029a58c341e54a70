//! # Explorer Fetch
//!
//! The Content Fetcher: a browser-like async GET that classifies the
//! response into `html` / `pdf` / `other` and never raises on a non-2xx or
//! network error.
//!
//! Built on [`explorer_reliability::HttpClientService`], so every fetch
//! carries circuit breaker and retry protection the same way the Search
//! Client (`explorer-search`) does.

pub mod markers;
pub mod reqwest_fetcher;

pub use markers::looks_like_js_rendered;
pub use reqwest_fetcher::ReqwestContentFetcher;
