//! Reliability primitives shared by the Explorer Engine crates:
//!
//! - **Circuit breaker**: lock-free, atomics-based fault tolerance
//! - **Retry**: exponential-backoff retry policy

pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{guarded_call, CircuitBreaker, Clock, Config as CircuitConfig, RealClock, State};
pub use retry::RetryPolicy;
