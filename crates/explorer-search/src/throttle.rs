//! Single-process request throttle: a mutex serializes request *entry*,
//! and each entering request sleeps until at least `min_delay` has elapsed
//! since the previous request's start. Concurrent callers are serialized,
//! not coalesced — this is why the gate is a `Mutex<Instant>` rather than a
//! token-bucket crate (`governor`); the guarantee needed is "no two request
//! starts are closer than `min_delay`", which a bucket would over-provide
//! for bursty callers and under-specify for serialization.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

pub struct Throttle {
    min_delay: Duration,
    last_request_started_at: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request_started_at: Mutex::new(None),
        }
    }

    /// Blocks the caller until it is safe to start a new request, then
    /// records this request's start time. Holds the lock for the whole
    /// wait so concurrent callers queue up rather than racing each other.
    pub async fn acquire(&self) {
        let mut last = self.last_request_started_at.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                sleep(self.min_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}
