//! Rate limiting for flood protection.
//!
//! Token bucket over inbound frames. Over-rate frames are dropped rather
//! than closing the connection: a customer typing fast should lose a frame,
//! not their place in the queue.

use std::time::Instant;

/// Token bucket rate limiter.
///
/// Tokens replenish at `rate` per second up to `capacity`; each frame costs
/// one token.
pub struct RateLimiter {
    tokens: f32,
    last_check: Instant,
    rate: f32,
    capacity: f32,
}

impl RateLimiter {
    pub fn new(rate: f32, capacity: f32) -> Self {
        Self {
            tokens: capacity,
            last_check: Instant::now(),
            rate,
            capacity,
        }
    }

    /// Check whether a frame may be processed.
    ///
    /// Returns `true` if allowed (token consumed), `false` if the frame
    /// should be dropped.
    pub fn check(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_check).as_secs_f32();
        self.last_check = now;

        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
