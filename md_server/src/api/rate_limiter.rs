//! Per-connection rate limiting of inbound intents.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Example
    ///
    /// ```
    /// use md_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 requests per second
    /// let limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// 10 intents per second
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// 100 intents per minute
    pub fn sustained() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    /// [`RateLimiter::check`] against an explicit clock reading.
    pub fn check_at(&mut self, now: Instant) -> bool {
        while let Some(ts) = self.timestamps.front() {
            if now.saturating_duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        self.timestamps.push_back(now);
        true
    }

    /// Requests still allowed in the current window
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }
}

/// Both windows a connection's intents must pass.
#[derive(Debug)]
pub struct IntentLimiter {
    burst: RateLimiter,
    sustained: RateLimiter,
}

impl Default for IntentLimiter {
    fn default() -> Self {
        Self {
            burst: RateLimiter::burst(),
            sustained: RateLimiter::sustained(),
        }
    }
}

impl IntentLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Err` carries the message sent back to the client.
    pub fn check(&mut self) -> Result<(), &'static str> {
        self.check_at(Instant::now())
    }

    pub fn check_at(&mut self, now: Instant) -> Result<(), &'static str> {
        if !self.burst.check_at(now) {
            return Err("Rate limit exceeded. Please slow down.");
        }
        if !self.sustained.check_at(now) {
            return Err("Too many messages. Please wait before sending more.");
        }
        Ok(())
    }
}
