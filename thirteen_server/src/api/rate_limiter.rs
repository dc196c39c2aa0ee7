//! Per-connection message rate limiting for WebSocket sessions.

use std::collections::VecDeque;
use tokio::time::{Duration, Instant};

/// Sliding-window limiter: at most `max_messages` within any `window`
#[derive(Debug)]
pub struct RateLimiter {
    /// Arrival times still inside the window, oldest first
    arrivals: VecDeque<Instant>,
    max_messages: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_messages: usize, window: Duration) -> Self {
        Self {
            arrivals: VecDeque::with_capacity(max_messages),
            max_messages,
            window,
        }
    }

    /// 10 messages per second
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// 100 messages per minute
    pub fn sustained() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Record a message arriving now. Returns `false` if it's over the limit;
    /// rejected messages don't count against the window.
    pub fn check(&mut self) -> bool {
        self.check_at(Instant::now())
    }

    fn check_at(&mut self, now: Instant) -> bool {
        while self
            .arrivals
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
        {
            self.arrivals.pop_front();
        }
        if self.arrivals.len() >= self.max_messages {
            return false;
        }
        self.arrivals.push_back(now);
        true
    }
}
