//! Per-user rate limiting: cooldown timer + sliding burst window.
//!
//! `check` never mutates; callers call `record` only after an actual
//! send, so chained steps re-check without double-counting.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Trailing window for the burst counter.
pub const BURST_WINDOW: Duration = Duration::from_secs(8);
/// Sends allowed inside one burst window.
pub const BURST_CAP: usize = 5;

#[derive(Debug, PartialEq)]
pub enum Verdict {
    Allowed,
    /// Cooldown active; seconds until the next allowed use.
    Cooldown { remaining_secs: u64 },
    /// Burst cap hit, independent of the cooldown timer.
    TooFast,
}

#[derive(Default)]
pub struct RateLimiter {
    last_use: HashMap<i64, Instant>,
    bursts: HashMap<i64, VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `user_id` may act right now. Does not record the
    /// use; call `record` after the send actually happens.
    pub fn check(&mut self, user_id: i64, cooldown: Duration, now: Instant) -> Verdict {
        if let Some(window) = self.bursts.get_mut(&user_id) {
            while let Some(front) = window.front() {
                if now.duration_since(*front) > BURST_WINDOW {
                    window.pop_front();
                } else {
                    break;
                }
            }
            if window.len() >= BURST_CAP {
                return Verdict::TooFast;
            }
        }

        if let Some(last) = self.last_use.get(&user_id) {
            let elapsed = now.duration_since(*last);
            if elapsed < cooldown {
                let remaining = cooldown - elapsed;
                let mut secs = remaining.as_secs();
                if remaining.subsec_nanos() > 0 {
                    secs += 1;
                }
                return Verdict::Cooldown { remaining_secs: secs };
            }
        }

        Verdict::Allowed
    }

    /// Record a successful send for both the cooldown timer and the
    /// burst window.
    pub fn record(&mut self, user_id: i64, now: Instant) {
        self.last_use.insert(user_id, now);
        self.bursts.entry(user_id).or_default().push_back(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(5);

    #[test]
    fn test_first_use_allowed() {
        let mut limiter = RateLimiter::new();
        let now = Instant::now();
        assert_eq!(limiter.check(1, COOLDOWN, now), Verdict::Allowed);
    }

    #[test]
    fn test_cooldown_denies_then_allows() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();
        limiter.record(1, start);

        // 2s later: denied with remaining seconds reported.
        let verdict = limiter.check(1, COOLDOWN, start + Duration::from_secs(2));
        assert_eq!(verdict, Verdict::Cooldown { remaining_secs: 3 });

        // After the full cooldown: allowed again.
        let verdict = limiter.check(1, COOLDOWN, start + Duration::from_secs(5));
        assert_eq!(verdict, Verdict::Allowed);
    }

    #[test]
    fn test_remaining_seconds_round_up() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();
        limiter.record(1, start);

        let verdict = limiter.check(1, COOLDOWN, start + Duration::from_millis(4500));
        assert_eq!(verdict, Verdict::Cooldown { remaining_secs: 1 });
    }

    #[test]
    fn test_check_does_not_record() {
        let mut limiter = RateLimiter::new();
        let now = Instant::now();
        for _ in 0..20 {
            assert_eq!(limiter.check(1, COOLDOWN, now), Verdict::Allowed);
        }
    }

    #[test]
    fn test_burst_cap() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();

        // 5 sends inside the window succeed (cooldown disabled).
        for i in 0..BURST_CAP {
            let now = start + Duration::from_millis(i as u64 * 100);
            assert_eq!(limiter.check(1, Duration::ZERO, now), Verdict::Allowed);
            limiter.record(1, now);
        }

        // The 6th inside the same window is denied.
        let now = start + Duration::from_millis(600);
        assert_eq!(limiter.check(1, Duration::ZERO, now), Verdict::TooFast);
    }

    #[test]
    fn test_burst_window_slides() {
        let mut limiter = RateLimiter::new();
        let start = Instant::now();
        for i in 0..BURST_CAP {
            limiter.record(1, start + Duration::from_millis(i as u64 * 100));
        }

        // Past the window, the old entries drain out.
        let later = start + BURST_WINDOW + Duration::from_secs(1);
        assert_eq!(limiter.check(1, Duration::ZERO, later), Verdict::Allowed);
    }

    #[test]
    fn test_users_are_independent() {
        let mut limiter = RateLimiter::new();
        let now = Instant::now();
        limiter.record(1, now);
        assert_eq!(limiter.check(2, COOLDOWN, now), Verdict::Allowed);
    }
}
