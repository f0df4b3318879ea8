//! Per-(user, token) faucet cooldown accounting.

use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

/// Wall-clock seconds since the Unix epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Remaining wait before the next claim, rounded up to whole minutes
/// for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Ready,
    Wait { minutes: u64 },
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Ready => write!(f, "Ready"),
            Remaining::Wait { minutes } => write!(f, "{minutes}m"),
        }
    }
}

/// Tracks the last successful claim per (user, token). No entry means
/// never claimed, eligible immediately. Time is always passed in by
/// the caller so eligibility is testable at fixed instants.
#[derive(Clone)]
pub struct CooldownTracker {
    window_secs: u64,
    claims: Arc<DashMap<(u64, String), u64>>,
}

impl CooldownTracker {
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs,
            claims: Arc::new(DashMap::new()),
        }
    }

    fn last_claim(&self, user_id: u64, symbol: &str) -> Option<u64> {
        self.claims
            .get(&(user_id, symbol.to_string()))
            .map(|r| *r.value())
    }

    /// True if the user may claim `symbol` at time `now`.
    pub fn is_eligible(&self, user_id: u64, symbol: &str, now: u64) -> bool {
        match self.last_claim(user_id, symbol) {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.window_secs,
        }
    }

    /// Remaining wait at time `now`, in ceiling whole minutes.
    pub fn remaining(&self, user_id: u64, symbol: &str, now: u64) -> Remaining {
        let Some(last) = self.last_claim(user_id, symbol) else {
            return Remaining::Ready;
        };
        let elapsed = now.saturating_sub(last);
        if elapsed >= self.window_secs {
            return Remaining::Ready;
        }
        let left = self.window_secs - elapsed;
        Remaining::Wait {
            minutes: left.div_ceil(60),
        }
    }

    /// Record a *confirmed* claim. Never called speculatively; a failed
    /// submission must not advance the cooldown.
    pub fn record_claim(&self, user_id: u64, symbol: &str, at: u64) {
        self.claims.insert((user_id, symbol.to_string()), at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3600;

    #[test]
    fn never_claimed_is_ready() {
        let tracker = CooldownTracker::new(HOUR);
        assert!(tracker.is_eligible(1, "tUSDC", 0));
        assert_eq!(tracker.remaining(1, "tUSDC", 0), Remaining::Ready);
    }

    #[test]
    fn window_closes_then_reopens() {
        let tracker = CooldownTracker::new(HOUR);
        tracker.record_claim(1, "tUSDC", 1000);

        assert!(!tracker.is_eligible(1, "tUSDC", 1001));
        assert!(!tracker.is_eligible(1, "tUSDC", 1000 + HOUR - 1));
        assert!(tracker.is_eligible(1, "tUSDC", 1000 + HOUR));
        assert!(tracker.is_eligible(1, "tUSDC", 1000 + HOUR + 50));
    }

    #[test]
    fn remaining_counts_down_in_ceiling_minutes() {
        let tracker = CooldownTracker::new(HOUR);
        tracker.record_claim(1, "tUSDC", 0);

        assert_eq!(tracker.remaining(1, "tUSDC", 0), Remaining::Wait { minutes: 60 });
        assert_eq!(
            tracker.remaining(1, "tUSDC", 1800),
            Remaining::Wait { minutes: 30 }
        );
        // 3599 seconds elapsed, 1 second left rounds up to a minute.
        assert_eq!(
            tracker.remaining(1, "tUSDC", 3599),
            Remaining::Wait { minutes: 1 }
        );
        assert_eq!(tracker.remaining(1, "tUSDC", 3600), Remaining::Ready);

        // Strictly non-increasing toward the boundary.
        let mut last = u64::MAX;
        for now in (0..=3600).step_by(60) {
            let minutes = match tracker.remaining(1, "tUSDC", now) {
                Remaining::Wait { minutes } => minutes,
                Remaining::Ready => 0,
            };
            assert!(minutes <= last);
            last = minutes;
        }
    }

    #[test]
    fn scopes_are_independent_per_user_and_token() {
        let tracker = CooldownTracker::new(HOUR);
        tracker.record_claim(1, "tUSDC", 100);

        assert!(!tracker.is_eligible(1, "tUSDC", 200));
        assert!(tracker.is_eligible(1, "tBTC", 200));
        assert!(tracker.is_eligible(2, "tUSDC", 200));
    }

    #[test]
    fn new_claim_overwrites_the_timestamp() {
        let tracker = CooldownTracker::new(HOUR);
        tracker.record_claim(1, "tUSDC", 0);
        tracker.record_claim(1, "tUSDC", HOUR);
        assert!(!tracker.is_eligible(1, "tUSDC", HOUR + 10));
        assert!(tracker.is_eligible(1, "tUSDC", 2 * HOUR));
    }

    #[test]
    fn remaining_displays_as_minutes_or_ready() {
        assert_eq!(Remaining::Ready.to_string(), "Ready");
        assert_eq!(Remaining::Wait { minutes: 30 }.to_string(), "30m");
    }
}
