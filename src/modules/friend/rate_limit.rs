//! Rolling-window limit on how fast a user may send friend requests.
//!
//! The window is recomputed from the sender's own stored requests on every
//! attempt, so there is no separate counter state to keep in sync. Two attempts
//! racing each other can both pass the check; the limit slows abuse down and is
//! not a hard guarantee.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::constants::{DEFAULT_FRIEND_REQUEST_LIMIT, DEFAULT_FRIEND_REQUEST_WINDOW_SECS};
use crate::modules::friend::{error::FriendRequestError, repository::FriendRequestRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Requests allowed inside one window.
    pub max_requests: usize,
    pub window: TimeDelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// Seconds until the oldest counted request leaves the window.
    Limited { retry_after: u64 },
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FRIEND_REQUEST_LIMIT, DEFAULT_FRIEND_REQUEST_WINDOW_SECS)
    }
}

impl RateLimitPolicy {
    pub fn new(max_requests: usize, window_secs: i64) -> Self {
        Self { max_requests, window: TimeDelta::seconds(window_secs) }
    }

    pub fn window_secs(&self) -> i64 {
        self.window.num_seconds()
    }

    /// `recent` holds the creation times of the sender's latest requests,
    /// newest first. Only the first `max_requests` entries are looked at.
    pub fn check(&self, recent: &[DateTime<Utc>], now: DateTime<Utc>) -> RateLimitDecision {
        if self.max_requests == 0 {
            return RateLimitDecision::Limited { retry_after: self.window_secs().max(1) as u64 };
        }

        if recent.len() < self.max_requests {
            return RateLimitDecision::Allowed;
        }

        let Some(oldest) = recent.iter().take(self.max_requests).min() else {
            return RateLimitDecision::Allowed;
        };

        if *oldest <= now - self.window {
            return RateLimitDecision::Allowed;
        }

        let remaining_ms = (*oldest + self.window - now).num_milliseconds();
        let retry_after = ((remaining_ms + 999) / 1000).max(1) as u64;
        RateLimitDecision::Limited { retry_after }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    repo: Arc<dyn FriendRequestRepository + Send + Sync>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(repo: Arc<dyn FriendRequestRepository + Send + Sync>, policy: RateLimitPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    pub async fn allow(
        &self,
        user_id: &Uuid,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, FriendRequestError> {
        let recent = self.repo.find_recent_sent(user_id, self.policy.max_requests).await?;
        let created: Vec<DateTime<Utc>> = recent.iter().map(|r| r.created_at).collect();
        Ok(self.policy.check(&created, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn allows_until_the_limit_is_reached() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.check(&[], at(0)), RateLimitDecision::Allowed);
        assert_eq!(policy.check(&[at(0)], at(1)), RateLimitDecision::Allowed);
        assert_eq!(policy.check(&[at(1), at(0)], at(2)), RateLimitDecision::Allowed);
    }

    #[test]
    fn denies_a_fourth_request_inside_the_window() {
        let policy = RateLimitPolicy::default();
        let decision = policy.check(&[at(10), at(5), at(0)], at(20));
        assert_eq!(decision, RateLimitDecision::Limited { retry_after: 40 });
    }

    #[test]
    fn allows_once_the_oldest_ages_out() {
        let policy = RateLimitPolicy::default();
        let recent = [at(10), at(5), at(0)];
        assert_ne!(policy.check(&recent, at(59)), RateLimitDecision::Allowed);
        assert_eq!(policy.check(&recent, at(60)), RateLimitDecision::Allowed);
    }

    #[test]
    fn only_the_latest_requests_count() {
        let policy = RateLimitPolicy::default();
        // a fourth, older entry must not shift the boundary
        let recent = [at(100), at(90), at(45), at(44)];
        assert_eq!(policy.check(&recent, at(105)), RateLimitDecision::Allowed);
        assert_eq!(
            policy.check(&recent, at(104)),
            RateLimitDecision::Limited { retry_after: 1 }
        );
    }

    #[test]
    fn retry_after_rounds_up_partial_seconds() {
        let policy = RateLimitPolicy::new(1, 60);
        let now = at(30) + TimeDelta::milliseconds(500);
        assert_eq!(policy.check(&[at(0)], now), RateLimitDecision::Limited { retry_after: 30 });
    }

    #[test]
    fn zero_limit_denies_everything() {
        let policy = RateLimitPolicy::new(0, 60);
        assert_eq!(policy.check(&[], at(0)), RateLimitDecision::Limited { retry_after: 60 });
    }
}
