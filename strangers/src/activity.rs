use std::collections::HashMap;

use chrono::Duration;

use crate::types::{Timestamp, UserId};

/// Last time each user did anything the engine recognized.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    last_seen: HashMap<UserId, Timestamp>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch(&mut self, user: UserId, now: Timestamp) {
        self.last_seen.insert(user, now);
    }

    pub fn last_seen(&self, user: &UserId) -> Option<Timestamp> {
        self.last_seen.get(user).copied()
    }

    /// Users idle for strictly longer than `timeout`.
    pub fn idle_since(&self, now: Timestamp, timeout: Duration) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .last_seen
            .iter()
            .filter(|(_, seen)| now - **seen > timeout)
            .map(|(user, _)| *user)
            .collect();

        users.sort_unstable();

        users
    }

    pub fn forget(&mut self, user: &UserId) -> bool {
        self.last_seen.remove(user).is_some()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};

    #[test]
    fn idle_is_strict() {
        let start = Utc.timestamp_opt(1_000_000, 0).unwrap();

        let mut tracker = ActivityTracker::new();
        tracker.touch(UserId(1), start);
        tracker.touch(UserId(2), start + Duration::seconds(5));

        let idle = tracker.idle_since(start + Duration::seconds(10), Duration::seconds(10));
        assert!(idle.is_empty());

        let idle = tracker.idle_since(start + Duration::seconds(11), Duration::seconds(10));
        assert_eq!(idle, vec![UserId(1)]);

        assert!(tracker.forget(&UserId(1)));
        assert!(!tracker.forget(&UserId(1)));
        assert_eq!(tracker.len(), 1);
    }
}
