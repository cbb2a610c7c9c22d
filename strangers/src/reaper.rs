use chrono::Duration;

use crate::{
    activity::ActivityTracker,
    types::{Timestamp, UserId},
};

/// Picks the users whose sessions should expire on a sweep.
///
/// A sweep is coarse, a user may outlive the timeout by up to one sweep
/// interval.
#[derive(Debug, Clone, Copy)]
pub struct InactivityReaper {
    timeout: Duration,
}

impl InactivityReaper {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn expired(&self, activity: &ActivityTracker, now: Timestamp) -> Vec<UserId> {
        activity.idle_since(now, self.timeout)
    }
}
