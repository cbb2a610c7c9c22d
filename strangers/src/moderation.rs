use std::collections::{HashMap, HashSet};

use crate::types::UserId;

/// Result of recording a policy violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Still allowed, with this many warnings on record.
    Warned(u32),

    /// Threshold reached, the user is now on the naughty list.
    Blocked,
}

/// Warning counts and the set of blocked users.
#[derive(Debug)]
pub struct ModerationLedger {
    warnings: HashMap<UserId, u32>,
    blocked: HashSet<UserId>,

    threshold: u32,
}

impl ModerationLedger {
    pub fn new(blocked: HashSet<UserId>, threshold: u32) -> Self {
        Self {
            warnings: HashMap::new(),
            blocked,

            threshold: threshold.max(1),
        }
    }

    /// Check if this user is blocked.
    pub fn is_blocked(&self, user: &UserId) -> bool {
        self.blocked.contains(user)
    }

    /// Add this user to the naughty list. Returns false if already there.
    pub fn block(&mut self, user: UserId) -> bool {
        self.warnings.remove(&user);

        self.blocked.insert(user)
    }

    /// Returns false if the user was not blocked.
    pub fn unblock(&mut self, user: &UserId) -> bool {
        self.blocked.remove(user)
    }

    /// Count one flagged message against this user.
    pub fn record_violation(&mut self, user: UserId) -> Verdict {
        if self.is_blocked(&user) {
            return Verdict::Blocked;
        }

        let count = self.warnings.entry(user).or_insert(0);
        *count += 1;

        if *count < self.threshold {
            return Verdict::Warned(*count);
        }

        self.block(user);

        Verdict::Blocked
    }

    pub fn warnings(&self, user: &UserId) -> u32 {
        self.warnings.get(user).copied().unwrap_or_default()
    }

    pub fn blocked(&self) -> &HashSet<UserId> {
        &self.blocked
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_strike_blocks() {
        let mut ledger = ModerationLedger::new(HashSet::new(), 3);
        let user = UserId(9);

        assert_eq!(ledger.record_violation(user), Verdict::Warned(1));
        assert_eq!(ledger.record_violation(user), Verdict::Warned(2));
        assert!(!ledger.is_blocked(&user));
        assert_eq!(ledger.warnings(&user), 2);

        assert_eq!(ledger.record_violation(user), Verdict::Blocked);
        assert!(ledger.is_blocked(&user));
        assert_eq!(ledger.warnings(&user), 0);

        assert_eq!(ledger.record_violation(user), Verdict::Blocked);
        assert_eq!(ledger.warnings(&user), 0);
    }

    #[test]
    fn unblock_reports_previous_state() {
        let mut ledger = ModerationLedger::new(HashSet::from([UserId(1)]), 3);

        assert!(ledger.unblock(&UserId(1)));
        assert!(!ledger.unblock(&UserId(1)));
        assert!(ledger.block(UserId(1)));
        assert!(!ledger.block(UserId(1)));
        assert_eq!(ledger.blocked_count(), 1);
    }
}
