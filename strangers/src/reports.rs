use std::collections::HashMap;

use crate::types::UserId;

pub const NO_REASON: &str = "No reason provided";

/// Latest report reason per reported user.
#[derive(Debug, Default)]
pub struct ReportLedger {
    reasons: HashMap<UserId, String>,
}

impl ReportLedger {
    pub fn new(reasons: HashMap<UserId, String>) -> Self {
        Self { reasons }
    }

    /// Overwrites any previous reason for this user.
    pub fn file_report(&mut self, reported: UserId, reason: Option<&str>) {
        let reason = match reason.map(str::trim) {
            Some(reason) if !reason.is_empty() => reason.to_owned(),
            _ => NO_REASON.to_owned(),
        };

        self.reasons.insert(reported, reason);
    }

    pub fn list_reports(&self) -> Vec<(UserId, String)> {
        self.reasons
            .iter()
            .map(|(user, reason)| (*user, reason.clone()))
            .collect()
    }

    pub fn reason(&self, user: &UserId) -> Option<&str> {
        self.reasons.get(user).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn as_map(&self) -> &HashMap<UserId, String> {
        &self.reasons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_reason_wins() {
        let mut ledger = ReportLedger::default();

        ledger.file_report(UserId(5), Some("spam"));
        ledger.file_report(UserId(5), Some("rude"));
        ledger.file_report(UserId(6), Some("   "));
        ledger.file_report(UserId(7), None);

        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.reason(&UserId(5)), Some("rude"));
        assert_eq!(ledger.reason(&UserId(6)), Some(NO_REASON));
        assert_eq!(ledger.reason(&UserId(7)), Some(NO_REASON));
    }
}
