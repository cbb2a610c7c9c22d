use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    activity::ActivityTracker,
    config::EngineConfig,
    directives::{Directive, Notice, Payload},
    errors::Error,
    moderation::{ModerationLedger, Verdict},
    persistence::Snapshot,
    reaper::InactivityReaper,
    reports::ReportLedger,
    types::{Content, Timestamp, UserId},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UserState {
    Idle,
    Waiting,
    Paired { partner: UserId },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStatus {
    pub user: UserId,

    #[serde(flatten)]
    pub state: UserState,

    pub blocked: bool,
    pub warnings: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_known_users: usize,
    pub active_pairs: usize,
    pub blocked: usize,
    pub pending_reports: usize,
}

/// Waiting queue and active pairs, plus the ledgers they consult.
///
/// Every method runs one transition to completion. Callers serialize access,
/// there are no locks in here.
#[derive(Debug)]
pub struct SessionEngine {
    config: EngineConfig,

    waiting: VecDeque<UserId>,
    pairs: HashMap<UserId, UserId>,     // symmetric
    started: HashMap<UserId, Timestamp>, // same keys as pairs

    activity: ActivityTracker,
    moderation: ModerationLedger,
    reports: ReportLedger,
    reaper: InactivityReaper,

    known: HashSet<UserId>,

    dirty: bool, // durable subset changed since last snapshot
}

impl SessionEngine {
    pub fn new(config: EngineConfig, snapshot: Snapshot) -> Self {
        let Snapshot {
            blocked_users,
            all_users,
            user_reports,
        } = snapshot;

        Self {
            moderation: ModerationLedger::new(blocked_users, config.warning_threshold),
            reports: ReportLedger::new(user_reports),
            reaper: InactivityReaper::new(config.inactivity_timeout()),
            config,

            waiting: VecDeque::new(),
            pairs: HashMap::new(),
            started: HashMap::new(),

            activity: ActivityTracker::new(),

            known: all_users,

            dirty: false,
        }
    }

    /// Record activity and remember the user.
    pub fn touch(&mut self, user: UserId, now: Timestamp) {
        self.activity.touch(user, now);

        if self.known.insert(user) {
            self.dirty = true;
        }
    }

    /// Pairing request.
    pub fn find(&mut self, user: UserId, now: Timestamp) -> Result<Vec<Directive>, Error> {
        self.touch(user, now);
        self.ensure_unblocked(&user)?;

        if self.pairs.contains_key(&user) {
            return Err(Error::AlreadyPaired);
        }

        if self.waiting.contains(&user) {
            return Err(Error::AlreadyQueued);
        }

        Ok(self.enqueue_or_pair(user, now))
    }

    /// Leave the current chat or the queue.
    pub fn stop(&mut self, user: UserId, now: Timestamp) -> Result<Vec<Directive>, Error> {
        self.touch(user, now);
        self.ensure_unblocked(&user)?;

        if let Some(partner) = self.dissolve(&user) {
            return Ok(vec![
                Directive::notice(partner, Notice::PartnerLeft),
                Directive::notice(partner, Notice::FeedbackRequest),
                Directive::notice(user, Notice::Stopped),
            ]);
        }

        if self.leave_queue(&user) {
            return Ok(vec![Directive::notice(user, Notice::LeftQueue)]);
        }

        Err(Error::NotInSessionOrQueue)
    }

    /// Stop then find, as a single transition.
    pub fn next(&mut self, user: UserId, now: Timestamp) -> Result<Vec<Directive>, Error> {
        self.touch(user, now);
        self.ensure_unblocked(&user)?;

        if self.waiting.contains(&user) {
            return Err(Error::AlreadyQueued);
        }

        let mut directives = Vec::with_capacity(5);

        if let Some(partner) = self.dissolve(&user) {
            directives.push(Directive::notice(partner, Notice::PartnerLeft));
            directives.push(Directive::notice(partner, Notice::FeedbackRequest));
            directives.push(Directive::notice(user, Notice::Stopped));
        }

        directives.extend(self.enqueue_or_pair(user, now));

        Ok(directives)
    }

    /// Send the requester's public handle to the partner.
    pub fn link(
        &mut self,
        user: UserId,
        handle: Option<&str>,
        now: Timestamp,
    ) -> Result<Vec<Directive>, Error> {
        self.touch(user, now);

        let partner = self.partner(&user).ok_or(Error::NotInSession)?;

        let elapsed = match self.started.get(&user) {
            Some(start) => now - *start,
            None => Duration::zero(),
        };
        let cooldown = self.config.link_cooldown();

        if elapsed < cooldown {
            let remaining = (cooldown - elapsed).num_milliseconds().max(0) as u64;
            return Err(Error::LinkCooldownActive((remaining + 999) / 1000));
        }

        let handle = match handle.map(str::trim) {
            Some(handle) if !handle.is_empty() => handle.trim_start_matches('@').to_owned(),
            _ => return Err(Error::NoPublishableIdentity),
        };

        Ok(vec![
            Directive::new(partner, Notice::ProfileLink, Payload::Text(handle)),
            Directive::notice(user, Notice::LinkSent),
        ])
    }

    /// Report the current partner.
    pub fn report(
        &mut self,
        user: UserId,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<Vec<Directive>, Error> {
        self.touch(user, now);

        let partner = self.partner(&user).ok_or(Error::NotInSession)?;

        self.reports.file_report(partner, reason);
        self.dirty = true;

        tracing::info!("Report filed against {} by {}", partner, user);

        Ok(vec![
            Directive::notice(user, Notice::ReportFiled),
            Directive::notice(partner, Notice::Reported),
        ])
    }

    /// Non-command message from a user.
    ///
    /// Flagged content is never relayed, the sender is warned or blocked.
    pub fn content(
        &mut self,
        user: UserId,
        content: Content,
        flagged: bool,
        now: Timestamp,
    ) -> Result<Vec<Directive>, Error> {
        self.touch(user, now);
        self.ensure_unblocked(&user)?;

        if flagged {
            return Ok(match self.moderation.record_violation(user) {
                Verdict::Warned(count) => {
                    tracing::debug!("Warning {} for {}", count, user);

                    vec![Directive::notice(user, Notice::ContentWarning)]
                }
                Verdict::Blocked => {
                    tracing::info!("🚫 User {} blocked for inappropriate behavior", user);
                    self.dirty = true;

                    self.force_out(&user, Notice::BlockedForBehavior)
                }
            });
        }

        let partner = self.partner(&user).ok_or(Error::NotInSession)?;

        Ok(vec![Directive::new(
            partner,
            Notice::Relay,
            Payload::Forward {
                from: user,
                content,
            },
        )])
    }

    /// The transport could not relay from `sender` to `recipient`.
    ///
    /// Ends the sender's chat without writing to the unreachable side again.
    pub fn delivery_failed(&mut self, sender: UserId, recipient: UserId) -> Vec<Directive> {
        if self.partner(&sender) != Some(recipient) {
            return Vec::new();
        }

        self.dissolve(&sender);

        tracing::debug!("Relay {} -> {} failed, chat ended", sender, recipient);

        vec![
            Directive::rejection(sender, &Error::DeliveryFailure(recipient)),
            Directive::notice(sender, Notice::Stopped),
        ]
    }

    /// Block a user and end whatever they were doing.
    ///
    /// Only users who were chatting, waiting or known before a fresh block are
    /// told about it.
    pub fn block(&mut self, user: UserId) -> Vec<Directive> {
        let newly = self.moderation.block(user);

        if newly {
            self.dirty = true;
        }

        let active = self.pairs.contains_key(&user) || self.waiting.contains(&user);

        if active || (newly && self.known.contains(&user)) {
            return self.force_out(&user, Notice::Blocked);
        }

        Vec::new()
    }

    /// Returns false if the user was not blocked.
    pub fn unblock(&mut self, user: &UserId) -> bool {
        let unblocked = self.moderation.unblock(user);

        if unblocked {
            self.dirty = true;
        }

        unblocked
    }

    /// Expire every user idle for longer than the timeout.
    pub fn sweep(&mut self, now: Timestamp) -> Vec<Directive> {
        let mut directives = Vec::new();

        for user in self.reaper.expired(&self.activity, now) {
            let active = self.pairs.contains_key(&user) || self.waiting.contains(&user);

            if active {
                directives.extend(self.force_out(&user, Notice::SessionExpired));
            }

            self.activity.forget(&user);
        }

        if !directives.is_empty() {
            tracing::info!("⏲️ Inactivity sweep produced {} notices", directives.len());
        }

        directives
    }

    pub fn is_blocked(&self, user: &UserId) -> bool {
        self.moderation.is_blocked(user)
    }

    pub fn partner(&self, user: &UserId) -> Option<UserId> {
        self.pairs.get(user).copied()
    }

    pub fn session_start(&self, user: &UserId) -> Option<Timestamp> {
        self.started.get(user).copied()
    }

    pub fn state(&self, user: &UserId) -> UserState {
        if let Some(partner) = self.partner(user) {
            return UserState::Paired { partner };
        }

        if self.waiting.contains(user) {
            return UserState::Waiting;
        }

        UserState::Idle
    }

    pub fn status(&self, user: UserId) -> UserStatus {
        UserStatus {
            user,
            state: self.state(&user),
            blocked: self.moderation.is_blocked(&user),
            warnings: self.moderation.warnings(&user),
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total_known_users: self.known.len(),
            active_pairs: self.pairs.len() / 2,
            blocked: self.moderation.blocked_count(),
            pending_reports: self.reports.len(),
        }
    }

    pub fn waiting(&self) -> impl Iterator<Item = &UserId> + '_ {
        self.waiting.iter()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&UserId, &UserId)> + '_ {
        self.pairs.iter()
    }

    pub fn known_users(&self) -> &HashSet<UserId> {
        &self.known
    }

    pub fn reports(&self) -> &ReportLedger {
        &self.reports
    }

    pub fn moderation(&self) -> &ModerationLedger {
        &self.moderation
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            blocked_users: self.moderation.blocked().clone(),
            all_users: self.known.clone(),
            user_reports: self.reports.as_map().clone(),
        }
    }

    /// True once after any change to the durable subset.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn ensure_unblocked(&self, user: &UserId) -> Result<(), Error> {
        if self.moderation.is_blocked(user) {
            return Err(Error::UserBlocked);
        }

        Ok(())
    }

    /// Caller checked that the user is neither paired nor queued.
    fn enqueue_or_pair(&mut self, user: UserId, now: Timestamp) -> Vec<Directive> {
        match self.waiting.pop_front() {
            Some(partner) if partner == user => {
                // Unreachable while the queue holds no duplicates.
                self.waiting.push_front(partner);

                vec![Directive::notice(user, Notice::Searching)]
            }
            Some(partner) => {
                self.pairs.insert(user, partner);
                self.pairs.insert(partner, user);

                self.started.insert(user, now);
                self.started.insert(partner, now);

                tracing::debug!("Paired {} with {}", user, partner);

                vec![
                    Directive::notice(user, Notice::PartnerFound),
                    Directive::notice(partner, Notice::PartnerFound),
                ]
            }
            None => {
                self.waiting.push_back(user);

                vec![Directive::notice(user, Notice::Searching)]
            }
        }
    }

    /// Remove both halves of the pair. Returns the former partner.
    fn dissolve(&mut self, user: &UserId) -> Option<UserId> {
        let partner = self.pairs.remove(user)?;
        self.started.remove(user);

        self.pairs.remove(&partner);
        self.started.remove(&partner);

        Some(partner)
    }

    fn leave_queue(&mut self, user: &UserId) -> bool {
        let len = self.waiting.len();

        self.waiting.retain(|queued| queued != user);

        self.waiting.len() != len
    }

    /// Forced end of session, the partner only learns of a disconnect.
    fn force_out(&mut self, user: &UserId, notice: Notice) -> Vec<Directive> {
        let mut directives = Vec::with_capacity(2);

        if let Some(partner) = self.dissolve(user) {
            directives.push(Directive::notice(partner, Notice::PartnerDisconnected));
        }

        self.leave_queue(user);

        directives.push(Directive::notice(*user, notice));

        directives
    }
}
