use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    directives::{Directive, Notice, Payload},
    errors::Error,
    session::SessionEngine,
    types::{Content, Timestamp, UserId},
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdminCommand {
    Panel,
    Stats,
    Reports,
    Blocked,
    Broadcast,
    Block,
    Unblock,
    Lookup { target: UserId },
    Cancel,
}

/// What the admin's next plain message means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminSession {
    #[default]
    Idle,
    AwaitingBroadcastText,
    AwaitingBlockTarget,
    AwaitingUnblockTarget,
}

#[derive(Debug, Default)]
struct BroadcastTally {
    pending: HashSet<UserId>,
    success: usize,
    failure: usize,
}

/// Admin panel for one administrator, kept in memory only.
#[derive(Debug)]
pub struct AdminConsole {
    admin: UserId,
    session: AdminSession,
    tally: Option<BroadcastTally>,
}

impl AdminConsole {
    pub fn new(admin: UserId) -> Self {
        Self {
            admin,
            session: AdminSession::Idle,
            tally: None,
        }
    }

    pub fn session(&self) -> AdminSession {
        self.session
    }

    /// Check if the next message from this user is console input.
    pub fn is_awaiting(&self, user: &UserId) -> bool {
        *user == self.admin && self.session != AdminSession::Idle
    }

    pub fn command(
        &mut self,
        user: UserId,
        command: AdminCommand,
        engine: &mut SessionEngine,
        now: Timestamp,
    ) -> Result<Vec<Directive>, Error> {
        if user != self.admin {
            tracing::warn!("⛔ Admin command from {}", user);
            return Err(Error::Unauthorized);
        }

        engine.touch(user, now);

        let admin = self.admin;

        let directive = match command {
            AdminCommand::Panel => {
                self.session = AdminSession::Idle;
                Directive::notice(admin, Notice::AdminPanel)
            }
            AdminCommand::Stats => {
                Directive::new(admin, Notice::Stats, Payload::Stats(engine.stats()))
            }
            AdminCommand::Reports => {
                let mut reports = engine.reports().list_reports();
                reports.sort();

                Directive::new(admin, Notice::Reports, Payload::Reports(reports))
            }
            AdminCommand::Blocked => {
                let mut users: Vec<UserId> =
                    engine.moderation().blocked().iter().copied().collect();
                users.sort_unstable();

                Directive::new(admin, Notice::BlockedList, Payload::Users(users))
            }
            AdminCommand::Broadcast => {
                self.session = AdminSession::AwaitingBroadcastText;
                Directive::notice(admin, Notice::PromptBroadcast)
            }
            AdminCommand::Block => {
                self.session = AdminSession::AwaitingBlockTarget;
                Directive::notice(admin, Notice::PromptBlock)
            }
            AdminCommand::Unblock => {
                self.session = AdminSession::AwaitingUnblockTarget;
                Directive::notice(admin, Notice::PromptUnblock)
            }
            AdminCommand::Lookup { target } => {
                Directive::new(admin, Notice::UserStatus, Payload::Status(engine.status(target)))
            }
            AdminCommand::Cancel => {
                self.session = AdminSession::Idle;
                Directive::notice(admin, Notice::Cancelled)
            }
        };

        Ok(vec![directive])
    }

    /// Consume the admin's message as the awaited input.
    ///
    /// The console is back to idle afterwards, even if the input was invalid.
    pub fn input(
        &mut self,
        content: Content,
        engine: &mut SessionEngine,
        now: Timestamp,
    ) -> Result<Vec<Directive>, Error> {
        engine.touch(self.admin, now);

        let admin = self.admin;

        match std::mem::take(&mut self.session) {
            AdminSession::Idle => Ok(Vec::new()),
            AdminSession::AwaitingBroadcastText => Ok(self.broadcast(content, engine)),
            AdminSession::AwaitingBlockTarget => {
                let target = parse_target(&content)?;

                let mut directives = engine.block(target);
                directives.push(Directive::new(admin, Notice::UserBlocked, Payload::User(target)));

                tracing::info!("🚫 User {} blocked by admin", target);

                Ok(directives)
            }
            AdminSession::AwaitingUnblockTarget => {
                let target = parse_target(&content)?;

                let notice = if engine.unblock(&target) {
                    tracing::info!("✅ User {} unblocked by admin", target);
                    Notice::UserUnblocked
                } else {
                    Notice::NotBlocked
                };

                Ok(vec![Directive::new(admin, notice, Payload::User(target))])
            }
        }
    }

    /// Account for one broadcast delivery.
    ///
    /// The admin gets the summary once every recipient reported back.
    pub fn delivery_result(&mut self, recipient: UserId, success: bool) -> Vec<Directive> {
        let tally = match self.tally.as_mut() {
            Some(tally) => tally,
            None => return Vec::new(),
        };

        if !tally.pending.remove(&recipient) {
            return Vec::new();
        }

        if success {
            tally.success += 1;
        } else {
            tally.failure += 1;
        }

        if !tally.pending.is_empty() {
            return Vec::new();
        }

        match self.tally.take() {
            Some(tally) => vec![self.summary(&tally)],
            None => Vec::new(),
        }
    }

    fn broadcast(&mut self, content: Content, engine: &SessionEngine) -> Vec<Directive> {
        if let Some(tally) = self.tally.as_ref() {
            tracing::warn!(
                "❗ Previous broadcast abandoned with {} deliveries pending",
                tally.pending.len()
            );
        }

        let mut recipients: Vec<UserId> = engine.known_users().iter().copied().collect();
        recipients.sort_unstable();

        tracing::info!("📢 Broadcasting to {} users", recipients.len());

        let tally = BroadcastTally {
            pending: recipients.iter().copied().collect(),
            ..Default::default()
        };

        if tally.pending.is_empty() {
            self.tally = None;
            return vec![self.summary(&tally)];
        }

        self.tally = Some(tally);

        let admin = self.admin;

        recipients
            .into_iter()
            .map(|recipient| {
                Directive::new(
                    recipient,
                    Notice::Broadcast,
                    Payload::Forward {
                        from: admin,
                        content: content.clone(),
                    },
                )
            })
            .collect()
    }

    fn summary(&self, tally: &BroadcastTally) -> Directive {
        Directive::new(
            self.admin,
            Notice::BroadcastComplete,
            Payload::Tally {
                success: tally.success,
                failure: tally.failure,
            },
        )
    }
}

fn parse_target(content: &Content) -> Result<UserId, Error> {
    let text = content.text.as_deref().ok_or(Error::InvalidAdminTarget)?;

    text.parse().map_err(|_| Error::InvalidAdminTarget)
}
