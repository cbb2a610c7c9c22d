use serde::{Deserialize, Serialize};

use crate::{
    admin::{AdminCommand, AdminConsole},
    config::EngineConfig,
    dictionary::Dictionary,
    directives::{Directive, Notice, Payload},
    errors::Error,
    persistence::{load_or_default, Persistence},
    session::SessionEngine,
    types::{Content, Timestamp, UserId},
};

/// Inbound user action, as translated by the transport.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Start {
        user: UserId,
    },
    Find {
        user: UserId,
    },
    Stop {
        user: UserId,
    },
    Next {
        user: UserId,
    },
    Link {
        user: UserId,

        /// Public handle of the requester, if it has one.
        #[serde(default)]
        handle: Option<String>,
    },
    Report {
        user: UserId,

        #[serde(default)]
        reason: Option<String>,
    },
    Content {
        user: UserId,
        content: Content,
    },
    Id {
        user: UserId,
    },
    Feedback {
        user: UserId,
        like: bool,
    },
    DeliveryFailed {
        user: UserId,
        recipient: UserId,
    },
    BroadcastResult {
        recipient: UserId,
        success: bool,
    },
    Admin {
        user: UserId,
        command: AdminCommand,
    },
    SweepTick,
}

impl Action {
    /// Who gets told when the action is rejected.
    pub fn requester(&self) -> Option<UserId> {
        match self {
            Action::Start { user }
            | Action::Find { user }
            | Action::Stop { user }
            | Action::Next { user }
            | Action::Link { user, .. }
            | Action::Report { user, .. }
            | Action::Content { user, .. }
            | Action::Id { user }
            | Action::Feedback { user, .. }
            | Action::DeliveryFailed { user, .. }
            | Action::Admin { user, .. } => Some(*user),
            Action::BroadcastResult { .. } | Action::SweepTick => None,
        }
    }
}

/// Single entry point for the transport shim.
///
/// Runs each action to completion, turns rejections into notices and saves
/// the durable state when it changed.
pub struct Dispatcher {
    engine: SessionEngine,
    console: Option<AdminConsole>,

    dictionary: Box<dyn Dictionary + Send>,
    store: Box<dyn Persistence>,
}

impl Dispatcher {
    pub fn new(
        config: EngineConfig,
        store: Box<dyn Persistence>,
        dictionary: Box<dyn Dictionary + Send>,
        admin: Option<UserId>,
    ) -> Self {
        let snapshot = load_or_default(store.as_ref());

        tracing::info!(
            "Loaded {} known users, {} blocked, {} reports",
            snapshot.all_users.len(),
            snapshot.blocked_users.len(),
            snapshot.user_reports.len()
        );

        Self {
            engine: SessionEngine::new(config, snapshot),
            console: admin.map(AdminConsole::new),

            dictionary,
            store,
        }
    }

    pub fn handle(&mut self, action: Action, now: Timestamp) -> Vec<Directive> {
        let requester = action.requester();

        let directives = match self.apply(action, now) {
            Ok(directives) => directives,
            Err(e) => {
                tracing::debug!("Rejected: {}", e);

                match requester {
                    Some(user) => vec![Directive::rejection(user, &e)],
                    None => Vec::new(),
                }
            }
        };

        self.persist();

        directives
    }

    fn apply(&mut self, action: Action, now: Timestamp) -> Result<Vec<Directive>, Error> {
        match action {
            Action::Start { user } | Action::Find { user } => self.engine.find(user, now),
            Action::Stop { user } => self.engine.stop(user, now),
            Action::Next { user } => self.engine.next(user, now),
            Action::Link { user, handle } => self.engine.link(user, handle.as_deref(), now),
            Action::Report { user, reason } => self.engine.report(user, reason.as_deref(), now),
            Action::Content { user, content } => {
                if let Some(console) = self.console.as_mut() {
                    if console.is_awaiting(&user) {
                        return console.input(content, &mut self.engine, now);
                    }
                }

                let flagged = self.dictionary.is_flagged(&content);

                self.engine.content(user, content, flagged, now)
            }
            Action::Id { user } => {
                self.engine.touch(user, now);

                Ok(vec![Directive::new(user, Notice::YourId, Payload::User(user))])
            }
            Action::Feedback { user, like } => {
                self.engine.touch(user, now);

                let verdict = if like { "like" } else { "dislike" };

                Ok(vec![Directive::new(
                    user,
                    Notice::FeedbackThanks,
                    Payload::Text(verdict.to_owned()),
                )])
            }
            Action::DeliveryFailed { user, recipient } => {
                Ok(self.engine.delivery_failed(user, recipient))
            }
            Action::BroadcastResult { recipient, success } => Ok(self
                .console
                .as_mut()
                .map(|console| console.delivery_result(recipient, success))
                .unwrap_or_default()),
            Action::Admin { user, command } => match self.console.as_mut() {
                Some(console) => console.command(user, command, &mut self.engine, now),
                None => Err(Error::Unauthorized),
            },
            Action::SweepTick => Ok(self.engine.sweep(now)),
        }
    }

    /// Save the snapshot if the durable subset changed.
    ///
    /// A failed save is logged, in-memory state is kept as is.
    pub fn persist(&mut self) {
        if !self.engine.take_dirty() {
            return;
        }

        if let Err(e) = self.store.save(&self.engine.snapshot()) {
            tracing::error!("❗ Snapshot save failed. {}", e);
        }
    }

    /// Unconditional save, used on shutdown.
    pub fn flush(&mut self) -> Result<(), Error> {
        self.engine.take_dirty();

        self.store.save(&self.engine.snapshot())
    }

    pub fn engine(&self) -> &SessionEngine {
        &self.engine
    }
}
