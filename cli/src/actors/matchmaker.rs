use std::collections::VecDeque;

use chrono::Utc;

use tokio::sync::{mpsc::UnboundedReceiver, oneshot, watch::Receiver};

use strangers::{Action, Directive, Dispatcher};

/// Sweep output kept for the transport, oldest is dropped first.
pub const OUTBOX_CAPACITY: usize = 10_000;

#[derive(Debug)]
pub enum MatchRequest {
    /// Run an inbound action, answer with its directives.
    Action {
        action: Action,
        reply: oneshot::Sender<Vec<Directive>>,
    },

    /// Inactivity sweep, directives go to the outbox.
    Tick,

    /// Hand over everything waiting in the outbox.
    Drain { reply: oneshot::Sender<Vec<Directive>> },
}

/// Owns the engine, one request at a time.
pub struct Matchmaker {
    dispatcher: Dispatcher,

    request_rx: UnboundedReceiver<MatchRequest>,

    shutdown: Receiver<()>,

    outbox: VecDeque<Directive>,
    outbox_capacity: usize,
}

impl Matchmaker {
    pub fn new(
        dispatcher: Dispatcher,
        request_rx: UnboundedReceiver<MatchRequest>,
        shutdown: Receiver<()>,
    ) -> Self {
        Self {
            dispatcher,

            request_rx,

            shutdown,

            outbox: VecDeque::new(),
            outbox_capacity: OUTBOX_CAPACITY,
        }
    }

    pub async fn start(mut self) {
        tracing::info!("✅ Pairing System Online");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.changed() => break,

                msg = self.request_rx.recv() => match msg {
                    Some(request) => self.on_request(request),
                    None => break,
                },
            }
        }

        match self.dispatcher.flush() {
            Ok(()) => tracing::info!("Snapshot saved 👍"),
            Err(e) => tracing::error!("❗ Snapshot save failed. {}", e),
        }

        if !self.outbox.is_empty() {
            tracing::warn!("❗ {} undelivered directives dropped", self.outbox.len());
        }

        tracing::info!("❌ Pairing System Offline");
    }

    fn on_request(&mut self, request: MatchRequest) {
        match request {
            MatchRequest::Action { action, reply } => {
                let directives = self.dispatcher.handle(action, Utc::now());

                if reply.send(directives).is_err() {
                    tracing::warn!("❗ Requester hung up before the reply");
                }
            }
            MatchRequest::Tick => {
                let directives = self.dispatcher.handle(Action::SweepTick, Utc::now());

                self.queue_outbox(directives);
            }
            MatchRequest::Drain { reply } => {
                let directives: Vec<Directive> = self.outbox.drain(..).collect();

                if let Err(directives) = reply.send(directives) {
                    // Keep them for the next poll, ahead of anything newer.
                    for directive in directives.into_iter().rev() {
                        self.outbox.push_front(directive);
                    }
                }
            }
        }
    }

    fn queue_outbox(&mut self, directives: Vec<Directive>) {
        self.outbox.extend(directives);

        let overflow = self.outbox.len().saturating_sub(self.outbox_capacity);

        for directive in self.outbox.drain(..overflow) {
            tracing::warn!(
                "❗ Outbox full, dropped {:?} for {}",
                directive.notice,
                directive.recipient
            );
        }
    }
}
