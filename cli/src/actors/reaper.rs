use std::time::Duration;

use tokio::{
    sync::{mpsc::UnboundedSender, watch::Receiver},
    time::{interval, MissedTickBehavior},
};

use crate::actors::MatchRequest;

/// Asks the matchmaker for an inactivity sweep on a fixed period.
pub struct Reaper {
    matchmaker_tx: UnboundedSender<MatchRequest>,

    period: Duration,

    shutdown: Receiver<()>,
}

impl Reaper {
    pub fn new(
        matchmaker_tx: UnboundedSender<MatchRequest>,
        period: Duration,
        shutdown: Receiver<()>,
    ) -> Self {
        Self {
            matchmaker_tx,
            period,
            shutdown,
        }
    }

    pub async fn start(mut self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // First tick fires immediately, nobody can be idle yet.
        ticker.tick().await;

        tracing::info!("✅ Inactivity Sweep Online, every {:?}", self.period);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.changed() => break,

                _ = ticker.tick() => {
                    if self.matchmaker_tx.send(MatchRequest::Tick).is_err() {
                        tracing::warn!("❗ Matchmaker hung up");
                        break;
                    }
                },
            }
        }

        tracing::info!("❌ Inactivity Sweep Offline");
    }
}
