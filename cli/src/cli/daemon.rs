use std::{net::SocketAddr, path::PathBuf};

use crate::{
    actors::{Matchmaker, Reaper},
    server::start_server,
};

use strangers::{
    config::{
        INACTIVITY_TIMEOUT_SECS, LINK_COOLDOWN_SECS, MAX_TIMING_SECS, SWEEP_INTERVAL_SECS,
        WARNING_THRESHOLD,
    },
    dictionary::{Dictionary, NeverFlagged, WordList},
    persistence::JsonFile,
    Dispatcher, EngineConfig, UserId,
};

use tokio::{
    signal::ctrl_c,
    sync::{mpsc::unbounded_channel, watch},
};

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Daemon {
    /// Socket address the transport posts actions to.
    #[arg(long, env = "STRANGERS_ADDR", default_value = "127.0.0.1:2527")]
    socket_addr: SocketAddr,

    /// File holding blocked users, known users and reports.
    #[arg(long, env = "STRANGERS_DATA_FILE", default_value = "bot_data.json")]
    data_file: PathBuf,

    /// User allowed to use the admin panel.
    #[arg(long, env = "STRANGERS_ADMIN")]
    admin: Option<UserId>,

    /// Inappropriate words, one per line.
    #[arg(long, env = "STRANGERS_WORDS")]
    words: Option<PathBuf>,

    /// Expire sessions of inactive users.
    #[arg(long, env = "STRANGERS_SWEEP")]
    sweep: bool,

    /// Seconds between inactivity sweeps.
    #[arg(
        long,
        default_value_t = SWEEP_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMING_SECS)
    )]
    sweep_interval: u64,

    /// Seconds without activity before a session expires.
    #[arg(
        long,
        default_value_t = INACTIVITY_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(..=MAX_TIMING_SECS)
    )]
    inactivity_timeout: u64,

    /// Seconds into a chat before profile links can be shared.
    #[arg(
        long,
        default_value_t = LINK_COOLDOWN_SECS,
        value_parser = clap::value_parser!(u64).range(..=MAX_TIMING_SECS)
    )]
    link_cooldown: u64,

    /// Flagged messages before a user is blocked.
    #[arg(
        long,
        default_value_t = WARNING_THRESHOLD,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    warning_threshold: u32,
}

impl Daemon {
    fn config(&self) -> EngineConfig {
        EngineConfig {
            link_cooldown: self.link_cooldown,
            warning_threshold: self.warning_threshold,
            inactivity_timeout: self.inactivity_timeout,
            sweep_interval: self.sweep_interval,
            sweep_enabled: self.sweep,
        }
    }
}

pub async fn daemon_cli(args: Daemon) {
    tracing::info!("Initialization...");

    let config = args.config();

    let Daemon {
        socket_addr,
        data_file,
        admin,
        words,
        ..
    } = args;

    let dictionary: Box<dyn Dictionary + Send> = match words {
        Some(path) => match WordList::from_file(&path) {
            Ok(list) => {
                tracing::info!("Loaded {} flagged words", list.len());
                Box::new(list)
            }
            Err(e) => {
                tracing::warn!("❗ Word list {} unavailable, nothing will be flagged. {}", path.display(), e);
                Box::new(NeverFlagged)
            }
        },
        None => Box::new(NeverFlagged),
    };

    if admin.is_none() {
        tracing::warn!("❗ No admin configured, the admin panel is disabled");
    }

    let store = JsonFile::new(data_file);
    let dispatcher = Dispatcher::new(config.clone(), Box::new(store), dictionary, admin);

    let mut handles = Vec::with_capacity(4);

    let shutdown = {
        let (tx, rx) = watch::channel::<()>(());

        let handle = tokio::spawn(async move {
            ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");

            if let Err(e) = tx.send(()) {
                tracing::error!("{}", e);
            }
        });
        handles.push(handle);

        rx
    };

    let (matchmaker_tx, matchmaker_rx) = unbounded_channel();

    let matchmaker = Matchmaker::new(dispatcher, matchmaker_rx, shutdown.clone());
    let handle = tokio::spawn(matchmaker.start());
    handles.push(handle);

    if config.sweep_enabled {
        let reaper = Reaper::new(
            matchmaker_tx.clone(),
            config.sweep_interval(),
            shutdown.clone(),
        );
        let handle = tokio::spawn(reaper.start());
        handles.push(handle);
    } else {
        tracing::info!("Inactivity sweep disabled");
    }

    let handle = tokio::spawn(start_server(socket_addr, matchmaker_tx, shutdown));
    handles.push(handle);

    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("❗ Main: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_args_are_bounded() {
        let args = Daemon::try_parse_from(["daemon"]).unwrap();
        assert_eq!(args.config(), EngineConfig::default());

        let too_long = (MAX_TIMING_SECS + 1).to_string();

        for flag in ["--inactivity-timeout", "--link-cooldown", "--sweep-interval"] {
            assert!(Daemon::try_parse_from(["daemon", flag, too_long.as_str()]).is_err());
        }

        assert!(Daemon::try_parse_from(["daemon", "--sweep-interval", "0"]).is_err());
        assert!(Daemon::try_parse_from(["daemon", "--warning-threshold", "0"]).is_err());

        let args =
            Daemon::try_parse_from(["daemon", "--inactivity-timeout", "0", "--link-cooldown", "0"])
                .unwrap();
        assert_eq!(args.config().inactivity_timeout, 0);
    }
}
