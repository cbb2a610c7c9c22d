mod actors;
mod cli;
mod server;

use clap::{ArgAction, Parser, Subcommand};

use tracing_subscriber::EnvFilter;

use crate::cli::{
    daemon::{daemon_cli, Daemon},
    moderation::{moderation_cli, Moderation},
};

#[derive(Parser)]
#[command(name = "strangers", bin_name = "strangers", version, about, long_about = None, rename_all = "kebab-case")]
struct Strangers {
    /// Verbose logging (-v for debug, -vv for trace).
    #[arg(long, short, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the pairing daemon.
    Daemon(Daemon),

    /// Block or unblock users and read reports while the daemon is stopped.
    Moderation(Moderation),
}

#[tokio::main]
async fn main() {
    let cli = Strangers::parse();

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Daemon(args) => daemon_cli(args).await,
        Commands::Moderation(args) => moderation_cli(args).await,
    }
}

fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env();

    // RUST_LOG wins over the flag.
    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };

        if let Ok(directive) = level.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
