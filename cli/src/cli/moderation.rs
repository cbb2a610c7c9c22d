use std::path::PathBuf;

use strangers::{
    persistence::{JsonFile, Persistence},
    Error, UserId,
};

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
pub struct Moderation {
    /// File holding blocked users, known users and reports.
    #[arg(long, global = true, env = "STRANGERS_DATA_FILE", default_value = "bot_data.json")]
    data_file: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Block a user.
    Block(Target),

    /// Unblock a user.
    Unblock(Target),

    /// List blocked users.
    Blocked,

    /// List pending reports.
    Reports,

    /// Known users, blocked users and pending reports.
    Stats,
}

#[derive(Debug, Args)]
struct Target {
    /// User identifier.
    #[arg(short, long)]
    user: UserId,
}

pub async fn moderation_cli(cli: Moderation) {
    let mut store = JsonFile::new(cli.data_file);

    let res = match cli.cmd {
        Command::Block(args) => block_user(&mut store, args),
        Command::Unblock(args) => unblock_user(&mut store, args),
        Command::Blocked => list_blocked(&store),
        Command::Reports => list_reports(&store),
        Command::Stats => stats(&store),
    };

    if let Err(e) = res {
        eprintln!("❗ {}", e);
    }
}

fn block_user(store: &mut JsonFile, args: Target) -> Result<(), Error> {
    println!("Blocking User...");

    let mut snapshot = store.load()?;

    if !snapshot.blocked_users.insert(args.user) {
        println!("❗ User {} was already blocked", args.user);
        return Ok(());
    }

    store.save(&snapshot)?;

    println!("✅ User {} Blocked", args.user);

    Ok(())
}

fn unblock_user(store: &mut JsonFile, args: Target) -> Result<(), Error> {
    println!("Unblocking User...");

    let mut snapshot = store.load()?;

    if snapshot.blocked_users.remove(&args.user) {
        store.save(&snapshot)?;

        println!("✅ User {} Unblocked", args.user);

        return Ok(());
    }

    println!("❗ User {} was not blocked", args.user);

    Ok(())
}

fn list_blocked(store: &JsonFile) -> Result<(), Error> {
    let snapshot = store.load()?;

    if snapshot.blocked_users.is_empty() {
        println!("No blocked users.");
        return Ok(());
    }

    let mut users: Vec<UserId> = snapshot.blocked_users.into_iter().collect();
    users.sort_unstable();

    println!("🚫 Blocked Users:");
    for user in users {
        println!("{}", user);
    }

    Ok(())
}

fn list_reports(store: &JsonFile) -> Result<(), Error> {
    let snapshot = store.load()?;

    if snapshot.user_reports.is_empty() {
        println!("No pending reports");
        return Ok(());
    }

    let mut reports: Vec<(UserId, String)> = snapshot.user_reports.into_iter().collect();
    reports.sort();

    println!("📜 User Reports:\n");
    for (user, reason) in reports {
        println!("{}: {}", user, reason);
    }

    Ok(())
}

fn stats(store: &JsonFile) -> Result<(), Error> {
    let snapshot = store.load()?;

    println!(
        "📈 Bot Statistics\n\n👥 Total Users: {}\n🚫 Blocked Users: {}\n⚠️ Pending Reports: {}",
        snapshot.all_users.len(),
        snapshot.blocked_users.len(),
        snapshot.user_reports.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_and_unblock_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFile::new(dir.path().join("bot_data.json"));

        block_user(&mut store, Target { user: UserId(12) }).unwrap();
        assert!(store.load().unwrap().blocked_users.contains(&UserId(12)));

        unblock_user(&mut store, Target { user: UserId(12) }).unwrap();
        unblock_user(&mut store, Target { user: UserId(12) }).unwrap();
        assert!(store.load().unwrap().blocked_users.is_empty());

        stats(&store).unwrap();
        list_reports(&store).unwrap();
        list_blocked(&store).unwrap();
    }
}
