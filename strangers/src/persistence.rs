use std::{
    collections::{HashMap, HashSet},
    fs,
    io::ErrorKind,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use crate::{errors::Error, types::UserId};

/// The durable subset of the engine state.
///
/// Queue, pairs and session start times are never saved.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Snapshot {
    pub blocked_users: HashSet<UserId>,
    pub all_users: HashSet<UserId>,
    pub user_reports: HashMap<UserId, String>,
}

pub trait Persistence: Send {
    fn load(&self) -> Result<Snapshot, Error>;

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Error>;
}

/// Load the last snapshot or start empty.
pub fn load_or_default(store: &dyn Persistence) -> Snapshot {
    match store.load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!("❗ Snapshot load failed, starting empty. {}", e);
            Snapshot::default()
        }
    }
}

/// Snapshot stored as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for JsonFile {
    fn load(&self) -> Result<Snapshot, Error> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::default()),
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            return Ok(Snapshot::default());
        }

        let snapshot = serde_json::from_slice(&bytes)?;

        Ok(snapshot)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;

        // Rename over the old file so a crash never leaves half a document.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

/// Keeps the snapshot in memory only.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub snapshot: Snapshot,
    pub saves: usize,
}

impl Persistence for MemoryStore {
    fn load(&self) -> Result<Snapshot, Error> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), Error> {
        self.snapshot = snapshot.clone();
        self.saves += 1;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFile::new(dir.path().join("bot_data.json"));

        assert_eq!(store.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFile::new(dir.path().join("bot_data.json"));

        let mut snapshot = Snapshot::default();
        snapshot.blocked_users.insert(UserId(3));
        snapshot.all_users.extend([UserId(1), UserId(2), UserId(3)]);
        snapshot.user_reports.insert(UserId(2), "spam".into());

        store.save(&snapshot).unwrap();

        assert_eq!(store.load().unwrap(), snapshot);
        assert!(!dir.path().join("bot_data.tmp").exists());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_data.json");
        fs::write(&path, b"{ not json").unwrap();

        let store = JsonFile::new(path);

        assert!(store.load().is_err());
        assert_eq!(load_or_default(&store), Snapshot::default());
    }
}
