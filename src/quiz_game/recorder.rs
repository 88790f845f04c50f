use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Most recent rounds kept in history.
pub const MAX_RECORDS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub name: String,
    pub avatar: String,
    pub score: u32,
    pub cards_left: usize,
}

/// Summary of one completed round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    pub round_number: u32,
    pub players: Vec<PlayerSummary>,
    pub winner: String,
    /// Seconds from deal to win, measured by the caller.
    pub duration: u64,
}

/// Persistence collaborator for finished rounds.
pub trait MatchRecorder {
    /// Stores a record (newest first) and counts a win for its winner.
    fn append(&mut self, record: RoundRecord) -> io::Result<()>;
    fn list_recent(&self, limit: usize) -> io::Result<Vec<RoundRecord>>;
    fn win_tally(&self) -> io::Result<BTreeMap<String, u32>>;
    /// Drops all records and win counts.
    fn clear_history(&mut self) -> io::Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredData {
    #[serde(default)]
    pub player_names: Vec<String>,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
    #[serde(default)]
    pub total_wins: BTreeMap<String, u32>,
}

impl StoredData {
    fn add_round(&mut self, record: RoundRecord) {
        *self.total_wins.entry(record.winner.clone()).or_insert(0) += 1;
        self.rounds.insert(0, record);
        self.rounds.truncate(MAX_RECORDS);
    }

    fn recent(&self, limit: usize) -> Vec<RoundRecord> {
        self.rounds.iter().take(limit).cloned().collect()
    }

    fn clear_history(&mut self) {
        self.rounds.clear();
        self.total_wins.clear();
    }
}

#[derive(Debug, Default)]
pub struct InMemoryRecorder {
    data: StoredData,
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchRecorder for InMemoryRecorder {
    fn append(&mut self, record: RoundRecord) -> io::Result<()> {
        self.data.add_round(record);
        Ok(())
    }

    fn list_recent(&self, limit: usize) -> io::Result<Vec<RoundRecord>> {
        Ok(self.data.recent(limit))
    }

    fn win_tally(&self) -> io::Result<BTreeMap<String, u32>> {
        Ok(self.data.total_wins.clone())
    }

    fn clear_history(&mut self) -> io::Result<()> {
        self.data.clear_history();
        Ok(())
    }
}

/// Keeps history, win counts and the last player names in one JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRecorder {
    path: PathBuf,
}

impl JsonFileRecorder {
    pub fn new(path: PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or unreadable file reads as empty history.
    fn load(&self) -> StoredData {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return StoredData::default(),
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                return StoredData::default();
            }
        };
        serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!("Ignoring corrupt history in {}: {}", self.path.display(), e);
            StoredData::default()
        })
    }

    fn save(&self, data: &StoredData) -> io::Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json)?;
        debug!("Saved history to {}", self.path.display());
        Ok(())
    }

    pub fn player_names(&self) -> Vec<String> {
        self.load().player_names
    }

    pub fn save_player_names(&self, names: &[String]) -> io::Result<()> {
        let mut data = self.load();
        data.player_names = names.to_vec();
        self.save(&data)
    }
}

impl MatchRecorder for JsonFileRecorder {
    fn append(&mut self, record: RoundRecord) -> io::Result<()> {
        let mut data = self.load();
        data.add_round(record);
        self.save(&data)
    }

    fn list_recent(&self, limit: usize) -> io::Result<Vec<RoundRecord>> {
        Ok(self.load().recent(limit))
    }

    fn win_tally(&self) -> io::Result<BTreeMap<String, u32>> {
        Ok(self.load().total_wins)
    }

    fn clear_history(&mut self) -> io::Result<()> {
        let mut data = self.load();
        data.clear_history();
        self.save(&data)
    }
}
