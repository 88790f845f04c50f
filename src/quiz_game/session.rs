use super::round::Round;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// An in-flight round persisted between HTTP requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub id: String,
    pub round: Round,
    /// Set once the finished round has gone to the match recorder.
    #[serde(default)]
    pub recorded: bool,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl GameSession {
    pub fn new(id: String, round: Round) -> Self {
        Self {
            id,
            round,
            recorded: false,
            last_updated: chrono::Utc::now(),
        }
    }

    pub fn save(&self, sessions_dir: &Path) -> std::io::Result<()> {
        let session_path = sessions_dir.join(format!("{}.json", self.id));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(session_path, json)
    }

    pub fn load(id: &str, sessions_dir: &Path) -> std::io::Result<Self> {
        let session_path = sessions_dir.join(format!("{}.json", id));
        let json = fs::read_to_string(session_path)?;
        let mut session: Self = serde_json::from_str(&json)?;
        session.last_updated = chrono::Utc::now();
        Ok(session)
    }
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    pub sessions_dir: PathBuf,
}

impl SessionManager {
    pub fn new(sessions_dir: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&sessions_dir)?;
        Ok(Self { sessions_dir })
    }

    pub fn create_session(&self, round: Round) -> std::io::Result<GameSession> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = GameSession::new(id, round);
        session.save(&self.sessions_dir)?;
        Ok(session)
    }

    pub fn load_session(&self, id: &str) -> std::io::Result<GameSession> {
        // Ids are file stems; refuse anything that could walk the directory.
        if id.is_empty() || id.contains(['/', '\\', '.']) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no session {}", id),
            ));
        }
        GameSession::load(id, &self.sessions_dir)
    }

    pub fn save_session(&self, session: &GameSession) -> std::io::Result<()> {
        session.save(&self.sessions_dir)
    }

    pub fn list_sessions(&self) -> std::io::Result<Vec<String>> {
        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.sessions_dir)? {
            let entry = entry?;
            if let Some(file_name) = entry.file_name().to_str() {
                if file_name.ends_with(".json") {
                    sessions.push(file_name.trim_end_matches(".json").to_string());
                }
            }
        }
        sessions.sort();
        Ok(sessions)
    }

    pub fn delete_session(&self, id: &str) -> std::io::Result<()> {
        let session = self.load_session(id)?;
        fs::remove_file(self.sessions_dir.join(format!("{}.json", session.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn round() -> Round {
        Round::start(vec!["Alice".to_string(), "Bob".to_string()]).unwrap()
    }

    #[test]
    fn test_create_and_load_session() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path().to_path_buf()).unwrap();

        let session = manager.create_session(round()).unwrap();
        let loaded = manager.load_session(&session.id).unwrap();

        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.round, session.round);
        assert!(!loaded.recorded);
        // Questions survive the round trip with their content.
        let card = &loaded.round.state.players[0].hand[0];
        assert!(!card.question.text.is_empty());
    }

    #[test]
    fn test_list_and_delete_sessions() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path().to_path_buf()).unwrap();

        let a = manager.create_session(round()).unwrap();
        let b = manager.create_session(round()).unwrap();

        let mut expected = vec![a.id.clone(), b.id.clone()];
        expected.sort();
        assert_eq!(manager.list_sessions().unwrap(), expected);

        manager.delete_session(&a.id).unwrap();
        assert_eq!(manager.list_sessions().unwrap(), vec![b.id.clone()]);
        assert!(manager.load_session(&a.id).is_err());
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = tempdir().unwrap();
        let manager = SessionManager::new(dir.path().to_path_buf()).unwrap();
        assert!(manager.load_session("../etc/passwd").is_err());
        assert!(manager.load_session("").is_err());
    }
}
