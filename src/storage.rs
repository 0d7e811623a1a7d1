//! Session history persistence.
//!
//! The whole history lives as one JSON array under [`SESSIONS_KEY`]. There is
//! no per-record addressing: appending rewrites the blob and clearing removes
//! the key. Failures never propagate past this layer; reads degrade to an
//! empty history and writes report `false`.

use anyhow::{Context, Result};
use log::{error, info};

use crate::db::Database;
use crate::models::Session;

pub const SESSIONS_KEY: &str = "@focus_sessions";

#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Every stored session in insertion order; empty on a missing key or any read failure.
    pub async fn load_all(&self) -> Vec<Session> {
        match self.try_load_all().await {
            Ok(sessions) => sessions,
            Err(err) => {
                error!("Error loading sessions: {err:#}");
                Vec::new()
            }
        }
    }

    pub async fn save_all(&self, sessions: &[Session]) -> bool {
        match self.try_save_all(sessions).await {
            Ok(()) => true,
            Err(err) => {
                error!("Error saving sessions: {err:#}");
                false
            }
        }
    }

    pub async fn add(&self, session: Session) -> bool {
        let result = async {
            let mut sessions = self.try_load_all().await?;
            sessions.push(session);
            self.try_save_all(&sessions).await
        }
        .await;

        match result {
            Ok(()) => true,
            Err(err) => {
                error!("Error adding session: {err:#}");
                false
            }
        }
    }

    pub async fn clear_all(&self) -> bool {
        match self.db.remove_item(SESSIONS_KEY).await {
            Ok(_) => {
                info!("Cleared all stored sessions");
                true
            }
            Err(err) => {
                error!("Error clearing sessions: {err:#}");
                false
            }
        }
    }

    async fn try_load_all(&self) -> Result<Vec<Session>> {
        let Some(raw) = self.db.get_item(SESSIONS_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).context("stored session list is not valid JSON")
    }

    async fn try_save_all(&self, sessions: &[Session]) -> Result<()> {
        let serialized =
            serde_json::to_string(sessions).context("failed to serialize session list")?;
        self.db.set_item(SESSIONS_KEY, serialized).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn open_store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(Database::open(dir.path().join("focusdeck.sqlite3")).unwrap())
    }

    fn sample(duration: u64, completed: bool) -> Session {
        let at = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
        Session::finished(duration, "Coding", 0, at, completed)
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_store(&dir).load_all().await.is_empty());
    }

    #[tokio::test]
    async fn add_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        let first = sample(1500, true);
        let second = sample(300, false);

        assert!(store.add(first.clone()).await);
        assert!(store.add(second.clone()).await);

        assert_eq!(store.load_all().await, vec![first, second]);
    }

    #[tokio::test]
    async fn clear_all_empties_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(&dir);
        assert!(store.add(sample(1500, true)).await);

        assert!(store.clear_all().await);
        assert!(store.load_all().await.is_empty());
        // Clearing an already-empty store still succeeds.
        assert!(store.clear_all().await);
    }

    #[tokio::test]
    async fn corrupt_blob_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("focusdeck.sqlite3")).unwrap();
        db.set_item(SESSIONS_KEY, "{not json".into()).await.unwrap();

        let store = SessionStore::new(db);
        assert!(store.load_all().await.is_empty());
        // Appending onto an unreadable blob must not silently discard it.
        assert!(!store.add(sample(60, true)).await);
    }

    #[tokio::test]
    async fn reads_blob_written_by_mobile_client() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("focusdeck.sqlite3")).unwrap();
        db.set_item(
            SESSIONS_KEY,
            r#"[{"id":"session_1_abc","duration":1500,"category":"Coding","distractions":1,"timestamp":"2024-05-15T09:00:00.000Z","completed":true},
                {"id":"session_2_def","completed":true}]"#
                .into(),
        )
        .await
        .unwrap();

        let sessions = SessionStore::new(db).load_all().await;
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].duration_secs(), 1500);
        assert_eq!(sessions[1].duration_secs(), 0);
    }
}
