//! SQLite save slots.
//!
//! Each write appends a row; loads read the newest row of a slot. Old rows
//! are pruned by the writer so a slot keeps a short history.

use crate::codec::{self, Snapshot};
use chrono::{SecondsFormat, Utc};
use idle_core::{Catalog, GameState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("save worker stopped: {0}")]
    Worker(String),
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS saves (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    slot TEXT NOT NULL,
    saved_at TEXT NOT NULL,
    payload TEXT NOT NULL
)";

const SLOT_INDEX: &str = "CREATE INDEX IF NOT EXISTS saves_slot_id ON saves (slot, id)";

/// Handle to the save database. Cheap to clone.
#[derive(Clone, Debug)]
pub struct SaveStore {
    pool: SqlitePool,
}

/// Filesystem path behind a `sqlite:` URL, or `None` for in-memory databases.
fn file_path(url: &str) -> Option<&str> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

impl SaveStore {
    /// Open (creating if needed) the database at `url` and ensure the schema.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        if let Some(parent) = file_path(url).and_then(|p| Path::new(p).parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        // One connection: in-memory databases are per-connection, and saves
        // are serialized through the writer anyway.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        sqlx::query(SLOT_INDEX).execute(&pool).await?;
        info!(%url, "save store ready");
        Ok(Self { pool })
    }

    /// Append a snapshot to `slot`. Returns the new row id.
    pub async fn write(&self, slot: &str, snapshot: &Snapshot) -> Result<i64, StoreError> {
        let payload = codec::encode(snapshot)?;
        let saved_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let result = sqlx::query("INSERT INTO saves (slot, saved_at, payload) VALUES (?, ?, ?)")
            .bind(slot)
            .bind(saved_at)
            .bind(payload)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Raw payload of the newest save in `slot`.
    pub async fn latest(&self, slot: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT payload FROM saves WHERE slot = ? ORDER BY id DESC LIMIT 1")
                .bind(slot)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(payload,)| payload))
    }

    /// Startup load for `slot`. Database failures propagate; a missing or
    /// corrupt payload yields the zero state.
    pub async fn load_state(&self, slot: &str, catalog: &Catalog) -> Result<GameState, StoreError> {
        let payload = self.latest(slot).await?;
        if payload.is_none() {
            info!(%slot, "no save found, starting fresh");
        }
        Ok(codec::load_or_default(payload.as_deref(), catalog))
    }

    /// Keep only the newest `keep` rows of `slot`. Returns rows deleted.
    pub async fn prune(&self, slot: &str, keep: u32) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM saves WHERE slot = ? AND id NOT IN \
             (SELECT id FROM saves WHERE slot = ? ORDER BY id DESC LIMIT ?)",
        )
        .bind(slot)
        .bind(slot)
        .bind(i64::from(keep))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Number of rows stored for `slot`.
    pub async fn count(&self, slot: &str) -> Result<i64, StoreError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM saves WHERE slot = ?")
            .bind(slot)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idle_core::{default_catalog, ProducerId};

    async fn memory_store() -> SaveStore {
        SaveStore::open("sqlite::memory:").await.unwrap()
    }

    #[test]
    fn file_path_parsing() {
        assert_eq!(file_path("sqlite://./saves/main.db"), Some("./saves/main.db"));
        assert_eq!(file_path("sqlite:game.db?mode=rwc"), Some("game.db"));
        assert_eq!(file_path("sqlite::memory:"), None);
        assert_eq!(file_path("postgres://x"), None);
    }

    #[tokio::test]
    async fn write_then_load_latest() {
        let store = memory_store().await;
        let catalog = default_catalog();
        let mut state = GameState::new(&catalog);
        state.earn(42.0);
        store.write("a", &codec::serialize(&state)).await.unwrap();
        state.producers.insert(ProducerId::new("banana_tree"), 3);
        store.write("a", &codec::serialize(&state)).await.unwrap();

        let loaded = store.load_state("a", &catalog).await.unwrap();
        assert_eq!(loaded, state);
        let other = store.load_state("b", &catalog).await.unwrap();
        assert_eq!(other, GameState::new(&catalog));
    }

    #[tokio::test]
    async fn corrupt_row_loads_zero_state() {
        let store = memory_store().await;
        sqlx::query("INSERT INTO saves (slot, saved_at, payload) VALUES ('a', 'now', '{oops')")
            .execute(&store.pool)
            .await
            .unwrap();
        let catalog = default_catalog();
        assert_eq!(store.load_state("a", &catalog).await.unwrap(), GameState::new(&catalog));
    }

    #[tokio::test]
    async fn prune_keeps_newest_rows() {
        let store = memory_store().await;
        let snapshot = Snapshot::default();
        for _ in 0..5 {
            store.write("a", &snapshot).await.unwrap();
        }
        store.write("b", &snapshot).await.unwrap();
        assert_eq!(store.prune("a", 2).await.unwrap(), 3);
        assert_eq!(store.count("a").await.unwrap(), 2);
        assert_eq!(store.count("b").await.unwrap(), 1);
    }
}
