//! SQLite-backed runtime state persistence.
//!
//! The engine's persisted memory lives in a small key-value table. Mutation
//! sets from a [`Decision`](crate::engine::Decision) are applied inside a
//! single transaction so a crash cannot leave ownership flags, suppression
//! windows, or skip identities partially updated.

use rusqlite::{params, Connection};
use tracing::warn;

use crate::config::data_dir;
use crate::engine::{RuntimeState, StateMutations};
use crate::error::StateStoreError;

const STATE_KEY: &str = "runtime_state";

/// SQLite store for the engine's runtime state.
pub struct StateStore {
    conn: Connection,
}

impl StateStore {
    /// Open the store at `~/.config/focusgate/focusgate.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self, StateStoreError> {
        let path = data_dir()
            .map_err(|e| StateStoreError::MigrationFailed(e.to_string()))?
            .join("focusgate.db");
        let conn = Connection::open(&path).map_err(|source| StateStoreError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (tests).
    pub fn open_memory() -> Result<Self, StateStoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StateStoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StateStoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load the persisted runtime state. A missing or unreadable record
    /// yields the default-safe state rather than an error.
    pub fn load(&self) -> Result<RuntimeState, StateStoreError> {
        let Some(json) = self.kv_get(STATE_KEY)? else {
            return Ok(RuntimeState::default());
        };
        match serde_json::from_str(&json) {
            Ok(state) => Ok(state),
            Err(e) => {
                warn!(target: "focusgate::state", "discarding unreadable runtime state: {e}");
                Ok(RuntimeState::default())
            }
        }
    }

    /// Persist the full runtime state.
    pub fn save(&self, state: &RuntimeState) -> Result<(), StateStoreError> {
        let json = serde_json::to_string(state).map_err(|e| StateStoreError::EncodeFailed {
            key: STATE_KEY.into(),
            message: e.to_string(),
        })?;
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![STATE_KEY, json],
        )?;
        Ok(())
    }

    /// Apply a decision's mutation set atomically and return the new state.
    pub fn apply(&mut self, mutations: &StateMutations) -> Result<RuntimeState, StateStoreError> {
        let tx = self.conn.transaction()?;
        let mut state: RuntimeState = {
            let mut stmt = tx.prepare("SELECT value FROM kv WHERE key = ?1")?;
            let json = match stmt.query_row(params![STATE_KEY], |row| row.get::<_, String>(0)) {
                Ok(v) => Some(v),
                Err(rusqlite::Error::QueryReturnedNoRows) => None,
                Err(e) => return Err(e.into()),
            };
            json.and_then(|j| serde_json::from_str(&j).ok())
                .unwrap_or_default()
        };
        mutations.apply(&mut state);
        let json = serde_json::to_string(&state).map_err(|e| StateStoreError::EncodeFailed {
            key: STATE_KEY.into(),
            message: e.to_string(),
        })?;
        tx.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![STATE_KEY, json],
        )?;
        tx.commit()?;
        Ok(state)
    }

    /// Drop the persisted state entirely.
    pub fn reset(&self) -> Result<(), StateStoreError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![STATE_KEY])?;
        Ok(())
    }
}
