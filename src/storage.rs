//! Durable portfolio store.
//!
//! The engine only sees the [`PortfolioStore`] trait; sqlite is the default
//! backend, an in-memory map covers tests and anonymous tooling. Snapshots
//! are the serialized [`PortfolioState`] itself, keyed by user id.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::engine::state::PortfolioState;
use crate::logging::{log, obj, v_str, Domain, Level};

pub trait PortfolioStore: Send {
    /// Fetch the persisted snapshot for an identity, if any. A snapshot
    /// that exists but fails to decode is a hydration failure: it is
    /// logged and reported as absent rather than crashing the session.
    fn load(&mut self, user_id: &str) -> Result<Option<PortfolioState>>;

    /// Upsert the snapshot for an identity.
    fn save(&mut self, user_id: &str, state: &PortfolioState) -> Result<()>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening portfolio store at {}", path))?;
        let mut store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS portfolios (
                user_id TEXT PRIMARY KEY,
                snapshot TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }
}

impl PortfolioStore for SqliteStore {
    fn load(&mut self, user_id: &str) -> Result<Option<PortfolioState>> {
        let row: Option<String> = self
            .conn
            .query_row(
                "SELECT snapshot FROM portfolios WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(json) = row else { return Ok(None) };
        match serde_json::from_str(&json) {
            Ok(state) => Ok(Some(state)),
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Persist,
                    "hydration_failed",
                    obj(&[
                        ("user_id", v_str(user_id)),
                        ("error", v_str(&err.to_string())),
                    ]),
                );
                Ok(None)
            }
        }
    }

    fn save(&mut self, user_id: &str, state: &PortfolioState) -> Result<()> {
        let json = serde_json::to_string(state).context("encoding snapshot")?;
        self.conn.execute(
            "INSERT OR REPLACE INTO portfolios (user_id, snapshot, updated_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, json, crate::logging::ts_now()],
        )?;
        Ok(())
    }
}

/// Map-backed store for tests and ephemeral sessions. Clones share the
/// underlying map, so a test can keep a handle to a store it handed off.
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshots: Arc<Mutex<HashMap<String, PortfolioState>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortfolioStore for MemoryStore {
    fn load(&mut self, user_id: &str) -> Result<Option<PortfolioState>> {
        Ok(self
            .snapshots
            .lock()
            .ok()
            .and_then(|m| m.get(user_id).cloned()))
    }

    fn save(&mut self, user_id: &str, state: &PortfolioState) -> Result<()> {
        if let Ok(mut m) = self.snapshots.lock() {
            m.insert(user_id.to_string(), state.clone());
        }
        Ok(())
    }
}
