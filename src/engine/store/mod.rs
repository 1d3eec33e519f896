// Emotebank — Registry Store
// Keeps emotes, shards and the usage log in SQLite via rusqlite.
//
// Module layout:
//   schema    — idempotent migrations
//   emotes    — emote CRUD, transactional insert with capacity re-check
//   usage     — usage log + decay candidate query
//   shards    — shard bookkeeping + capacity query
//   registry  — `Registry` trait impl over the above

use crate::atoms::error::{EmoteError, EmoteResult};
use crate::atoms::types::Emote;
use crate::engine::config::Config;
use chrono::{DateTime, SecondsFormat, Utc};
use log::info;
use parking_lot::Mutex;
use rusqlite::{Connection, Row};
use std::path::Path;

mod emotes;
mod registry;
mod schema;
mod shards;
mod usage;

/// Thread-safe registry database.
pub struct EmoteStore {
    /// The SQLite connection, protected by a Mutex.
    /// `pub` for integration tests that need to backdate rows.
    pub conn: Mutex<Connection>,
    /// Per-shard cap for each of static and animated emotes.
    capacity: u32,
}

impl EmoteStore {
    /// Open (or create) the registry database and initialize tables.
    pub fn open(path: &Path, capacity: u32) -> EmoteResult<Self> {
        info!("[store] Opening registry at {:?}", path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        Self::with_connection(conn, capacity)
    }

    /// Open the database named by `[database]`, capped per `[shard]`.
    pub fn from_config(config: &Config) -> EmoteResult<Self> {
        Self::open(&config.database.resolved_path(), config.shard.capacity_per_kind)
    }

    /// Fresh private in-memory database. Used by tests.
    pub fn open_in_memory(capacity: u32) -> EmoteResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, capacity)
    }

    fn with_connection(conn: Connection, capacity: u32) -> EmoteResult<Self> {
        schema::run_migrations(&conn)?;
        Ok(EmoteStore { conn: Mutex::new(conn), capacity })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

// ── Row helpers ────────────────────────────────────────────────────────────

pub(crate) const EMOTE_COLUMNS: &str =
    "id, name, owner, animated, created, modified, description, preserved, shard_id";

/// Timestamps are stored as fixed-width RFC 3339 UTC text so that string
/// comparison in SQL matches chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
}

/// Map a row selected with `EMOTE_COLUMNS`.
pub(crate) fn emote_from_row(row: &Row<'_>) -> rusqlite::Result<Emote> {
    let created: String = row.get(4)?;
    let modified: Option<String> = row.get(5)?;
    Ok(Emote {
        id: row.get::<_, i64>(0)? as u64,
        name: row.get(1)?,
        owner: row.get::<_, i64>(2)? as u64,
        animated: row.get(3)?,
        created: parse_timestamp(&created)?,
        modified: modified.as_deref().map(parse_timestamp).transpose()?,
        description: row.get(6)?,
        preserved: row.get(7)?,
        shard_id: row.get::<_, i64>(8)? as u64,
    })
}

pub(crate) fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// Turn "no rows" into `NotFound` for the given lookup key.
pub(crate) fn not_found_as(err: rusqlite::Error, name: impl Into<String>) -> EmoteError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => EmoteError::not_found(name),
        e => EmoteError::Database(e),
    }
}
