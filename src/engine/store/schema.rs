// Database schema and migrations for the emote registry.
// Called once by EmoteStore::open(). Adding a table or column: append an
// idempotent CREATE … IF NOT EXISTS or ALTER TABLE at the end; never edit
// existing SQL, so upgrade paths stay clean.

use crate::atoms::error::EmoteResult;
use log::info;
use rusqlite::Connection;

pub(crate) fn run_migrations(conn: &Connection) -> EmoteResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS shards (
            id INTEGER PRIMARY KEY,
            created TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS emotes (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL UNIQUE,
            owner INTEGER NOT NULL,
            animated INTEGER NOT NULL DEFAULT 0,
            created TEXT NOT NULL,
            modified TEXT,
            description TEXT,
            preserved INTEGER NOT NULL DEFAULT 0,
            shard_id INTEGER NOT NULL,
            FOREIGN KEY (shard_id) REFERENCES shards(id)
        );

        CREATE INDEX IF NOT EXISTS idx_emotes_shard
            ON emotes(shard_id, animated);

        CREATE INDEX IF NOT EXISTS idx_emotes_created
            ON emotes(created) WHERE preserved = 0;

        CREATE TABLE IF NOT EXISTS emote_usage_history (
            id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            time TEXT NOT NULL,
            FOREIGN KEY (id) REFERENCES emotes(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_usage_emote_time
            ON emote_usage_history(id, time);
        ",
    )?;

    info!("[store] Schema ready");
    Ok(())
}
