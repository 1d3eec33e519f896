use super::{emote_from_row, format_timestamp, name_key, not_found_as, EmoteStore, EMOTE_COLUMNS};
use crate::atoms::error::{EmoteError, EmoteResult};
use crate::atoms::types::{Authority, Emote, EmoteId, EmoteUpdate, NewEmote};
use chrono::Utc;
use log::{debug, info};
use rusqlite::{params, OptionalExtension, TransactionBehavior};

impl EmoteStore {
    // ── Lookup ─────────────────────────────────────────────────────────

    /// Case-insensitive exact match on the emote name.
    pub fn get_emote_by_name(&self, name: &str) -> EmoteResult<Emote> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM emotes WHERE name_key = ?1", EMOTE_COLUMNS),
            params![name_key(name)],
            emote_from_row,
        )
        .map_err(|e| not_found_as(e, name))
    }

    pub fn get_emote(&self, id: EmoteId) -> EmoteResult<Emote> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM emotes WHERE id = ?1", EMOTE_COLUMNS),
            params![id as i64],
            emote_from_row,
        )
        .map_err(|e| not_found_as(e, id.to_string()))
    }

    // ── Insert ─────────────────────────────────────────────────────────

    /// Insert a freshly uploaded emote. The name check, the shard count and
    /// the insert share one IMMEDIATE transaction, so two concurrent creators
    /// cannot both squeeze into the last slot of a shard.
    pub fn insert_emote(&self, new: &NewEmote) -> EmoteResult<Emote> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let taken: Option<i64> = tx
            .query_row("SELECT id FROM emotes WHERE name_key = ?1", params![name_key(&new.name)], |r| r.get(0))
            .optional()?;
        if taken.is_some() {
            return Err(EmoteError::AlreadyExists { name: new.name.clone() });
        }

        let used: u32 = tx.query_row(
            "SELECT COUNT(*) FROM emotes WHERE shard_id = ?1 AND animated = ?2",
            params![new.shard_id as i64, new.animated],
            |r| r.get(0),
        )?;
        if used >= self.capacity {
            debug!("[store] Shard {} filled up before insert ({} used)", new.shard_id, used);
            return Err(EmoteError::ShardFull { shard_id: new.shard_id });
        }

        let created = Utc::now();
        tx.execute(
            "INSERT INTO emotes (id, name, name_key, owner, animated, created, shard_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.id as i64,
                new.name,
                name_key(&new.name),
                new.owner as i64,
                new.animated,
                format_timestamp(created),
                new.shard_id as i64,
            ],
        )?;
        tx.commit()?;

        info!("[store] Inserted emote {} ({}) on shard {}", new.name, new.id, new.shard_id);
        Ok(Emote {
            id: new.id,
            name: new.name.clone(),
            owner: new.owner,
            animated: new.animated,
            created,
            modified: None,
            description: None,
            preserved: false,
            shard_id: new.shard_id,
        })
    }

    // ── Update ─────────────────────────────────────────────────────────

    /// Apply `update` if `authority` may touch the emote. `modified` only
    /// moves when a field really changes.
    pub fn update_emote(&self, id: EmoteId, authority: Authority, update: &EmoteUpdate) -> EmoteResult<Emote> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut emote = tx
            .query_row(
                &format!("SELECT {} FROM emotes WHERE id = ?1", EMOTE_COLUMNS),
                params![id as i64],
                emote_from_row,
            )
            .map_err(|e| not_found_as(e, id.to_string()))?;

        if !authority.permits(&emote) {
            return Err(EmoteError::PermissionDenied { name: emote.name });
        }

        let mut changed = false;

        if let Some(name) = &update.name {
            if *name != emote.name {
                let clash: Option<i64> = tx
                    .query_row(
                        "SELECT id FROM emotes WHERE name_key = ?1 AND id != ?2",
                        params![name_key(name), id as i64],
                        |r| r.get(0),
                    )
                    .optional()?;
                if clash.is_some() {
                    return Err(EmoteError::AlreadyExists { name: name.clone() });
                }
                emote.name = name.clone();
                changed = true;
            }
        }

        if let Some(description) = &update.description {
            if *description != emote.description {
                emote.description = description.clone();
                changed = true;
            }
        }

        if let Some(preserved) = update.preserved {
            if preserved != emote.preserved {
                emote.preserved = preserved;
                changed = true;
            }
        }

        if !changed {
            return Ok(emote);
        }

        let modified = Utc::now();
        tx.execute(
            "UPDATE emotes SET name = ?1, name_key = ?2, description = ?3, preserved = ?4, modified = ?5
             WHERE id = ?6",
            params![
                emote.name,
                name_key(&emote.name),
                emote.description,
                emote.preserved,
                format_timestamp(modified),
                id as i64,
            ],
        )?;
        tx.commit()?;

        emote.modified = Some(modified);
        Ok(emote)
    }

    // ── Delete ─────────────────────────────────────────────────────────

    pub fn delete_emote(&self, id: EmoteId, authority: Authority) -> EmoteResult<Emote> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let emote = tx
            .query_row(
                &format!("SELECT {} FROM emotes WHERE id = ?1", EMOTE_COLUMNS),
                params![id as i64],
                emote_from_row,
            )
            .map_err(|e| not_found_as(e, id.to_string()))?;

        if !authority.permits(&emote) {
            return Err(EmoteError::PermissionDenied { name: emote.name });
        }

        tx.execute("DELETE FROM emote_usage_history WHERE id = ?1", params![id as i64])?;
        tx.execute("DELETE FROM emotes WHERE id = ?1", params![id as i64])?;
        tx.commit()?;

        info!("[store] Deleted emote {} ({})", emote.name, emote.id);
        Ok(emote)
    }
}
