use super::{emote_from_row, format_timestamp, EmoteStore, EMOTE_COLUMNS};
use crate::atoms::error::EmoteResult;
use crate::atoms::types::{Emote, EmoteId, UserId};
use chrono::{DateTime, Utc};
use log::debug;
use rusqlite::params;

impl EmoteStore {
    // ── Usage log ──────────────────────────────────────────────────────

    /// Append one row per `(emote, user)` pair, all stamped now.
    pub fn add_usage(&self, uses: &[(EmoteId, UserId)]) -> EmoteResult<()> {
        if uses.is_empty() {
            return Ok(());
        }
        let now = format_timestamp(Utc::now());
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO emote_usage_history (id, user_id, time) VALUES (?1, ?2, ?3)")?;
            for (emote_id, user_id) in uses {
                stmt.execute(params![*emote_id as i64, *user_id as i64, now])?;
            }
        }
        tx.commit()?;
        debug!("[store] Logged {} emote uses", uses.len());
        Ok(())
    }

    /// Usage rows for an emote, optionally only those after `since`.
    pub fn usage_count(&self, id: EmoteId, since: Option<DateTime<Utc>>) -> EmoteResult<u64> {
        let conn = self.conn.lock();
        let count: i64 = match since {
            Some(since) => conn.query_row(
                "SELECT COUNT(*) FROM emote_usage_history WHERE id = ?1 AND time > ?2",
                params![id as i64, format_timestamp(since)],
                |r| r.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM emote_usage_history WHERE id = ?1",
                params![id as i64],
                |r| r.get(0),
            )?,
        };
        Ok(count as u64)
    }

    // ── Decay ──────────────────────────────────────────────────────────

    /// Unpreserved emotes older than `cutoff` that were used fewer than
    /// `usage_threshold` times since `cutoff`. Oldest first.
    pub fn decay_candidates(&self, cutoff: DateTime<Utc>, usage_threshold: u32) -> EmoteResult<Vec<Emote>> {
        let conn = self.conn.lock();
        let cutoff = format_timestamp(cutoff);
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM emotes e
             WHERE e.created < ?1
               AND e.preserved = 0
               AND (SELECT COUNT(*) FROM emote_usage_history u
                    WHERE u.id = e.id AND u.time > ?1) < ?2
             ORDER BY e.created",
            EMOTE_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![cutoff, usage_threshold], emote_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
