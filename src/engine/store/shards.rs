use super::{format_timestamp, EmoteStore};
use crate::atoms::error::EmoteResult;
use crate::atoms::types::{ShardCapacity, ShardId};
use chrono::Utc;
use log::info;
use rusqlite::params;

impl EmoteStore {
    /// Record a provisioned shard so the allocator can use it.
    pub fn register_shard(&self, id: ShardId) -> EmoteResult<()> {
        let conn = self.conn.lock();
        let added = conn.execute(
            "INSERT OR IGNORE INTO shards (id, created) VALUES (?1, ?2)",
            params![id as i64, format_timestamp(Utc::now())],
        )?;
        if added > 0 {
            info!("[store] Registered shard {}", id);
        }
        Ok(())
    }

    pub fn list_shards(&self) -> EmoteResult<Vec<ShardId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id FROM shards ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids.into_iter().map(|id| id as u64).collect())
    }

    /// Live per-shard occupancy for one kind. Always recomputed from the
    /// emotes table, so a removal frees its slot with no extra bookkeeping.
    pub fn shard_usage(&self, animated: bool) -> EmoteResult<Vec<(ShardId, u32)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT s.id, COUNT(e.id)
             FROM shards s
             LEFT JOIN emotes e ON e.shard_id = s.id AND e.animated = ?1
             GROUP BY s.id
             ORDER BY s.id",
        )?;
        let rows = stmt
            .query_map(params![animated], |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, u32>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn shard_capacity_for(&self, animated: bool) -> EmoteResult<Vec<ShardCapacity>> {
        Ok(self
            .shard_usage(animated)?
            .into_iter()
            .map(|(shard_id, used)| ShardCapacity { shard_id, under_capacity: used < self.capacity })
            .collect())
    }
}
