// `Registry` over SQLite. rusqlite is synchronous; every statement here is a
// short indexed query, so it runs inline on the calling task.

use super::EmoteStore;
use crate::atoms::error::EmoteResult;
use crate::atoms::traits::Registry;
use crate::atoms::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
impl Registry for EmoteStore {
    async fn find_by_name(&self, name: &str) -> EmoteResult<Emote> {
        self.get_emote_by_name(name)
    }

    async fn find_by_id(&self, id: EmoteId) -> EmoteResult<Emote> {
        self.get_emote(id)
    }

    async fn insert(&self, new: NewEmote) -> EmoteResult<Emote> {
        self.insert_emote(&new)
    }

    async fn update_fields(&self, id: EmoteId, authority: Authority, update: EmoteUpdate) -> EmoteResult<Emote> {
        self.update_emote(id, authority, &update)
    }

    async fn delete(&self, id: EmoteId, authority: Authority) -> EmoteResult<Emote> {
        self.delete_emote(id, authority)
    }

    async fn count_usage(&self, id: EmoteId) -> EmoteResult<u64> {
        self.usage_count(id, None)
    }

    async fn log_usage(&self, uses: &[(EmoteId, UserId)]) -> EmoteResult<()> {
        self.add_usage(uses)
    }

    async fn list_decay_candidates(&self, cutoff: DateTime<Utc>, usage_threshold: u32) -> EmoteResult<Vec<Emote>> {
        self.decay_candidates(cutoff, usage_threshold)
    }

    async fn shard_capacity(&self, animated: bool) -> EmoteResult<Vec<ShardCapacity>> {
        self.shard_capacity_for(animated)
    }
}
