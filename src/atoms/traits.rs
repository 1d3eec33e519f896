// ── Emotebank Atoms: Collaborator Traits ───────────────────────────────────
// The core never owns persistence, transport or the audit channel; it talks
// to them through these traits, injected once at startup.

use crate::atoms::error::EmoteResult;
use crate::atoms::types::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Name-indexed persistent store of emotes.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Resolves once the store can serve queries.
    async fn wait_ready(&self) {}

    /// Case-insensitive exact lookup. `NotFound` when absent.
    async fn find_by_name(&self, name: &str) -> EmoteResult<Emote>;

    async fn find_by_id(&self, id: EmoteId) -> EmoteResult<Emote>;

    /// Insert inside a transaction that re-validates the name and the
    /// target shard's capacity (`AlreadyExists` / `ShardFull`).
    async fn insert(&self, new: NewEmote) -> EmoteResult<Emote>;

    async fn update_fields(
        &self,
        id: EmoteId,
        authority: Authority,
        update: EmoteUpdate,
    ) -> EmoteResult<Emote>;

    /// Delete and return the removed row.
    async fn delete(&self, id: EmoteId, authority: Authority) -> EmoteResult<Emote>;

    async fn count_usage(&self, id: EmoteId) -> EmoteResult<u64>;

    /// Append usage-log rows `(emote, user)` stamped with the current time.
    async fn log_usage(&self, uses: &[(EmoteId, UserId)]) -> EmoteResult<()>;

    /// Unpreserved emotes created before `cutoff` with fewer than
    /// `usage_threshold` uses since `cutoff`.
    async fn list_decay_candidates(
        &self,
        cutoff: DateTime<Utc>,
        usage_threshold: u32,
    ) -> EmoteResult<Vec<Emote>>;

    /// Every known shard with whether its `animated`-kind count is below capacity.
    async fn shard_capacity(&self, animated: bool) -> EmoteResult<Vec<ShardCapacity>>;
}

/// The chat platform hosting shards and replies.
#[async_trait]
pub trait Platform: Send + Sync {
    async fn upload_emote(&self, shard_id: ShardId, name: &str, image: &[u8]) -> EmoteResult<EmoteId>;

    async fn rename_emote(&self, shard_id: ShardId, id: EmoteId, name: &str) -> EmoteResult<()>;

    async fn delete_emote(&self, shard_id: ShardId, id: EmoteId) -> EmoteResult<()>;

    async fn edit_reply(&self, reply: ReplyRef, content: &str) -> EmoteResult<()>;

    async fn delete_reply(&self, reply: ReplyRef) -> EmoteResult<()>;
}

/// Where creation, removal and decay notices go. Notices are fire-and-forget;
/// `None` means the notice could not be posted.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn notify_create(&self, emote: &Emote) -> Option<NoticeId>;

    async fn notify_remove(&self, emote: &Emote) -> Option<NoticeId>;

    async fn notify_decay(&self, emote: &Emote) -> Option<NoticeId>;

    /// Take back a notice whose action did not go through.
    async fn retract(&self, notice: NoticeId);
}
