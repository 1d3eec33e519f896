// Shared fixtures: an in-memory store, a recording fake platform and a
// service wired over them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use emotebank::engine::store::format_timestamp;
use emotebank::*;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

/// Minimal JPEG header: static.
pub const STATIC_IMG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
/// GIF header: always animated.
pub const ANIMATED_IMG: &[u8] = b"GIF89a\x01\x00\x01\x00";

const FIRST_EMOTE_ID: u64 = 100_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Upload { shard_id: ShardId, name: String, id: EmoteId },
    RenameEmote { id: EmoteId, name: String },
    DeleteEmote { shard_id: ShardId, id: EmoteId },
    EditReply { reply: ReplyRef, content: String },
    DeleteReply { reply: ReplyRef },
}

#[derive(Default)]
pub struct FakePlatform {
    next_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
    live: Mutex<HashMap<EmoteId, ShardId>>,
    failing_deletes: Mutex<HashSet<EmoteId>>,
    /// Uploads take this long before the platform answers.
    pub upload_delay_ms: AtomicU64,
    pub fail_edits: AtomicBool,
    pub fail_reply_deletes: AtomicBool,
    pub fail_renames: AtomicBool,
}

impl FakePlatform {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn uploads(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Upload { .. })).count()
    }

    pub fn reply_edits(&self) -> Vec<(ReplyRef, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::EditReply { reply, content } => Some((reply, content)),
                _ => None,
            })
            .collect()
    }

    pub fn reply_deletes(&self) -> Vec<ReplyRef> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteReply { reply } => Some(reply),
                _ => None,
            })
            .collect()
    }

    pub fn fail_delete_of(&self, id: EmoteId, fail: bool) {
        let mut set = self.failing_deletes.lock();
        if fail {
            set.insert(id);
        } else {
            set.remove(&id);
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn upload_emote(&self, shard_id: ShardId, name: &str, _image: &[u8]) -> EmoteResult<EmoteId> {
        // Let other creations interleave with this one.
        tokio::task::yield_now().await;
        let delay = self.upload_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        let id = FIRST_EMOTE_ID + self.next_id.fetch_add(1, Ordering::SeqCst);
        self.live.lock().insert(id, shard_id);
        self.record(Call::Upload { shard_id, name: name.to_string(), id });
        Ok(id)
    }

    async fn rename_emote(&self, _shard_id: ShardId, id: EmoteId, name: &str) -> EmoteResult<()> {
        if self.fail_renames.load(Ordering::SeqCst) {
            return Err(EmoteError::platform("rename_emote", "missing permissions"));
        }
        self.record(Call::RenameEmote { id, name: name.to_string() });
        Ok(())
    }

    async fn delete_emote(&self, shard_id: ShardId, id: EmoteId) -> EmoteResult<()> {
        if self.failing_deletes.lock().contains(&id) {
            return Err(EmoteError::platform("delete_emote", "service unavailable"));
        }
        self.live.lock().remove(&id);
        self.record(Call::DeleteEmote { shard_id, id });
        Ok(())
    }

    async fn edit_reply(&self, reply: ReplyRef, content: &str) -> EmoteResult<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(EmoteError::platform("edit_reply", "unknown message"));
        }
        self.record(Call::EditReply { reply, content: content.to_string() });
        Ok(())
    }

    async fn delete_reply(&self, reply: ReplyRef) -> EmoteResult<()> {
        if self.fail_reply_deletes.load(Ordering::SeqCst) {
            return Err(EmoteError::platform("delete_reply", "unknown message"));
        }
        self.record(Call::DeleteReply { reply });
        Ok(())
    }
}

/// How `FaultyInserts` misbehaves.
#[derive(Debug, Clone, Copy)]
pub enum InsertFault {
    Error,
    /// Sit on the insert this long before passing it on.
    Stall(Duration),
}

/// Registry whose inserts misbehave; everything else goes to the store.
pub struct FaultyInserts(pub Arc<EmoteStore>, pub InsertFault);

#[async_trait]
impl Registry for FaultyInserts {
    async fn find_by_name(&self, name: &str) -> EmoteResult<Emote> {
        self.0.find_by_name(name).await
    }

    async fn find_by_id(&self, id: EmoteId) -> EmoteResult<Emote> {
        self.0.find_by_id(id).await
    }

    async fn insert(&self, new: NewEmote) -> EmoteResult<Emote> {
        match self.1 {
            InsertFault::Error => Err(EmoteError::Other("disk I/O error".into())),
            InsertFault::Stall(delay) => {
                tokio::time::sleep(delay).await;
                self.0.insert(new).await
            }
        }
    }

    async fn update_fields(&self, id: EmoteId, authority: Authority, update: EmoteUpdate) -> EmoteResult<Emote> {
        self.0.update_fields(id, authority, update).await
    }

    async fn delete(&self, id: EmoteId, authority: Authority) -> EmoteResult<Emote> {
        self.0.delete(id, authority).await
    }

    async fn count_usage(&self, id: EmoteId) -> EmoteResult<u64> {
        self.0.count_usage(id).await
    }

    async fn log_usage(&self, uses: &[(EmoteId, UserId)]) -> EmoteResult<()> {
        self.0.log_usage(uses).await
    }

    async fn list_decay_candidates(&self, cutoff: DateTime<Utc>, usage_threshold: u32) -> EmoteResult<Vec<Emote>> {
        self.0.list_decay_candidates(cutoff, usage_threshold).await
    }

    async fn shard_capacity(&self, animated: bool) -> EmoteResult<Vec<ShardCapacity>> {
        self.0.shard_capacity(animated).await
    }
}

pub struct Harness {
    pub store: Arc<EmoteStore>,
    pub platform: Arc<FakePlatform>,
    pub service: Arc<EmoteService>,
    pub audit: UnboundedReceiver<AuditEvent>,
    pub config: Config,
}

pub fn harness(capacity: u32, shards: &[ShardId]) -> Harness {
    let mut config = Config::default();
    config.shard.capacity_per_kind = capacity;
    harness_with(config, shards)
}

pub fn harness_with(config: Config, shards: &[ShardId]) -> Harness {
    let store = Arc::new(EmoteStore::open_in_memory(config.shard.capacity_per_kind).unwrap());
    for &shard in shards {
        store.register_shard(shard).unwrap();
    }
    let platform = Arc::new(FakePlatform::default());
    let (audit_log, audit) = ChannelAuditLog::new();
    let service = Arc::new(EmoteService::new(&config, store.clone(), platform.clone(), Arc::new(audit_log)));
    Harness { store, platform, service, audit, config }
}

/// Everything the audit log has emitted so far.
pub fn drain(rx: &mut UnboundedReceiver<AuditEvent>) -> Vec<AuditEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

pub fn backdate(store: &EmoteStore, id: EmoteId, created: DateTime<Utc>) {
    store
        .conn
        .lock()
        .execute(
            "UPDATE emotes SET created = ?1 WHERE id = ?2",
            rusqlite::params![format_timestamp(created), id as i64],
        )
        .unwrap();
}
