// ── Emotebank Atoms: Pure Data Types ───────────────────────────────────────
// Plain struct/enum definitions shared by the engine and the collaborator
// traits. No I/O here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform-assigned emote identifier (17+ digit snowflake).
pub type EmoteId = u64;
pub type UserId = u64;
pub type ShardId = u64;
/// Identifier of an inbound text unit (a chat message).
pub type MessageId = u64;
/// Handle to an audit-log notice so it can be retracted.
pub type NoticeId = u64;

/// A registered, user-contributed emote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Emote {
    pub id: EmoteId,
    pub name: String,
    pub owner: UserId,
    pub animated: bool,
    pub created: DateTime<Utc>,
    /// Set only when an observable field actually changed.
    pub modified: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// Exempt from decay.
    pub preserved: bool,
    pub shard_id: ShardId,
}

impl Emote {
    /// Canonical inline form understood by the platform: `<:name:id>` or
    /// `<a:name:id>` for animated emotes.
    pub fn render(&self) -> String {
        format!("<{}:{}:{}>", if self.animated { "a" } else { "" }, self.name, self.id)
    }

    /// Bare reference form, `:name:`.
    pub fn reference(&self) -> String {
        format!(":{}:", self.name)
    }
}

/// Everything needed to insert a freshly uploaded emote.
#[derive(Debug, Clone)]
pub struct NewEmote {
    pub id: EmoteId,
    pub name: String,
    pub owner: UserId,
    pub animated: bool,
    pub shard_id: ShardId,
}

/// Field changes for `Registry::update_fields`. `None` leaves a field alone;
/// `description: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct EmoteUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub preserved: Option<bool>,
}

impl EmoteUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn describe(description: Option<String>) -> Self {
        Self { description: Some(description), ..Self::default() }
    }

    pub fn preserve(preserved: bool) -> Self {
        Self { preserved: Some(preserved), ..Self::default() }
    }
}

/// Who is performing a mutation. `System` bypasses ownership checks and is
/// used by the decay sweep and moderators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    Owner(UserId),
    System,
}

impl Authority {
    pub fn permits(&self, emote: &Emote) -> bool {
        match self {
            Authority::System => true,
            Authority::Owner(user) => *user == emote.owner,
        }
    }
}

/// One row of `Registry::shard_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardCapacity {
    pub shard_id: ShardId,
    pub under_capacity: bool,
}

/// Which rendering produced a tracked reply; picks the reconciliation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Extracted,
    Quoted,
}

/// Location of a reply the bot posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyRef {
    pub channel_id: u64,
    pub message_id: MessageId,
}

/// Tracker value: how the reply was produced and what it currently says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRecord {
    pub kind: ReplyKind,
    pub reply: ReplyRef,
    pub content: String,
}

/// Output of a resolver pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub rendered: String,
    pub matched: bool,
    /// Distinct emotes resolved in this pass, in first-seen order.
    pub used: Vec<Emote>,
}

/// Messages emitted to the audit-log collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    Created { notice: NoticeId, emote: Emote },
    Removed { notice: NoticeId, emote: Emote },
    Decayed { notice: NoticeId, emote: Emote },
    Retracted { notice: NoticeId },
}
