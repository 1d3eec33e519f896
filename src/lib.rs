//! Emotebank: a shared registry of user-contributed custom emotes for a chat
//! platform.
//!
//! Messages are lexed for `:name:` / `;name;` references, which resolve
//! against the registry and render as the platform's inline emote form.
//! Emote images live on fixed-capacity shards; new uploads are spread across
//! shards with room. Replies generated from a message follow its edits and
//! deletion, and emotes nobody uses are reclaimed on a schedule.
//!
//! `atoms` holds data types, errors and the collaborator traits (`Registry`,
//! `Platform`, `AuditLog`); `engine` holds everything that acts on them,
//! including the SQLite-backed `EmoteStore`.

pub mod atoms;
pub mod engine;

pub use atoms::error::{EmoteError, EmoteResult};
pub use atoms::traits::{AuditLog, Platform, Registry};
pub use atoms::types::*;
pub use engine::audit::ChannelAuditLog;
pub use engine::config::Config;
pub use engine::decay::{DecayHandle, DecayReport, DecayScheduler};
pub use engine::emotes::EmoteService;
pub use engine::replies::{EditOutcome, ReplySync, ReplyTracker};
pub use engine::store::EmoteStore;
