// ── Emotebank Atoms: Error Types ───────────────────────────────────────────
// Single canonical error enum for the crate, built with `thiserror`.
//
// Design rules:
//   • Domain variants (NotFound, CapacityExhausted…) carry enough detail to
//     render a plain-text message for the user.
//   • Internal variants (Database, Io, Config, Platform, Other) never reach
//     the user verbatim; `user_message()` collapses them.
//   • The lexer has no error type: its catch-all text rule always matches.

use std::time::Duration;
use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EmoteError {
    /// No emote is registered under this name.
    #[error("emote not found: {name}")]
    NotFound { name: String },

    /// The name is taken (case-insensitively) by another emote.
    #[error("an emote called {name} already exists")]
    AlreadyExists { name: String },

    /// Every shard is full for this kind. Needs an operator to add a shard.
    #[error("no shard has room for another {} emote", if *animated { "animated" } else { "static" })]
    CapacityExhausted { animated: bool },

    /// The allocated shard filled up before the insert committed.
    #[error("shard {shard_id} is full")]
    ShardFull { shard_id: u64 },

    /// A non-owner tried to mutate an emote.
    #[error("you do not own {name}")]
    PermissionDenied { name: String },

    #[error("description is {len} characters long, the limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },

    #[error("invalid emote name: {name}")]
    InvalidName { name: String },

    /// Payload is not a supported image type.
    #[error("invalid content: {0}")]
    InvalidContent(String),

    #[error("content is {size} bytes, the limit is {max}")]
    ContentTooLarge { size: usize, max: usize },

    /// A registry or platform call exceeded its budget.
    #[error("{operation} timed out after {}s", after.as_secs())]
    ExternalTimeout { operation: String, after: Duration },

    /// Hosting platform rejected or failed a request.
    #[error("platform error: {operation}: {message}")]
    Platform { operation: String, message: String },

    /// SQLite / rusqlite database failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or unreadable.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EmoteError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn platform(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform { operation: operation.into(), message: message.into() }
    }

    /// True for failures the user cannot act on (store, I/O, platform glitches).
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Io(_) | Self::Config(_) | Self::Platform { .. } | Self::Other(_)
        )
    }

    /// Plain-text message safe to show to the person who issued the request.
    /// Internal failures are reported generically; the detail belongs in logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::ShardFull { .. } => "no shard has room for another emote".to_string(),
            Self::ExternalTimeout { .. } => {
                "that took too long, please try again later".to_string()
            }
            e if e.is_internal() => "an internal error occurred, please try again later".to_string(),
            e => e.to_string(),
        }
    }
}

// ── String bridges ─────────────────────────────────────────────────────────

impl From<String> for EmoteError {
    fn from(s: String) -> Self {
        EmoteError::Other(s)
    }
}

impl From<&str> for EmoteError {
    fn from(s: &str) -> Self {
        EmoteError::Other(s.to_string())
    }
}

impl From<EmoteError> for String {
    fn from(e: EmoteError) -> Self {
        e.to_string()
    }
}

/// All fallible operations in the crate return this type.
pub type EmoteResult<T> = Result<T, EmoteError>;
