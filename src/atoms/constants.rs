// ── Emotebank Atoms: Constants ─────────────────────────────────────────────
// All named constants for the crate live here.

// ── Emote naming ───────────────────────────────────────────────────────────
// Names are 2–32 "word" characters. The lexer patterns and the creation-path
// validator must agree on these bounds.
pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 32;

/// Longest description accepted by `describe_emote`, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// The hosting platform refuses emote payloads above 256 KiB. Resizing is a
/// separate concern, so oversized uploads are rejected outright.
pub const MAX_EMOTE_BYTES: usize = 256 * 1024;

// ── Shards ─────────────────────────────────────────────────────────────────
// Each shard holds at most this many static and this many animated emotes.
pub const DEFAULT_SHARD_CAPACITY: u32 = 50;

/// How many times the creation path re-allocates after the chosen shard
/// filled up between allocation and insert.
pub(crate) const MAX_ALLOCATION_ATTEMPTS: u32 = 3;

// ── Reply tracker ──────────────────────────────────────────────────────────
// A typical record (key, reply ids, rendered content, list links) is about
// 256 bytes, so the default 256 MiB budget tracks ~1M replies. The budget is
// charged per record by actual content length; this only caps the count.
pub const APPROX_REPLY_RECORD_BYTES: usize = 256;
pub const DEFAULT_REPLY_CACHE_BYTES: usize = 256 * 1024 * 1024;

// ── Decay ──────────────────────────────────────────────────────────────────
pub const DEFAULT_DECAY_INTERVAL_SECS: u64 = 10 * 60;
pub const DEFAULT_DECAY_WINDOW_SECS: u64 = 4 * 7 * 24 * 60 * 60;
pub const DEFAULT_DECAY_USAGE_THRESHOLD: u32 = 2;
/// Upper bound for both the sweep interval and the cutoff window (10 years).
pub const MAX_DECAY_PERIOD_SECS: u64 = 10 * 365 * 24 * 60 * 60;

// ── External call budgets ──────────────────────────────────────────────────
pub const DEFAULT_REGISTRY_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PLATFORM_TIMEOUT_SECS: u64 = 30;

// ── Commands ───────────────────────────────────────────────────────────────
pub const DEFAULT_COMMAND_PREFIX: &str = "ec/";
pub const DEFAULT_QUOTE_ALIASES: &[&str] = &["quote", "q"];

// ── Reserved short-codes ───────────────────────────────────────────────────
// Built-in platform emoji short-codes. A bare reference using one of these
// names is left alone so the platform renders its own emoji.
pub const RESERVED_NAMES: &[&str] = &[
    "100", "angry", "apple", "bear", "blush", "boom", "broken_heart", "cat",
    "clap", "cold_sweat", "confused", "cool", "cry", "dog", "eyes", "fire",
    "flushed", "frowning", "ghost", "grin", "grinning", "heart", "heart_eyes",
    "hugging", "innocent", "joy", "kiss", "laughing", "mask", "neutral_face",
    "ok", "ok_hand", "pensive", "pizza", "poop", "pray", "rage", "relaxed",
    "relieved", "rocket", "rofl", "scream", "see_no_evil", "skull", "sleeping",
    "slight_smile", "smile", "smiley", "smirk", "sob", "sparkles", "star",
    "sunglasses", "sweat", "sweat_smile", "tada", "thinking", "thumbsdown",
    "thumbsup", "tired_face", "tongue", "triumph", "unamused", "upside_down",
    "wave", "weary", "wink", "worried", "x", "yum", "zipper_mouth",
];
