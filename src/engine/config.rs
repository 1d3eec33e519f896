// ── Emotebank: Configuration ───────────────────────────────────────────────
// Read-only settings, loaded once from TOML. Every key has a default so an
// empty file is a valid configuration.
//
//   [decay]    enabled, interval_secs, cutoff_window_secs, usage_threshold
//   [shard]    capacity_per_kind
//   [replies]  cache_bytes
//   [timeouts] registry_secs, platform_secs
//   [commands] prefixes, quote_aliases
//   [database] path
//   reserved_names = [...]

use crate::atoms::constants::*;
use crate::atoms::error::{EmoteError, EmoteResult};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decay: DecayConfig,
    pub shard: ShardConfig,
    pub replies: ReplyConfig,
    pub timeouts: TimeoutConfig,
    pub commands: CommandConfig,
    pub database: DatabaseConfig,
    /// Extra short-codes treated like the built-in reserved list.
    pub reserved_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub cutoff_window_secs: u64,
    pub usage_threshold: u32,
}

impl Default for DecayConfig {
    fn default() -> Self {
        DecayConfig {
            enabled: false,
            interval_secs: DEFAULT_DECAY_INTERVAL_SECS,
            cutoff_window_secs: DEFAULT_DECAY_WINDOW_SECS,
            usage_threshold: DEFAULT_DECAY_USAGE_THRESHOLD,
        }
    }
}

impl DecayConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// None when the window does not fit a signed duration. `validate`
    /// rejects such values, but a config built in code skips it.
    pub fn cutoff_window(&self) -> Option<chrono::Duration> {
        i64::try_from(self.cutoff_window_secs).ok().and_then(chrono::Duration::try_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardConfig {
    pub capacity_per_kind: u32,
}

impl Default for ShardConfig {
    fn default() -> Self {
        ShardConfig { capacity_per_kind: DEFAULT_SHARD_CAPACITY }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    pub cache_bytes: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        ReplyConfig { cache_bytes: DEFAULT_REPLY_CACHE_BYTES }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub registry_secs: u64,
    pub platform_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        TimeoutConfig {
            registry_secs: DEFAULT_REGISTRY_TIMEOUT_SECS,
            platform_secs: DEFAULT_PLATFORM_TIMEOUT_SECS,
        }
    }
}

impl TimeoutConfig {
    pub fn registry(&self) -> Duration {
        Duration::from_secs(self.registry_secs)
    }

    pub fn platform(&self) -> Duration {
        Duration::from_secs(self.platform_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    pub prefixes: Vec<String>,
    pub quote_aliases: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        CommandConfig {
            prefixes: vec![DEFAULT_COMMAND_PREFIX.to_string()],
            quote_aliases: DEFAULT_QUOTE_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `<data dir>/emotebank/emotes.db`.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            dirs::data_dir().unwrap_or_default().join("emotebank").join("emotes.db")
        })
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> EmoteResult<Self> {
        let config: Config =
            toml::from_str(raw).map_err(|e| EmoteError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EmoteResult<Self> {
        info!("[config] Loading {:?}", path);
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> EmoteResult<()> {
        if self.shard.capacity_per_kind == 0 {
            return Err(EmoteError::Config("shard.capacity_per_kind must be at least 1".into()));
        }
        if !(1..=MAX_DECAY_PERIOD_SECS).contains(&self.decay.interval_secs) {
            return Err(EmoteError::Config(format!(
                "decay.interval_secs must be between 1 and {}",
                MAX_DECAY_PERIOD_SECS
            )));
        }
        if !(1..=MAX_DECAY_PERIOD_SECS).contains(&self.decay.cutoff_window_secs) {
            return Err(EmoteError::Config(format!(
                "decay.cutoff_window_secs must be between 1 and {}",
                MAX_DECAY_PERIOD_SECS
            )));
        }
        if self.decay.usage_threshold == 0 {
            return Err(EmoteError::Config("decay.usage_threshold must be at least 1".into()));
        }
        if self.replies.cache_bytes == 0 {
            return Err(EmoteError::Config("replies.cache_bytes must be non-zero".into()));
        }
        if self.commands.prefixes.iter().all(|p| p.is_empty()) {
            return Err(EmoteError::Config("commands.prefixes needs a non-empty prefix".into()));
        }
        Ok(())
    }
}
