// ── Emotebank: Reference Resolver ──────────────────────────────────────────
//
// Turns lexed references into registered emotes. Two renderings share one
// token stream:
//
//   extract: only the resolved emotes (plus newlines), everything else
//             dropped. Backs the automatic reply to plain messages.
//   quote  : the whole message with resolved references substituted.
//             Unresolved bare references come back escaped (`\:name:`) so a
//             later redisplay does not resolve them by accident.
//
// A failed lookup never aborts the pass; the reference is just unresolved.

use crate::atoms::constants::RESERVED_NAMES;
use crate::atoms::error::{EmoteError, EmoteResult};
use crate::atoms::traits::Registry;
use crate::atoms::types::{Emote, Resolution, UserId};
use crate::engine::lexer::{tokenize, Token};
use crate::engine::timeouts::with_timeout;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Extract,
    Quote,
}

pub struct Resolver {
    registry: Arc<dyn Registry>,
    reserved: HashSet<String>,
    timeout: Duration,
}

impl Resolver {
    /// `extra_reserved` extends the built-in short-code list.
    pub fn new(registry: Arc<dyn Registry>, extra_reserved: &[String], timeout: Duration) -> Self {
        let reserved = RESERVED_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(extra_reserved.iter().map(|s| s.to_lowercase()))
            .collect();
        Self { registry, reserved, timeout }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(&name.to_lowercase())
    }

    pub async fn resolve_extract(&self, text: &str) -> Resolution {
        self.resolve(text, Mode::Extract).await
    }

    pub async fn resolve_quote(&self, text: &str) -> Resolution {
        self.resolve(text, Mode::Quote).await
    }

    async fn resolve(&self, text: &str, mode: Mode) -> Resolution {
        // One lookup per distinct name per pass.
        let mut seen: HashMap<String, Option<Emote>> = HashMap::new();
        let mut out = Resolution::default();

        // Collected up front: the regex iterator is not held across lookups.
        let tokens: Vec<Token<'_>> = tokenize(text).collect();

        for token in tokens {
            match token {
                Token::BareRef { raw, name } => {
                    if self.is_reserved(name) {
                        if mode == Mode::Quote {
                            out.rendered.push_str(raw);
                        }
                        continue;
                    }
                    match self.lookup(name, &mut seen).await {
                        Some(emote) => {
                            out.rendered.push_str(&emote.render());
                            out.matched = true;
                            if !out.used.iter().any(|e| e.id == emote.id) {
                                out.used.push(emote);
                            }
                        }
                        None if mode == Mode::Quote => {
                            out.rendered.push('\\');
                            out.rendered.push_str(raw);
                        }
                        None => {}
                    }
                }
                Token::Text { raw } if mode == Mode::Extract => {
                    if raw == "\n" {
                        out.rendered.push('\n');
                    }
                }
                other if mode == Mode::Quote => out.rendered.push_str(other.raw()),
                _ => {}
            }
        }

        if mode == Mode::Extract {
            out.rendered = out.rendered.trim().to_string();
        }
        out
    }

    async fn lookup(&self, name: &str, seen: &mut HashMap<String, Option<Emote>>) -> Option<Emote> {
        let key = name.to_lowercase();
        if let Some(hit) = seen.get(&key) {
            return hit.clone();
        }

        let found = match with_timeout("find_by_name", self.timeout, self.registry.find_by_name(name)).await {
            Ok(emote) => Some(emote),
            Err(EmoteError::NotFound { .. }) => None,
            Err(e) => {
                warn!("[resolver] Lookup of {} failed, leaving it unresolved: {}", name, e);
                None
            }
        };
        seen.insert(key, found.clone());
        found
    }

    /// Persist one usage row per emote in `resolution`, credited to `actor`.
    /// Owners using their own emotes are skipped so they cannot inflate
    /// popularity. Returns how many rows were written.
    pub async fn log_usage(&self, resolution: &Resolution, actor: UserId) -> EmoteResult<usize> {
        let uses: Vec<_> =
            resolution.used.iter().filter(|e| e.owner != actor).map(|e| (e.id, actor)).collect();
        if uses.is_empty() {
            return Ok(0);
        }
        with_timeout("log_usage", self.timeout, self.registry.log_usage(&uses)).await?;
        debug!("[resolver] Logged {} uses by {}", uses.len(), actor);
        Ok(uses.len())
    }
}
