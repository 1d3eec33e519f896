// ── Emotebank: Reply Reconciliation ────────────────────────────────────────
//
// Keeps bot replies in step with the messages that produced them:
//
//   untracked ──track_reply──▶ tracked(extracted | quoted)
//   tracked ──edit to no refs / non-quote, delete, eviction──▶ untracked
//
// An edit that renders identically to the current reply issues no platform
// call. Delete failures are logged and swallowed; the entry is dropped either
// way.

use super::tracker::ReplyTracker;
use crate::atoms::types::{MessageId, ReplyKind, ReplyRecord, ReplyRef};
use crate::engine::config::{CommandConfig, Config};
use crate::engine::emotes::EmoteService;
use crate::engine::timeouts::with_timeout;
use log::{debug, info, warn};
use std::sync::Arc;

/// What `on_edit` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The message is not (or no longer) tracked.
    Untracked,
    /// New content renders the same as the current reply.
    Unchanged,
    Edited,
    /// Nothing left to show; the reply was removed and tracking dropped.
    Deleted,
    /// The platform rejected the edit. Tracking is kept.
    Failed,
}

pub struct ReplySync {
    service: Arc<EmoteService>,
    tracker: ReplyTracker,
    commands: CommandConfig,
}

impl ReplySync {
    pub fn new(service: Arc<EmoteService>, config: &Config) -> Self {
        let tracker = ReplyTracker::with_byte_budget(config.replies.cache_bytes);
        info!(
            "[replies] Tracking up to {} replies within {} bytes",
            tracker.capacity(),
            tracker.byte_budget()
        );
        Self::with_tracker(service, tracker, config.commands.clone())
    }

    pub fn with_tracker(service: Arc<EmoteService>, tracker: ReplyTracker, commands: CommandConfig) -> Self {
        Self { service, tracker, commands }
    }

    pub fn tracker(&self) -> &ReplyTracker {
        &self.tracker
    }

    /// Remember the reply posted for `message_id` and what it says.
    pub fn track_reply(&mut self, message_id: MessageId, kind: ReplyKind, reply: ReplyRef, content: String) {
        for evicted in self.tracker.insert(message_id, ReplyRecord { kind, reply, content }) {
            debug!("[replies] Evicted {} to make room for {}", evicted, message_id);
        }
        if !self.tracker.contains(message_id) {
            warn!("[replies] Reply {} for {} is too large to track", reply.message_id, message_id);
        }
    }

    pub async fn on_edit(&mut self, message_id: MessageId, new_text: &str) -> EditOutcome {
        let Some(record) = self.tracker.get(message_id).cloned() else {
            return EditOutcome::Untracked;
        };

        let rendered = match record.kind {
            ReplyKind::Extracted => {
                let resolution = self.service.resolve_extract(new_text).await;
                resolution.matched.then_some(resolution.rendered)
            }
            ReplyKind::Quoted => match quote_body(new_text, &self.commands) {
                Some(body) => Some(self.service.resolve_quote(body).await.rendered),
                None => None,
            },
        };

        let Some(rendered) = rendered else {
            self.drop_reply(message_id, record.reply).await;
            return EditOutcome::Deleted;
        };

        if rendered == record.content {
            return EditOutcome::Unchanged;
        }

        let timeout = self.service.timeouts().platform();
        match with_timeout("edit_reply", timeout, self.service.platform().edit_reply(record.reply, &rendered)).await {
            Ok(()) => {
                if !self.tracker.update_content(message_id, rendered) {
                    debug!("[replies] Stopped tracking {}: edited reply is too large", message_id);
                }
                EditOutcome::Edited
            }
            Err(e) => {
                warn!("[replies] Could not edit reply {} for {}: {}", record.reply.message_id, message_id, e);
                EditOutcome::Failed
            }
        }
    }

    /// Returns true when the message had a tracked reply.
    pub async fn on_delete(&mut self, message_id: MessageId) -> bool {
        match self.tracker.peek(message_id).map(|r| r.reply) {
            Some(reply) => {
                self.drop_reply(message_id, reply).await;
                true
            }
            None => false,
        }
    }

    async fn drop_reply(&mut self, message_id: MessageId, reply: ReplyRef) {
        self.tracker.remove(message_id);
        let timeout = self.service.timeouts().platform();
        match with_timeout("delete_reply", timeout, self.service.platform().delete_reply(reply)).await {
            Ok(()) => debug!("[replies] Deleted reply {} for {}", reply.message_id, message_id),
            Err(e) => warn!("[replies] Could not delete reply {} for {}: {}", reply.message_id, message_id, e),
        }
    }
}

/// Body of a quote command (`<prefix><alias> <body>`), or None when `text`
/// is not one or has nothing after the alias.
pub fn quote_body<'t>(text: &'t str, commands: &CommandConfig) -> Option<&'t str> {
    let text = text.trim_start();
    for prefix in &commands.prefixes {
        let Some(rest) = text.strip_prefix(prefix.as_str()) else {
            continue;
        };
        for alias in &commands.quote_aliases {
            let Some(head) = rest.get(..alias.len()) else {
                continue;
            };
            if !head.eq_ignore_ascii_case(alias) {
                continue;
            }
            let after = &rest[alias.len()..];
            if !after.starts_with(char::is_whitespace) {
                continue;
            }
            let body = after.trim();
            if !body.is_empty() {
                return Some(body);
            }
        }
    }
    None
}
