// ── Emotebank: Audit Log ───────────────────────────────────────────────────
// Creation, removal and decay notices are handed to whatever posts them (a
// log channel on the platform, usually) as messages over an mpsc channel.
// The poster owns the receiver; this side never blocks.

use crate::atoms::traits::AuditLog;
use crate::atoms::types::{AuditEvent, Emote, NoticeId};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

pub struct ChannelAuditLog {
    tx: mpsc::UnboundedSender<AuditEvent>,
    next_notice: AtomicU64,
}

impl ChannelAuditLog {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AuditEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelAuditLog { tx, next_notice: AtomicU64::new(1) }, rx)
    }

    fn send(&self, make: impl FnOnce(NoticeId) -> AuditEvent) -> Option<NoticeId> {
        let notice = self.next_notice.fetch_add(1, Ordering::Relaxed);
        match self.tx.send(make(notice)) {
            Ok(()) => Some(notice),
            Err(_) => {
                warn!("[audit] Receiver dropped, notice {} not delivered", notice);
                None
            }
        }
    }
}

#[async_trait]
impl AuditLog for ChannelAuditLog {
    async fn notify_create(&self, emote: &Emote) -> Option<NoticeId> {
        info!("[audit] {} created by {}", emote.name, emote.owner);
        self.send(|notice| AuditEvent::Created { notice, emote: emote.clone() })
    }

    async fn notify_remove(&self, emote: &Emote) -> Option<NoticeId> {
        info!("[audit] {} removed", emote.name);
        self.send(|notice| AuditEvent::Removed { notice, emote: emote.clone() })
    }

    async fn notify_decay(&self, emote: &Emote) -> Option<NoticeId> {
        info!("[audit] {} decayed (created {})", emote.name, emote.created.format("%Y-%m-%d"));
        self.send(|notice| AuditEvent::Decayed { notice, emote: emote.clone() })
    }

    async fn retract(&self, notice: NoticeId) {
        info!("[audit] Retracting notice {}", notice);
        if self.tx.send(AuditEvent::Retracted { notice }).is_err() {
            warn!("[audit] Receiver dropped, could not retract notice {}", notice);
        }
    }
}
