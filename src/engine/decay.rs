// ── Emotebank: Decay Scheduler ─────────────────────────────────────────────
//
// Periodically reclaims emotes nobody uses. One cycle:
//   wait for the registry → list candidates older than the window with too
//   few recent uses (preserved ones never qualify) → for each: post the decay
//   notice, remove with system authority, retract the notice on failure.
//
// Failed candidates are skipped until the next cycle. Cycles never overlap:
// the next tick is only awaited after the current cycle finishes, and missed
// ticks are delayed rather than bunched.

use crate::atoms::types::{Authority, Emote};
use crate::engine::config::{Config, DecayConfig};
use crate::engine::emotes::EmoteService;
use crate::engine::timeouts::with_timeout;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecayReport {
    pub candidates: usize,
    pub removed: usize,
    pub failed: usize,
}

pub struct DecayScheduler {
    service: Arc<EmoteService>,
    config: DecayConfig,
}

/// Handle to a spawned scheduler task.
pub struct DecayHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DecayHandle {
    /// Signal the loop and wait for it to exit. A cycle already in progress
    /// runs to completion first.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.task.await {
            warn!("[decay] Scheduler task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl DecayScheduler {
    pub fn new(service: Arc<EmoteService>, config: &Config) -> Self {
        Self { service, config: config.decay.clone() }
    }

    pub fn spawn(self) -> DecayHandle {
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(async move { self.run(shutdown).await });
        DecayHandle { stop, task }
    }

    /// Loop until `shutdown` flips to true or its sender goes away. Returns
    /// at once when decay is disabled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if !self.config.enabled {
            info!("[decay] Disabled, scheduler not started");
            return;
        }

        info!(
            "[decay] Sweeping every {}s (window {}s, threshold {})",
            self.config.interval_secs, self.config.cutoff_window_secs, self.config.usage_threshold
        );
        // interval() panics on a zero period
        let mut ticker = tokio::time::interval(self.config.interval().max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    if report.candidates > 0 {
                        info!(
                            "[decay] Cycle done: {} candidates, {} removed, {} failed",
                            report.candidates, report.removed, report.failed
                        );
                    }
                }
            }
        }
        info!("[decay] Scheduler stopped");
    }

    pub async fn run_cycle(&self) -> DecayReport {
        let registry = self.service.registry();
        registry.wait_ready().await;

        let Some(cutoff) = self.config.cutoff_window().and_then(|w| Utc::now().checked_sub_signed(w)) else {
            warn!("[decay] Cutoff window of {}s is out of range, skipping", self.config.cutoff_window_secs);
            return DecayReport::default();
        };
        let candidates = match with_timeout(
            "list_decay_candidates",
            self.service.timeouts().registry(),
            registry.list_decay_candidates(cutoff, self.config.usage_threshold),
        )
        .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!("[decay] Could not list candidates: {}", e);
                return DecayReport::default();
            }
        };

        let mut report = DecayReport { candidates: candidates.len(), ..DecayReport::default() };
        debug!("[decay] {} candidates created before {}", report.candidates, cutoff.to_rfc3339());

        for emote in &candidates {
            if self.decay_one(emote).await {
                report.removed += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    async fn decay_one(&self, emote: &Emote) -> bool {
        let audit = self.service.audit();
        let notice = audit.notify_decay(emote).await;

        match self.service.remove(emote, Authority::System).await {
            Ok(()) => true,
            Err(e) => {
                warn!("[decay] Could not remove {} ({}), skipping: {}", emote.name, emote.id, e);
                if let Some(notice) = notice {
                    audit.retract(notice).await;
                }
                false
            }
        }
    }
}
