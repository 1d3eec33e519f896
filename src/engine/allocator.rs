// ── Emotebank: Shard Capacity Allocator ────────────────────────────────────
//
// Picks a shard with a free slot for a new emote, uniformly at random over
// every qualifying shard. The platform rate-limits emote creation per shard.
//
// Occupancy is never cached here. Each allocation reads live counts from the
// registry, and the registry re-checks the chosen shard inside the insert
// transaction (`ShardFull` if it filled in the meantime).

use crate::atoms::error::{EmoteError, EmoteResult};
use crate::atoms::traits::Registry;
use crate::atoms::types::{Emote, ShardCapacity, ShardId};
use crate::engine::timeouts::with_timeout;
use log::{debug, error};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

pub struct CapacityAllocator {
    registry: Arc<dyn Registry>,
    timeout: Duration,
}

impl CapacityAllocator {
    pub fn new(registry: Arc<dyn Registry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Choose a shard with room for one more emote of this kind.
    /// Fails with `CapacityExhausted` when every shard is full; that needs an
    /// operator to provision another shard, so callers must not retry.
    pub async fn allocate(&self, animated: bool) -> EmoteResult<ShardId> {
        let shards = with_timeout("shard_capacity", self.timeout, self.registry.shard_capacity(animated)).await?;

        let choice = {
            let mut rng = rand::thread_rng();
            choose_shard(&shards, &mut rng)
        };

        match choice {
            Some(shard_id) => {
                debug!("[allocator] Picked shard {} for {} emote", shard_id, kind(animated));
                Ok(shard_id)
            }
            None => {
                error!(
                    "[allocator] All {} shards are full for {} emotes, provision a new shard",
                    shards.len(),
                    kind(animated)
                );
                Err(EmoteError::CapacityExhausted { animated })
            }
        }
    }

    /// Called after a removal. Occupancy is recomputed from the registry on
    /// the next allocation, so there is no counter to decrement.
    pub fn release(&self, emote: &Emote) {
        debug!("[allocator] Released {} slot on shard {}", kind(emote.animated), emote.shard_id);
    }
}

/// Uniform choice among shards that are under capacity.
pub fn choose_shard<R: Rng + ?Sized>(shards: &[ShardCapacity], rng: &mut R) -> Option<ShardId> {
    let open: Vec<ShardId> = shards.iter().filter(|s| s.under_capacity).map(|s| s.shard_id).collect();
    open.choose(rng).copied()
}

fn kind(animated: bool) -> &'static str {
    if animated {
        "animated"
    } else {
        "static"
    }
}
