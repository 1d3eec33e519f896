// ── Emotebank: Emote Lifecycle Service ─────────────────────────────────────
//
// Owns the creation and removal paths and the owner-only mutations. Wires
// the registry, the hosting platform and the audit log together, all
// injected once at startup.
//
// Creation order matters for capacity accounting:
//   validate → name free? → allocate shard → upload → insert (re-checks
//   capacity in a transaction) → notify.
// If the insert fails after the upload, the uploaded emote is deleted again
// so the shard never stays over capacity.

use crate::atoms::constants::MAX_ALLOCATION_ATTEMPTS;
use crate::atoms::error::{EmoteError, EmoteResult};
use crate::atoms::traits::{AuditLog, Platform, Registry};
use crate::atoms::types::*;
use crate::engine::allocator::CapacityAllocator;
use crate::engine::config::{Config, TimeoutConfig};
use crate::engine::content;
use crate::engine::resolver::Resolver;
use crate::engine::timeouts::with_timeout;
use log::{error, info, warn};
use std::sync::Arc;

pub struct EmoteService {
    registry: Arc<dyn Registry>,
    platform: Arc<dyn Platform>,
    audit: Arc<dyn AuditLog>,
    allocator: CapacityAllocator,
    resolver: Resolver,
    timeouts: TimeoutConfig,
}

impl EmoteService {
    pub fn new(
        config: &Config,
        registry: Arc<dyn Registry>,
        platform: Arc<dyn Platform>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let timeouts = config.timeouts.clone();
        EmoteService {
            allocator: CapacityAllocator::new(registry.clone(), timeouts.registry()),
            resolver: Resolver::new(registry.clone(), &config.reserved_names, timeouts.registry()),
            registry,
            platform,
            audit,
            timeouts,
        }
    }

    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    pub fn audit(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    // ── Resolution ─────────────────────────────────────────────────────

    pub async fn resolve_extract(&self, text: &str) -> Resolution {
        self.resolver.resolve_extract(text).await
    }

    pub async fn resolve_quote(&self, text: &str) -> Resolution {
        self.resolver.resolve_quote(text).await
    }

    pub async fn log_usage(&self, resolution: &Resolution, actor: UserId) -> EmoteResult<usize> {
        self.resolver.log_usage(resolution, actor).await
    }

    pub async fn find(&self, name: &str) -> EmoteResult<Emote> {
        with_timeout("find_by_name", self.timeouts.registry(), self.registry.find_by_name(name)).await
    }

    // ── Creation ───────────────────────────────────────────────────────

    pub async fn create_emote(&self, name: &str, owner: UserId, image: &[u8]) -> EmoteResult<Emote> {
        content::validate_name(name)?;
        let animated = content::sniff(image)?;

        match self.find(name).await {
            Ok(existing) => return Err(EmoteError::AlreadyExists { name: existing.name }),
            Err(EmoteError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let mut attempt = 0;
        let emote = loop {
            attempt += 1;
            let shard_id = self.allocator.allocate(animated).await?;
            match self.upload_and_insert(shard_id, name, owner, animated, image).await {
                Err(EmoteError::ShardFull { shard_id }) if attempt < MAX_ALLOCATION_ATTEMPTS => {
                    warn!("[emotes] Shard {} filled during upload of {}, reallocating", shard_id, name);
                }
                other => break other?,
            }
        };

        info!("[emotes] Created {} ({}) for {} on shard {}", emote.name, emote.id, owner, emote.shard_id);
        self.audit.notify_create(&emote).await;
        Ok(emote)
    }

    async fn upload_and_insert(
        &self,
        shard_id: ShardId,
        name: &str,
        owner: UserId,
        animated: bool,
        image: &[u8],
    ) -> EmoteResult<Emote> {
        let id = with_timeout(
            "upload_emote",
            self.timeouts.platform(),
            self.platform.upload_emote(shard_id, name, image),
        )
        .await?;

        let new = NewEmote { id, name: name.to_string(), owner, animated, shard_id };
        match with_timeout("insert", self.timeouts.registry(), self.registry.insert(new)).await {
            Ok(emote) => Ok(emote),
            Err(e) => {
                // Undo the upload so the platform matches the registry again.
                if let Err(undo) = with_timeout(
                    "delete_emote",
                    self.timeouts.platform(),
                    self.platform.delete_emote(shard_id, id),
                )
                .await
                {
                    error!("[emotes] Could not roll back upload of {} ({}) on shard {}: {}", name, id, shard_id, undo);
                }
                Err(e)
            }
        }
    }

    // ── Removal ────────────────────────────────────────────────────────

    /// User-initiated removal by name.
    pub async fn remove_emote(&self, name: &str, authority: Authority) -> EmoteResult<Emote> {
        let emote = self.find(name).await?;
        self.remove(&emote, authority).await?;
        self.audit.notify_remove(&emote).await;
        Ok(emote)
    }

    /// Shared removal path for users and the decay sweep: platform first,
    /// then the registry row, then release the shard slot.
    pub async fn remove(&self, emote: &Emote, authority: Authority) -> EmoteResult<()> {
        if !authority.permits(emote) {
            return Err(EmoteError::PermissionDenied { name: emote.name.clone() });
        }

        with_timeout(
            "delete_emote",
            self.timeouts.platform(),
            self.platform.delete_emote(emote.shard_id, emote.id),
        )
        .await?;
        with_timeout("delete", self.timeouts.registry(), self.registry.delete(emote.id, authority)).await?;

        self.allocator.release(emote);
        info!("[emotes] Removed {} ({})", emote.name, emote.id);
        Ok(())
    }

    // ── Mutation ───────────────────────────────────────────────────────

    pub async fn rename_emote(&self, name: &str, new_name: &str, authority: Authority) -> EmoteResult<Emote> {
        content::validate_name(new_name)?;
        let old = self.find(name).await?;

        let renamed = self.update(old.id, authority, EmoteUpdate::rename(new_name)).await?;
        if renamed.name == old.name {
            return Ok(renamed);
        }

        if let Err(e) = with_timeout(
            "rename_emote",
            self.timeouts.platform(),
            self.platform.rename_emote(old.shard_id, old.id, new_name),
        )
        .await
        {
            warn!("[emotes] Platform rename of {} failed, reverting: {}", old.name, e);
            if let Err(revert) = self.update(old.id, Authority::System, EmoteUpdate::rename(&old.name)).await {
                error!("[emotes] Could not revert rename of {} ({}): {}", old.name, old.id, revert);
            }
            return Err(e);
        }

        info!("[emotes] Renamed {} to {}", old.name, renamed.name);
        Ok(renamed)
    }

    pub async fn describe_emote(
        &self,
        name: &str,
        description: Option<String>,
        authority: Authority,
    ) -> EmoteResult<Emote> {
        if let Some(d) = &description {
            content::validate_description(d)?;
        }
        let emote = self.find(name).await?;
        self.update(emote.id, authority, EmoteUpdate::describe(description)).await
    }

    pub async fn set_preserved(&self, name: &str, preserved: bool, authority: Authority) -> EmoteResult<Emote> {
        let emote = self.find(name).await?;
        let updated = self.update(emote.id, authority, EmoteUpdate::preserve(preserved)).await?;
        info!("[emotes] {} preserved={}", updated.name, updated.preserved);
        Ok(updated)
    }

    async fn update(&self, id: EmoteId, authority: Authority, update: EmoteUpdate) -> EmoteResult<Emote> {
        with_timeout(
            "update_fields",
            self.timeouts.registry(),
            self.registry.update_fields(id, authority, update),
        )
        .await
    }
}
