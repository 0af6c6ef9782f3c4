//! The persistent status message of a guild.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::Branding;
use crate::error::{ErrorKind, PlatformError, SyncError, SyncResult};
use crate::model::id::{ChannelId, GuildId, MessageId};
use crate::model::snapshot::NowPlayingSnapshot;
use crate::model::surface::GuildRecord;
use crate::platform::{Capability, ChatPlatform, SurfaceStore};
use crate::render::render_embed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The guild has no status message.
    NoSurface,
    Edited,
    /// The message was gone and got published again.
    Recreated(MessageId),
    /// The channel is gone or unusable, the surface was disabled.
    Disabled
}

/// What startup reconciliation did with a single guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuildReconcile {
    Reset,
    Republished,
    Disabled,
    Skipped
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub reset: usize,
    pub republished: usize,
    pub disabled: usize,
    pub skipped: usize,
    pub errors: usize
}

pub struct EmbedPublisher {
    platform: Arc<dyn ChatPlatform>,
    store: Arc<dyn SurfaceStore>,
    branding: Branding,
    spacing: Duration
}

impl EmbedPublisher {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        store: Arc<dyn SurfaceStore>,
        branding: Branding,
        spacing: Duration
    ) -> Self {
        Self {
            platform,
            store,
            branding,
            spacing
        }
    }

    /// Sends a fresh idle status message and records it for the guild.
    pub async fn publish(&self, channel: ChannelId, guild: GuildId) -> Option<MessageId> {
        let payload = render_embed(None, &self.branding);

        let message = match self.platform.send_embed(channel, &payload).await {
            Ok(message) => message,
            Err(e) => {
                error!("Failed to publish status message in {channel} for guild {guild}: {e}");
                return None;
            }
        };

        if let Err(e) = self.store.set_embed(guild, channel, message).await {
            error!("Failed to record status message of guild {guild}: {e}");
            return None;
        }

        info!("Status message published in guild {guild}");
        Some(message)
    }

    /// Re-renders the guild's status message in place.
    pub async fn update(&self, guild: GuildId, snapshot: Option<&NowPlayingSnapshot>) -> SyncResult<UpdateOutcome> {
        let record = self.store.get(guild).await?;
        let Some((channel, message)) = record.and_then(|r| r.surface.embed()) else {
            return Ok(UpdateOutcome::NoSurface);
        };

        let payload = render_embed(snapshot, &self.branding);

        match self.platform.edit_embed(channel, message, &payload).await {
            Ok(()) => Ok(UpdateOutcome::Edited),
            Err(PlatformError::NotFound) => self.recreate(guild, channel, snapshot).await,
            Err(e) => Err(e.into())
        }
    }

    async fn recreate(
        &self,
        guild: GuildId,
        channel: ChannelId,
        snapshot: Option<&NowPlayingSnapshot>
    ) -> SyncResult<UpdateOutcome> {
        if let Err(e) = self.platform.fetch_channel(channel).await {
            if e.disables_surface() {
                warn!("Status channel of guild {guild} vanished, disabling surface");
                self.store.disable(guild).await?;
                return Ok(UpdateOutcome::Disabled);
            }

            return Err(e.into());
        }

        warn!("Status message of guild {guild} vanished, publishing a new one");

        let message = self.publish(channel, guild).await
            .ok_or(SyncError::Platform(PlatformError::Unavailable))?;

        if snapshot.is_some() {
            let payload = render_embed(snapshot, &self.branding);
            self.platform.edit_embed(channel, message, &payload).await?;
        }

        Ok(UpdateOutcome::Recreated(message))
    }

    /// Brings every enabled status message back to the idle state after a
    /// restart, disabling the ones that can't be reached anymore.
    pub async fn reconcile_on_startup(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let guilds = match self.store.list_enabled().await {
            Ok(guilds) => guilds,
            Err(e) => {
                error!("Failed to list status surfaces: {e}");
                return report;
            }
        };

        for (idx, (guild, record)) in guilds.iter().enumerate() {
            if idx > 0 {
                tokio::time::sleep(self.spacing).await;
            }

            match self.reconcile_guild(*guild, record).await {
                Ok(GuildReconcile::Reset) => report.reset += 1,
                Ok(GuildReconcile::Republished) => report.republished += 1,
                Ok(GuildReconcile::Disabled) => report.disabled += 1,
                Ok(GuildReconcile::Skipped) => report.skipped += 1,
                Err(e) => {
                    report.errors += 1;

                    match &e {
                        SyncError::Platform(p) if p.disables_surface() => {
                            warn!("Disabling status surface of guild {guild}: {e}");

                            match self.store.disable(*guild).await {
                                Ok(()) => report.disabled += 1,
                                Err(e) => error!("Failed to disable surface of guild {guild}: {e}")
                            }
                        },
                        _ => error!("Failed to reconcile status message of guild {guild}: {e}")
                    }
                }
            }
        }

        info!(
            "Status messages reconciled: {} reset, {} republished, {} disabled, {} skipped, {} errors",
            report.reset,
            report.republished,
            report.disabled,
            report.skipped,
            report.errors
        );

        report
    }

    async fn reconcile_guild(&self, guild: GuildId, record: &GuildRecord) -> SyncResult<GuildReconcile> {
        if !self.platform.guild_available(guild).await {
            info!("No longer in guild {guild}, disabling its status surface");
            self.store.disable(guild).await?;
            return Ok(GuildReconcile::Disabled);
        }

        let Some((channel, message)) = record.surface.embed() else {
            self.store.disable(guild).await?;
            return Ok(GuildReconcile::Disabled);
        };

        match self.platform.fetch_channel(channel).await {
            Ok(_) => {},
            Err(e) if e.kind() == ErrorKind::ResourceMissing => {
                info!("Status channel of guild {guild} not found, disabling its status surface");
                self.store.disable(guild).await?;
                return Ok(GuildReconcile::Disabled);
            },
            Err(e) => return Err(e.into())
        }

        let required = [Capability::SendMessages, Capability::EmbedLinks];
        if !self.platform.has_permissions(guild, channel, &required).await {
            warn!("Missing permissions for the status message in guild {guild}, skipping");
            return Ok(GuildReconcile::Skipped);
        }

        if !self.platform.message_exists(channel, message).await? {
            info!("Status message of guild {guild} not found, publishing a new one");

            return match self.publish(channel, guild).await {
                Some(_) => Ok(GuildReconcile::Republished),
                None => Err(PlatformError::Unavailable.into())
            };
        }

        match self.update(guild, None).await? {
            UpdateOutcome::Disabled => Ok(GuildReconcile::Disabled),
            UpdateOutcome::Recreated(_) => Ok(GuildReconcile::Republished),
            _ => Ok(GuildReconcile::Reset)
        }
    }
}
