use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::model::id::{ChannelId, GuildId, MessageId};
use crate::model::surface::GuildRecord;
use crate::platform::SurfaceStore;

/// Concurrent in-memory [`SurfaceStore`].
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<GuildId, GuildRecord>
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, guild: GuildId, record: GuildRecord) {
        self.records.insert(guild, record);
    }

    pub fn record(&self, guild: GuildId) -> Option<GuildRecord> {
        self.records.get(&guild).map(|r| r.value().clone())
    }
}

#[async_trait]
impl SurfaceStore for MemoryStore {
    async fn get(&self, guild: GuildId) -> Result<Option<GuildRecord>, StoreError> {
        Ok(self.record(guild))
    }

    async fn list_enabled(&self) -> Result<Vec<(GuildId, GuildRecord)>, StoreError> {
        let mut enabled = self.records.iter()
            .filter(|r| r.surface.enabled && r.surface.embed_message_id.is_some())
            .map(|r| (*r.key(), r.value().clone()))
            .collect::<Vec<_>>();

        enabled.sort_by_key(|(guild, _)| *guild);

        Ok(enabled)
    }

    async fn set_embed(&self, guild: GuildId, channel: ChannelId, message: MessageId) -> Result<(), StoreError> {
        let mut record = self.records.entry(guild).or_default();

        record.surface.embed_channel_id = Some(channel);
        record.surface.embed_message_id = Some(message);

        Ok(())
    }

    async fn disable(&self, guild: GuildId) -> Result<(), StoreError> {
        if let Some(mut record) = self.records.get_mut(&guild) {
            record.surface.enabled = false;
            record.surface.embed_message_id = None;
        }

        Ok(())
    }
}
