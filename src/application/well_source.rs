// Source trait for well and channel data owned by the CRUD backend
use crate::domain::channel::{Channel, ChannelReading};
use crate::domain::well::WellRecord;
use async_trait::async_trait;

#[async_trait]
pub trait WellSource: Send + Sync {
    /// List every well as raw records; validation happens in the caller
    async fn list_wells(&self) -> anyhow::Result<Vec<WellRecord>>;

    /// List the channels owned by a well
    async fn list_channels(&self, well_id: i64) -> anyhow::Result<Vec<Channel>>;

    /// Fetch a channel's readings, ordered by time
    async fn fetch_readings(
        &self,
        well_id: i64,
        channel_id: i64,
    ) -> anyhow::Result<Vec<ChannelReading>>;
}
