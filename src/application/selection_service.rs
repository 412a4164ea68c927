// Channel selection service - fetch-then-bind with stale result rejection
use crate::application::chart_controller::{BindOutcome, ChannelChartController, SelectionTicket};
use crate::application::surface::ChartMount;
use crate::application::well_source::WellSource;
use crate::domain::channel::Channel;
use crate::domain::error::{Result, VizError};
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ChannelSelectionService<M: ChartMount> {
    source: Arc<dyn WellSource>,
    controller: Arc<Mutex<ChannelChartController<M>>>,
}

impl<M: ChartMount> Clone for ChannelSelectionService<M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<M: ChartMount> ChannelSelectionService<M> {
    pub fn new(source: Arc<dyn WellSource>, controller: Arc<Mutex<ChannelChartController<M>>>) -> Self {
        Self { source, controller }
    }

    pub fn controller(&self) -> &Arc<Mutex<ChannelChartController<M>>> {
        &self.controller
    }

    /// Select a channel, fetch its readings and bind them if still current.
    /// The controller lock is not held while the fetch is in flight.
    pub async fn select_channel(&self, channel: Channel) -> Result<BindOutcome> {
        let Some(ticket) = self.controller.lock().await.begin_selection(Some(channel)) else {
            return Ok(BindOutcome::Stale);
        };
        self.fetch_and_bind(ticket).await
    }

    async fn fetch_and_bind(&self, ticket: SelectionTicket) -> Result<BindOutcome> {
        let result = self
            .source
            .fetch_readings(ticket.well_id, ticket.channel_id)
            .await
            .map_err(|e| VizError::FetchFailed(format!("{:#}", e)));

        self.controller.lock().await.complete_selection(ticket, result)
    }

    pub async fn clear_selection(&self) {
        self.controller.lock().await.begin_selection(None);
    }

    /// Load a well's channels; select the first one when nothing is selected
    /// or being selected once the list arrives.
    pub async fn load_channels(&self, well_id: i64) -> Result<Vec<Channel>> {
        let channels = self
            .source
            .list_channels(well_id)
            .await
            .map_err(|e| VizError::FetchFailed(format!("{:#}", e)))
            .inspect_err(|e| tracing::error!("Error loading channels for well {}: {}", well_id, e))?;

        let ticket = match channels.first() {
            Some(first) => self.controller.lock().await.auto_select(first.clone()),
            None => None,
        };
        if let Some(ticket) = ticket {
            let channel_id = ticket.channel_id;
            // A failed auto-select is logged; the channel list is still returned
            if let Err(e) = self.fetch_and_bind(ticket).await {
                tracing::warn!("Auto-select of channel {} failed: {}", channel_id, e);
            }
        }

        Ok(channels)
    }

    /// Look up a channel by id within a well, then select it. The selection's
    /// place in line is taken before the lookup, so a later request always wins.
    pub async fn select_by_id(&self, well_id: i64, channel_id: i64) -> Result<BindOutcome> {
        let Some(ticket) = self.controller.lock().await.reserve_selection(well_id, channel_id) else {
            return Ok(BindOutcome::Stale);
        };

        let lookup = self
            .source
            .list_channels(well_id)
            .await
            .map_err(|e| VizError::FetchFailed(format!("{:#}", e)))
            .and_then(|channels| {
                channels.into_iter().find(|c| c.id == channel_id).ok_or_else(|| {
                    VizError::FetchFailed(format!("channel {} not found for well {}", channel_id, well_id))
                })
            });

        {
            let mut controller = self.controller.lock().await;
            if !controller.is_current(&ticket) {
                tracing::warn!("Discarding superseded selection of channel {}", channel_id);
                return Ok(BindOutcome::Stale);
            }
            let channel = match lookup {
                Ok(channel) => channel,
                Err(e) => {
                    controller.abandon_selection(&ticket);
                    return Err(e);
                }
            };
            if !controller.attach_channel(&ticket, channel) {
                return Ok(BindOutcome::Stale);
            }
        }

        self.fetch_and_bind(ticket).await
    }

    pub async fn channel_removed(&self, channel_id: i64) -> bool {
        self.controller.lock().await.channel_removed(channel_id)
    }
}
