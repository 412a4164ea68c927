// HTTP well source backed by the CRUD backend's JSON API
use crate::application::well_source::WellSource;
use crate::domain::channel::{Channel, ChannelReading, ChannelRecord};
use crate::domain::well::WellRecord;
use crate::infrastructure::config::{expand_path, ApiSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HttpWellSource {
    client: reqwest::Client,
    base_url: String,
    wells_path: String,
    channels_path: String,
    readings_path: String,
}

impl HttpWellSource {
    pub fn new(settings: &ApiSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            wells_path: settings.wells_path.clone(),
            channels_path: settings.channels_path.clone(),
            readings_path: settings.readings_path.clone(),
        }
    }

    fn build_url(&self, template: &str, well_id: Option<i64>, channel_id: Option<i64>) -> String {
        let mut vars = HashMap::new();
        if let Some(id) = well_id {
            vars.insert("well_id", id.to_string());
        }
        if let Some(id) = channel_id {
            vars.insert("channel_id", id.to_string());
        }
        format!("{}{}", self.base_url, expand_path(template, &vars))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend request {} failed with status {}: {}", url, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl WellSource for HttpWellSource {
    async fn list_wells(&self) -> Result<Vec<WellRecord>> {
        let url = self.build_url(&self.wells_path, None, None);
        let records: Vec<WellRecord> = self.get_json(&url).await?;
        tracing::debug!("Fetched {} well records", records.len());
        Ok(records)
    }

    async fn list_channels(&self, well_id: i64) -> Result<Vec<Channel>> {
        let url = self.build_url(&self.channels_path, Some(well_id), None);
        let records: Vec<ChannelRecord> = self.get_json(&url).await?;

        let mut channels = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id;
            match Channel::try_from(record) {
                Ok(channel) => channels.push(channel),
                Err(e) => tracing::error!("Rejected channel record {}: {}", id, e),
            }
        }
        Ok(channels)
    }

    async fn fetch_readings(&self, well_id: i64, channel_id: i64) -> Result<Vec<ChannelReading>> {
        let url = self.build_url(&self.readings_path, Some(well_id), Some(channel_id));
        let readings: Vec<ChannelReading> = self.get_json(&url).await?;
        tracing::debug!(
            "Fetched {} readings for well {} channel {}",
            readings.len(),
            well_id,
            channel_id
        );
        Ok(readings)
    }
}
