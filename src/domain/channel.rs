// Channel and reading domain models
use super::error::{Result, VizError};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ChannelRecord")]
pub struct Channel {
    pub id: i64,
    pub well_id: i64,
    pub name: String,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRecord {
    pub id: i64,
    #[serde(alias = "wellId")]
    pub well_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "dateFrom", alias = "data_from")]
    pub date_from: Option<String>,
    #[serde(default, alias = "dateTo", alias = "data_to")]
    pub date_to: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

impl TryFrom<ChannelRecord> for Channel {
    type Error = VizError;

    fn try_from(record: ChannelRecord) -> Result<Self> {
        let parse = |s: Option<String>| s.as_deref().map(parse_timestamp).transpose();

        let channel = Channel {
            id: record.id,
            well_id: record.well_id,
            name: record.name,
            date_from: parse(record.date_from)?,
            date_to: parse(record.date_to)?,
            created_at: parse(record.created_at)?,
            updated_at: parse(record.updated_at)?,
        };

        if let (Some(from), Some(to)) = (channel.date_from, channel.date_to) {
            if from > to {
                return Err(VizError::InvertedWindow { channel_id: channel.id });
            }
        }

        Ok(channel)
    }
}

/// A single timestamped sample of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelReading {
    #[serde(deserialize_with = "deserialize_time")]
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl ChannelReading {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO date-time taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| VizError::InvalidTimestamp(s.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTime {
    Millis(i64),
    Text(String),
}

fn deserialize_time<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTime::deserialize(deserializer)? {
        RawTime::Millis(ms) => DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {}", ms))),
        RawTime::Text(s) => parse_timestamp(&s).map_err(serde::de::Error::custom),
    }
}
