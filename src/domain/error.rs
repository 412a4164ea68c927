// Error types for the visualization core
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VizError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VizError {
    #[error("Well {well_id}: invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        well_id: i64,
        latitude: f64,
        longitude: f64,
    },

    #[error("Well {well_id}: depth must be a positive number, got {depth}")]
    InvalidDepth { well_id: i64, depth: f64 },

    #[error("Unknown lift type: {0}")]
    UnknownLiftType(String),

    #[error("Unknown well status: {0}")]
    UnknownStatus(String),

    #[error("Record {record_id}: missing required field '{field}'")]
    MissingField { record_id: i64, field: &'static str },

    #[error("Channel {channel_id}: date_from is after date_to")]
    InvertedWindow { channel_id: i64 },

    #[error("Unparseable timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Rendering surface could not be mounted: {0}")]
    MountFailed(String),
}

impl VizError {
    /// True for errors caused by bad input records rather than by an upstream or surface failure.
    pub fn is_invalid_record(&self) -> bool {
        !matches!(self, VizError::FetchFailed(_) | VizError::MountFailed(_))
    }
}
