// Well domain model
use super::channel::parse_timestamp;
use super::error::{Result, VizError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum LiftType {
    #[serde(rename = "Natural Flow")]
    NaturalFlow,
    #[serde(rename = "Gas Lift")]
    GasLift,
    #[serde(rename = "Electrical Submersible Pump")]
    ElectricalSubmersiblePump,
}

impl LiftType {
    pub const ALL: [LiftType; 3] = [
        LiftType::NaturalFlow,
        LiftType::GasLift,
        LiftType::ElectricalSubmersiblePump,
    ];

    /// Short code used for icon asset names and fallback marker labels.
    pub fn code(&self) -> &'static str {
        match self {
            LiftType::NaturalFlow => "NF",
            LiftType::GasLift => "GL",
            LiftType::ElectricalSubmersiblePump => "ESP",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LiftType::NaturalFlow => "Natural Flow",
            LiftType::GasLift => "Gas Lift",
            LiftType::ElectricalSubmersiblePump => "Electrical Submersible Pump",
        }
    }
}

impl fmt::Display for LiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LiftType {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "natural flow" | "nf" => Ok(LiftType::NaturalFlow),
            "gas lift" | "gl" => Ok(LiftType::GasLift),
            "electrical submersible pump" | "esp" => Ok(LiftType::ElectricalSubmersiblePump),
            _ => Err(VizError::UnknownLiftType(s.to_string())),
        }
    }
}

impl TryFrom<String> for LiftType {
    type Error = VizError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum WellStatus {
    Active,
    Inactive,
    Abandoned,
}

impl WellStatus {
    pub const ALL: [WellStatus; 3] = [WellStatus::Active, WellStatus::Inactive, WellStatus::Abandoned];

    pub fn label(&self) -> &'static str {
        match self {
            WellStatus::Active => "Active",
            WellStatus::Inactive => "Inactive",
            WellStatus::Abandoned => "Abandoned",
        }
    }
}

impl fmt::Display for WellStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WellStatus {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "active" => Ok(WellStatus::Active),
            "inactive" => Ok(WellStatus::Inactive),
            "abandoned" => Ok(WellStatus::Abandoned),
            _ => Err(VizError::UnknownStatus(s.to_string())),
        }
    }
}

impl TryFrom<String> for WellStatus {
    type Error = VizError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// "Gas_Lift", "gas-lift" and "GAS LIFT" all compare equal
fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c.to_ascii_lowercase() })
        .collect()
}

/// A validated geographic position. Both components are finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self { latitude, longitude })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WellRecord")]
pub struct Well {
    pub id: i64,
    pub name: String,
    pub lift_type: LiftType,
    pub region: String,
    #[serde(flatten)]
    pub position: GeoPoint,
    pub installation_date: Option<NaiveDate>,
    pub depth: f64,
    pub status: WellStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Well as it arrives from the upstream API, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WellRecord {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "liftType")]
    pub lift_type: Option<String>,
    #[serde(default)]
    pub region: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, alias = "installationDate")]
    pub installation_date: Option<String>,
    pub depth: Option<f64>,
    pub status: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

impl TryFrom<WellRecord> for Well {
    type Error = VizError;

    fn try_from(record: WellRecord) -> Result<Self> {
        let id = record.id;
        let missing = |field| VizError::MissingField { record_id: id, field };

        let latitude = record.latitude.ok_or_else(|| missing("latitude"))?;
        let longitude = record.longitude.ok_or_else(|| missing("longitude"))?;
        let position = GeoPoint::new(latitude, longitude).ok_or(VizError::InvalidCoordinates {
            well_id: id,
            latitude,
            longitude,
        })?;

        let depth = record.depth.ok_or_else(|| missing("depth"))?;
        if !(depth.is_finite() && depth > 0.0) {
            return Err(VizError::InvalidDepth { well_id: id, depth });
        }

        let lift_type = record.lift_type.ok_or_else(|| missing("lift_type"))?.parse::<LiftType>()?;
        let status = record.status.ok_or_else(|| missing("status"))?.parse::<WellStatus>()?;

        let installation_date = record
            .installation_date
            .as_deref()
            .map(parse_date)
            .transpose()?;
        let created_at = record.created_at.as_deref().map(parse_timestamp).transpose()?;
        let updated_at = record.updated_at.as_deref().map(parse_timestamp).transpose()?;

        Ok(Well {
            id,
            name: record.name,
            lift_type,
            region: record.region,
            position,
            installation_date,
            depth,
            status,
            created_at,
            updated_at,
        })
    }
}

/// Accepts a plain date or the date part of an ISO date-time.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let date_part = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d")
        .map_err(|_| VizError::InvalidTimestamp(s.to_string()))
}

#[cfg(test)]
pub(crate) fn sample_well(id: i64, latitude: f64, longitude: f64, status: WellStatus) -> Well {
    Well {
        id,
        name: format!("Well-{}", id),
        lift_type: LiftType::GasLift,
        region: "North".to_string(),
        position: GeoPoint::new(latitude, longitude).expect("valid test coordinates"),
        installation_date: None,
        depth: 1500.0,
        status,
        created_at: None,
        updated_at: None,
    }
}
