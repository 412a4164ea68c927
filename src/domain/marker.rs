// Map marker visuals derived from a well
use super::well::{GeoPoint, Well};
use serde::Serialize;

/// Pixel offset or size on the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Either a registered icon asset, or a shape synthesized when no asset exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerIcon {
    Asset { url: String },
    Fallback { color: &'static str, label: char },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerVisual {
    pub icon: MarkerIcon,
    pub size: PixelPoint,
    pub anchor: PixelPoint,
    pub popup_anchor: PixelPoint,
}

impl MarkerVisual {
    pub fn is_fallback(&self) -> bool {
        matches!(self.icon, MarkerIcon::Fallback { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupRow {
    pub label: &'static str,
    pub value: String,
}

/// Info popup attached to a well marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellPopup {
    pub title: String,
    pub rows: Vec<PopupRow>,
}

impl WellPopup {
    pub fn for_well(well: &Well, date_format: &str) -> Self {
        let installed = well
            .installation_date
            .map(|d| d.format(date_format).to_string())
            .unwrap_or_else(|| "Not specified".to_string());

        let row = |label, value: String| PopupRow { label, value };
        Self {
            title: well.name.clone(),
            rows: vec![
                row("ID", well.id.to_string()),
                row("Lift Type", well.lift_type.to_string()),
                row("Region", well.region.clone()),
                row("Status", well.status.to_string()),
                row("Depth", format!("{} meters", well.depth)),
                row("Installed", installed),
                row(
                    "Coordinates",
                    format!("{:.6}, {:.6}", well.position.latitude, well.position.longitude),
                ),
            ],
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows.iter().find(|r| r.label == label).map(|r| r.value.as_str())
    }

    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"well-popup\"><h3>{}</h3><dl>",
            escape_html(&self.title)
        );
        for row in &self.rows {
            html.push_str(&format!(
                "<dt>{}:</dt><dd>{}</dd>",
                row.label,
                escape_html(&row.value)
            ));
        }
        html.push_str("</dl></div>");
        html
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Everything a surface needs to draw one well.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub well_id: i64,
    pub position: GeoPoint,
    pub visual: MarkerVisual,
    pub popup: WellPopup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::well::{sample_well, WellStatus};
    use chrono::NaiveDate;

    #[test]
    fn test_popup_formats_coordinates_and_missing_date() {
        let well = sample_well(12, 10.0, -20.1234567, WellStatus::Active);
        let popup = WellPopup::for_well(&well, "%Y-%m-%d");

        assert_eq!(popup.title, "Well-12");
        assert_eq!(popup.value("Coordinates"), Some("10.000000, -20.123457"));
        assert_eq!(popup.value("Installed"), Some("Not specified"));
        assert_eq!(popup.value("Depth"), Some("1500 meters"));
        assert_eq!(popup.value("Lift Type"), Some("Gas Lift"));
    }

    #[test]
    fn test_popup_formats_installation_date() {
        let mut well = sample_well(1, 0.0, 0.0, WellStatus::Inactive);
        well.installation_date = NaiveDate::from_ymd_opt(2019, 11, 3);
        let popup = WellPopup::for_well(&well, "%d/%m/%Y");
        assert_eq!(popup.value("Installed"), Some("03/11/2019"));
    }

    #[test]
    fn test_popup_html_escapes_names() {
        let mut well = sample_well(1, 0.0, 0.0, WellStatus::Active);
        well.name = "A<B>".to_string();
        let html = WellPopup::for_well(&well, "%Y-%m-%d").to_html();
        assert!(html.contains("<h3>A&lt;B&gt;</h3>"));
        assert!(html.contains("<dt>Status:</dt><dd>Active</dd>"));
    }
}
