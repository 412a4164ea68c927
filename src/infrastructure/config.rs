use crate::application::map_viewport::ViewportSettings;
use crate::domain::viewport::{FitSettings, ScreenSize};
use crate::domain::well::GeoPoint;
use anyhow::Context;
use chrono::format::{Item, StrftimeItems};
use chrono::{FixedOffset, Local, Offset};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub map: MapSettings,
    #[serde(default)]
    pub icons: IconSettings,
    #[serde(default)]
    pub chart: ChartSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_wells_path")]
    pub wells_path: String,
    #[serde(default = "default_channels_path")]
    pub channels_path: String,
    #[serde(default = "default_readings_path")]
    pub readings_path: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            wells_path: default_wells_path(),
            channels_path: default_channels_path(),
            readings_path: default_readings_path(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapSettings {
    pub default_lat: f64,
    pub default_lng: f64,
    pub default_zoom: f64,
    pub initial_zoom: f64,
    pub max_zoom: f64,
    pub fit_padding_px: f64,
    pub width_px: f64,
    pub height_px: f64,
    pub popup_date_format: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_lat: 0.0,
            default_lng: 0.0,
            default_zoom: 2.0,
            initial_zoom: 5.0,
            max_zoom: 19.0,
            fit_padding_px: 50.0,
            width_px: 1024.0,
            height_px: 600.0,
            popup_date_format: "%Y-%m-%d".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IconSettings {
    pub url_prefix: String,
    pub directory: Option<PathBuf>,
}

impl Default for IconSettings {
    fn default() -> Self {
        Self {
            url_prefix: "icons".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChartSettings {
    pub utc_offset_minutes: Option<i32>,
    pub line_color: String,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: None,
            line_color: "#5470c6".to_string(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_wells_path() -> String {
    "/api/wells/".to_string()
}

fn default_channels_path() -> String {
    "/api/channels/wells/${well_id}/channels".to_string()
}

fn default_readings_path() -> String {
    "/api/wells/${well_id}/channels/${channel_id}/data".to_string()
}

impl MapSettings {
    pub fn viewport_settings(&self) -> anyhow::Result<ViewportSettings> {
        let default_center = GeoPoint::new(self.default_lat, self.default_lng)
            .context("map.default_lat / map.default_lng out of range")?;
        if StrftimeItems::new(&self.popup_date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("map.popup_date_format is not a valid format: {}", self.popup_date_format);
        }
        Ok(ViewportSettings {
            fit: FitSettings {
                default_center,
                default_zoom: self.default_zoom,
                max_zoom: self.max_zoom,
                padding_px: self.fit_padding_px,
            },
            popup_date_format: self.popup_date_format.clone(),
        })
    }

    pub fn container_size(&self) -> ScreenSize {
        ScreenSize::new(self.width_px, self.height_px)
    }
}

impl ChartSettings {
    /// Configured display offset, or the host's local offset.
    pub fn display_offset(&self) -> anyhow::Result<FixedOffset> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .with_context(|| format!("chart.utc_offset_minutes out of range: {}", minutes)),
            None => Ok(Local::now().offset().fix()),
        }
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("WELLVIZ")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Replace `${name}` placeholders in a path template
pub fn expand_path(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path() {
        let mut vars = HashMap::new();
        vars.insert("well_id", "12".to_string());
        vars.insert("channel_id", "3".to_string());

        let result = expand_path(&default_readings_path(), &vars);

        assert_eq!(result, "/api/wells/12/channels/3/data");
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[api]\nbase_url = \"http://backend:8000\"\n[map]\nmax_zoom = 17.0\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let cfg: DashboardConfig = settings.try_deserialize().unwrap();

        assert_eq!(cfg.api.base_url, "http://backend:8000");
        assert_eq!(cfg.api.wells_path, "/api/wells/");
        assert_eq!(cfg.map.max_zoom, 17.0);
        assert_eq!(cfg.map.fit_padding_px, 50.0);
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert_eq!(cfg.icons.url_prefix, "icons");
    }

    #[test]
    fn test_display_offset_from_minutes() {
        let chart = ChartSettings {
            utc_offset_minutes: Some(-300),
            ..Default::default()
        };
        assert_eq!(chart.display_offset().unwrap().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_invalid_default_center_is_rejected() {
        let map = MapSettings {
            default_lat: 120.0,
            ..Default::default()
        };
        assert!(map.viewport_settings().is_err());
    }

    #[test]
    fn test_invalid_popup_date_format_is_rejected() {
        let map = MapSettings {
            popup_date_format: "%Y-%Q".to_string(),
            ..Default::default()
        };
        assert!(map.viewport_settings().is_err());

        let map = MapSettings {
            popup_date_format: "%d/%m/%Y".to_string(),
            ..Default::default()
        };
        assert_eq!(map.viewport_settings().unwrap().popup_date_format, "%d/%m/%Y");
    }
}
