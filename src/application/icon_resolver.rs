// Marker iconography for (lift type, status) pairs
use crate::domain::marker::{MarkerIcon, MarkerVisual, PixelPoint};
use crate::domain::well::{LiftType, WellStatus};
use std::collections::HashMap;

const ASSET_SIZE: PixelPoint = PixelPoint::new(32, 32);
const ASSET_ANCHOR: PixelPoint = PixelPoint::new(16, 32);
const ASSET_POPUP_ANCHOR: PixelPoint = PixelPoint::new(0, -32);

const FALLBACK_SIZE: PixelPoint = PixelPoint::new(30, 30);
const FALLBACK_ANCHOR: PixelPoint = PixelPoint::new(15, 30);
const FALLBACK_POPUP_ANCHOR: PixelPoint = PixelPoint::new(0, -30);

pub type IconKey = (LiftType, WellStatus);

#[derive(Debug, Clone, Default)]
pub struct GeoIconResolver {
    assets: HashMap<IconKey, String>,
}

impl GeoIconResolver {
    pub fn new(assets: HashMap<IconKey, String>) -> Self {
        Self { assets }
    }

    /// Resolver that registers every pair under `<prefix>/<code>-<status>.svg`.
    pub fn with_default_assets(url_prefix: &str) -> Self {
        let assets = all_keys()
            .map(|key| (key, asset_url(url_prefix, key)))
            .collect();
        Self { assets }
    }

    pub fn registered(&self) -> usize {
        self.assets.len()
    }

    pub fn resolve(&self, lift_type: LiftType, status: WellStatus) -> MarkerVisual {
        match self.assets.get(&(lift_type, status)) {
            Some(url) => MarkerVisual {
                icon: MarkerIcon::Asset { url: url.clone() },
                size: ASSET_SIZE,
                anchor: ASSET_ANCHOR,
                popup_anchor: ASSET_POPUP_ANCHOR,
            },
            None => {
                tracing::warn!(
                    "No icon registered for {} / {}, using fallback marker",
                    lift_type, status
                );
                Self::fallback(lift_type, status)
            }
        }
    }

    pub fn fallback(lift_type: LiftType, status: WellStatus) -> MarkerVisual {
        let label = lift_type.code().chars().next().unwrap_or('?');
        MarkerVisual {
            icon: MarkerIcon::Fallback {
                color: status_color(status),
                label,
            },
            size: FALLBACK_SIZE,
            anchor: FALLBACK_ANCHOR,
            popup_anchor: FALLBACK_POPUP_ANCHOR,
        }
    }
}

pub fn status_color(status: WellStatus) -> &'static str {
    match status {
        WellStatus::Active => "#22c55e",
        WellStatus::Inactive => "#f59e0b",
        WellStatus::Abandoned => "#ef4444",
    }
}

pub fn all_keys() -> impl Iterator<Item = IconKey> {
    LiftType::ALL
        .into_iter()
        .flat_map(|lift| WellStatus::ALL.into_iter().map(move |status| (lift, status)))
}

/// File name an icon asset is expected under, e.g. `esp-abandoned.svg`.
pub fn asset_file_name((lift_type, status): IconKey) -> String {
    format!(
        "{}-{}.svg",
        lift_type.code().to_ascii_lowercase(),
        status.label().to_ascii_lowercase()
    )
}

pub fn asset_url(url_prefix: &str, key: IconKey) -> String {
    format!("{}/{}", url_prefix.trim_end_matches('/'), asset_file_name(key))
}
