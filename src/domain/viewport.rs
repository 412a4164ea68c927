// Viewport framing math (spherical Web Mercator, 256px tiles)
use super::well::GeoPoint;
use serde::Serialize;
use std::f64::consts::PI;

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    /// Smallest box covering every point, `None` when there are none.
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (mut south, mut west, mut north, mut east) =
            (first.latitude, first.longitude, first.latitude, first.longitude);
        for p in points {
            south = south.min(p.latitude);
            north = north.max(p.latitude);
            west = west.min(p.longitude);
            east = east.max(p.longitude);
        }
        Some(Self {
            south_west: GeoPoint { latitude: south, longitude: west },
            north_east: GeoPoint { latitude: north, longitude: east },
        })
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south_west.latitude..=self.north_east.latitude).contains(&p.latitude)
            && (self.south_west.longitude..=self.north_east.longitude).contains(&p.longitude)
    }
}

/// What the map is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewFrame {
    pub center: GeoPoint,
    pub zoom: f64,
    /// Region the frame was fitted to; `None` for a plain centered view.
    pub fitted_bounds: Option<GeoBounds>,
    pub padding_px: f64,
}

impl ViewFrame {
    pub fn centered(center: GeoPoint, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            fitted_bounds: None,
            padding_px: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSettings {
    pub default_center: GeoPoint,
    pub default_zoom: f64,
    pub max_zoom: f64,
    pub padding_px: f64,
}

/// Frame covering `points` with `padding_px` on every side of a `size` container.
/// An empty set yields the default low-zoom centered view.
pub fn fit_frame(points: &[GeoPoint], size: ScreenSize, settings: &FitSettings) -> ViewFrame {
    let Some(bounds) = GeoBounds::covering(points.iter().copied()) else {
        return ViewFrame::centered(settings.default_center, settings.default_zoom);
    };

    let (x_west, y_north) = project(bounds.north_east.latitude, bounds.south_west.longitude);
    let (x_east, y_south) = project(bounds.south_west.latitude, bounds.north_east.longitude);
    let span_x = x_east - x_west;
    let span_y = y_south - y_north;

    let available_w = (size.width - 2.0 * settings.padding_px).max(1.0);
    let available_h = (size.height - 2.0 * settings.padding_px).max(1.0);

    let scale = match (span_x > 0.0, span_y > 0.0) {
        (false, false) => f64::INFINITY,
        (true, false) => available_w / span_x,
        (false, true) => available_h / span_y,
        (true, true) => (available_w / span_x).min(available_h / span_y),
    };
    let zoom = if scale.is_finite() {
        scale.log2().floor().clamp(0.0, settings.max_zoom)
    } else {
        settings.max_zoom
    };

    let center = unproject((x_west + x_east) / 2.0, (y_north + y_south) / 2.0);

    ViewFrame {
        center,
        zoom,
        fitted_bounds: Some(bounds),
        padding_px: settings.padding_px,
    }
}

/// Pixel coordinates at zoom 0.
fn project(latitude: f64, longitude: f64) -> (f64, f64) {
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = TILE_SIZE * (longitude + 180.0) / 360.0;
    let y = TILE_SIZE * (0.5 - (lat.tan() + 1.0 / lat.cos()).ln() / (2.0 * PI));
    (x, y)
}

fn unproject(x: f64, y: f64) -> GeoPoint {
    let longitude = x / TILE_SIZE * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / TILE_SIZE);
    let latitude = (2.0 * n.exp().atan() - PI / 2.0).to_degrees();
    GeoPoint { latitude, longitude }
}
