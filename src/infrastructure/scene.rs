// Retained in-memory scene: the rendering surfaces served to the browser client
use crate::application::surface::{
    ChartMount, ChartSurface, MapMount, MapSurface, MarkerHandle, ResizeSource,
};
use crate::domain::chart::ChartOption;
use crate::domain::error::{Result, VizError};
use crate::domain::marker::MarkerSpec;
use crate::domain::viewport::{ScreenSize, ViewFrame};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub struct SceneMap {
    size: ScreenSize,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
    next_handle: u64,
    view: ViewFrame,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneMarker {
    pub handle: MarkerHandle,
    #[serde(flatten)]
    pub marker: MarkerSpec,
    pub popup_html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapScene {
    pub size: ScreenSize,
    pub view: ViewFrame,
    pub markers: Vec<SceneMarker>,
}

impl SceneMap {
    pub fn new(size: ScreenSize, view: ViewFrame) -> Self {
        Self {
            size,
            markers: BTreeMap::new(),
            next_handle: 1,
            view,
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Markers in insertion order.
    pub fn markers(&self) -> Vec<MarkerSpec> {
        self.markers.values().cloned().collect()
    }

    pub fn view(&self) -> ViewFrame {
        self.view
    }

    pub fn snapshot(&self) -> MapScene {
        MapScene {
            size: self.size,
            view: self.view,
            markers: self
                .markers
                .iter()
                .map(|(handle, marker)| SceneMarker {
                    handle: *handle,
                    marker: marker.clone(),
                    popup_html: marker.popup.to_html(),
                })
                .collect(),
        }
    }
}

impl MapSurface for SceneMap {
    fn container_size(&self) -> ScreenSize {
        self.size
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(handle, marker);
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn set_view(&mut self, frame: ViewFrame) {
        self.view = frame;
    }
}

#[derive(Debug, Clone)]
pub struct SceneMapMount {
    size: ScreenSize,
}

impl SceneMapMount {
    pub fn new(size: ScreenSize) -> Self {
        Self { size }
    }
}

impl MapMount for SceneMapMount {
    type Surface = SceneMap;

    fn mount_map(&mut self, initial: ViewFrame) -> Result<SceneMap> {
        if !(self.size.width > 0.0 && self.size.height > 0.0) {
            return Err(VizError::MountFailed(format!(
                "map container has no area ({}x{})",
                self.size.width, self.size.height
            )));
        }
        Ok(SceneMap::new(self.size, initial))
    }
}

#[derive(Debug)]
pub struct SceneChart {
    option: Option<ChartOption>,
    set_option_calls: usize,
    resize_calls: usize,
    cleared: bool,
    disposed: bool,
    disposals: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartScene {
    pub option: Option<ChartOption>,
    pub cleared: bool,
    /// Bumped on every layout pass so the client knows to re-measure.
    pub layout_passes: usize,
}

impl SceneChart {
    pub fn set_option_calls(&self) -> usize {
        self.set_option_calls
    }

    pub fn resize_calls(&self) -> usize {
        self.resize_calls
    }

    pub fn is_cleared(&self) -> bool {
        self.cleared
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn series_values(&self) -> Option<Vec<f64>> {
        self.option
            .as_ref()
            .and_then(|o| o.series.first())
            .map(|s| s.data.clone())
    }

    pub fn title(&self) -> Option<String> {
        self.option.as_ref().map(|o| o.title.text.clone())
    }

    pub fn snapshot(&self) -> ChartScene {
        ChartScene {
            option: self.option.clone(),
            cleared: self.cleared,
            layout_passes: self.resize_calls,
        }
    }
}

impl ChartSurface for SceneChart {
    fn set_option(&mut self, option: &ChartOption) {
        self.option = Some(option.clone());
        self.cleared = false;
        self.set_option_calls += 1;
    }

    fn clear(&mut self) {
        self.option = None;
        self.cleared = true;
    }

    fn resize(&mut self) {
        self.resize_calls += 1;
    }

    fn dispose(&mut self) {
        if !self.disposed {
            self.disposed = true;
            self.option = None;
            self.disposals.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Debug)]
pub struct SceneChartMount {
    observer_supported: bool,
    watching: Option<ResizeSource>,
    charts_created: usize,
    disposals: Arc<AtomicUsize>,
}

impl SceneChartMount {
    pub fn new(observer_supported: bool) -> Self {
        Self {
            observer_supported,
            watching: None,
            charts_created: 0,
            disposals: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn charts_created(&self) -> usize {
        self.charts_created
    }

    pub fn disposed_charts(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    pub fn is_watching(&self) -> bool {
        self.watching.is_some()
    }
}

impl ChartMount for SceneChartMount {
    type Surface = SceneChart;

    fn init_chart(&mut self) -> Result<SceneChart> {
        self.charts_created += 1;
        Ok(SceneChart {
            option: None,
            set_option_calls: 0,
            resize_calls: 0,
            cleared: false,
            disposed: false,
            disposals: self.disposals.clone(),
        })
    }

    fn resize_observer_supported(&self) -> bool {
        self.observer_supported
    }

    fn watch_resize(&mut self, source: ResizeSource) {
        self.watching = Some(source);
    }

    fn unwatch_resize(&mut self, _source: ResizeSource) {
        self.watching = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::icon_resolver::GeoIconResolver;
    use crate::domain::marker::WellPopup;
    use crate::domain::well::{sample_well, GeoPoint, WellStatus};

    fn frame() -> ViewFrame {
        ViewFrame::centered(GeoPoint { latitude: 0.0, longitude: 0.0 }, 5.0)
    }

    #[test]
    fn test_zero_sized_container_fails_to_mount() {
        let mut mount = SceneMapMount::new(ScreenSize::new(0.0, 400.0));
        assert!(matches!(mount.mount_map(frame()), Err(VizError::MountFailed(_))));
    }

    #[test]
    fn test_snapshot_includes_popup_html() {
        let mut map = SceneMap::new(ScreenSize::new(640.0, 480.0), frame());
        let well = sample_well(5, 1.0, 2.0, WellStatus::Active);
        let handle = map.add_marker(MarkerSpec {
            well_id: well.id,
            position: well.position,
            visual: GeoIconResolver::fallback(well.lift_type, well.status),
            popup: WellPopup::for_well(&well, "%Y-%m-%d"),
        });

        let scene = map.snapshot();
        assert_eq!(scene.markers.len(), 1);
        assert_eq!(scene.markers[0].handle, handle);
        assert!(scene.markers[0].popup_html.contains("Well-5"));

        map.remove_marker(handle);
        map.remove_marker(handle);
        assert_eq!(map.marker_count(), 0);
    }

    #[test]
    fn test_dispose_counts_once() {
        let mut mount = SceneChartMount::new(true);
        let mut chart = mount.init_chart().unwrap();
        chart.dispose();
        chart.dispose();
        assert!(chart.is_disposed());
        assert_eq!(mount.disposed_charts(), 1);
    }
}
