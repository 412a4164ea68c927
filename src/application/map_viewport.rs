// Map viewport - owns the surface, the live marker set and the view frame
use crate::application::icon_resolver::GeoIconResolver;
use crate::application::surface::{MapSurface, MarkerHandle};
use crate::domain::marker::{MarkerSpec, WellPopup};
use crate::domain::viewport::{fit_frame, FitSettings, ViewFrame};
use crate::domain::well::{GeoPoint, LiftType, Well, WellStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSettings {
    pub fit: FitSettings,
    pub popup_date_format: String,
}

/// Active predicates; `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WellFilter {
    pub status: Option<WellStatus>,
    pub lift_type: Option<LiftType>,
}

impl WellFilter {
    pub fn matches(&self, well: &Well) -> bool {
        self.status.is_none_or(|s| s == well.status)
            && self.lift_type.is_none_or(|l| l == well.lift_type)
    }
}

pub struct MapViewport<S: MapSurface> {
    surface: S,
    icons: GeoIconResolver,
    settings: ViewportSettings,
    markers: Vec<MarkerHandle>,
    collection: Vec<Well>,
    filter: WellFilter,
    frame: ViewFrame,
}

impl<S: MapSurface> MapViewport<S> {
    pub fn new(surface: S, icons: GeoIconResolver, settings: ViewportSettings, frame: ViewFrame) -> Self {
        Self {
            surface,
            icons,
            settings,
            markers: Vec::new(),
            collection: Vec::new(),
            filter: WellFilter::default(),
            frame,
        }
    }

    /// Replace the marker set with exactly one marker per well.
    pub fn set_wells(&mut self, wells: &[Well]) -> usize {
        self.clear_markers();

        for well in wells {
            let spec = MarkerSpec {
                well_id: well.id,
                position: well.position,
                visual: self.icons.resolve(well.lift_type, well.status),
                popup: WellPopup::for_well(well, &self.settings.popup_date_format),
            };
            self.markers.push(self.surface.add_marker(spec));
        }

        tracing::debug!("Rendered {} well markers", self.markers.len());
        self.markers.len()
    }

    /// Frame the view around `wells`, or fall back to the default view when empty.
    pub fn fit_to_wells(&mut self, wells: &[Well]) -> ViewFrame {
        let points: Vec<GeoPoint> = wells.iter().map(|w| w.position).collect();
        let frame = fit_frame(&points, self.surface.container_size(), &self.settings.fit);

        tracing::debug!(
            "Fitted view to {} wells: center=({:.4}, {:.4}) zoom={}",
            points.len(),
            frame.center.latitude,
            frame.center.longitude,
            frame.zoom
        );

        self.surface.set_view(frame);
        self.frame = frame;
        frame
    }

    /// Store a new collection and render it through the active filter.
    pub fn load_collection(&mut self, wells: Vec<Well>) -> usize {
        self.collection = wells;
        self.render_filtered()
    }

    /// Replace the status predicate. An active lift type filter still applies,
    /// so `None` shows every well of that lift type rather than every well.
    pub fn filter_by_status(&mut self, status: Option<WellStatus>) -> usize {
        self.filter.status = status;
        self.render_filtered()
    }

    /// Replace the lift type predicate, keeping the status predicate.
    pub fn filter_by_lift_type(&mut self, lift_type: Option<LiftType>) -> usize {
        self.filter.lift_type = lift_type;
        self.render_filtered()
    }

    pub fn set_filter(&mut self, filter: WellFilter) -> usize {
        self.filter = filter;
        self.render_filtered()
    }

    fn render_filtered(&mut self) -> usize {
        let visible: Vec<Well> = self
            .collection
            .iter()
            .filter(|w| self.filter.matches(w))
            .cloned()
            .collect();
        let count = self.set_wells(&visible);
        self.fit_to_wells(&visible);
        count
    }

    pub fn clear_markers(&mut self) {
        for handle in self.markers.drain(..) {
            self.surface.remove_marker(handle);
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn frame(&self) -> ViewFrame {
        self.frame
    }

    pub fn filter(&self) -> WellFilter {
        self.filter
    }

    pub fn collection(&self) -> &[Well] {
        &self.collection
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Tear down every marker and hand back the collection and filter.
    pub fn dismantle(mut self) -> (Vec<Well>, WellFilter) {
        self.clear_markers();
        (std::mem::take(&mut self.collection), self.filter)
    }
}
