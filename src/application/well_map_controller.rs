// Well map controller - bridges the well collection into the viewport
use crate::application::icon_resolver::GeoIconResolver;
use crate::application::map_viewport::{MapViewport, ViewportSettings, WellFilter};
use crate::application::surface::MapMount;
use crate::domain::error::Result;
use crate::domain::viewport::ViewFrame;
use crate::domain::well::{LiftType, Well, WellStatus};

/// Token for an in-flight well fetch; a newer one supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket(u64);

pub struct WellMapController<M: MapMount> {
    mount: M,
    icons: GeoIconResolver,
    settings: ViewportSettings,
    initial_zoom: f64,
    viewport: Option<MapViewport<M::Surface>>,
    // Held here only while no viewport is mounted
    pending: (Vec<Well>, WellFilter),
    refresh_generation: u64,
    // Newest refresh whose wells were applied; failed refreshes never advance it
    applied_generation: u64,
}

impl<M: MapMount> WellMapController<M> {
    pub fn new(mount: M, icons: GeoIconResolver, settings: ViewportSettings, initial_zoom: f64) -> Self {
        Self {
            mount,
            icons,
            settings,
            initial_zoom,
            viewport: None,
            pending: (Vec::new(), WellFilter::default()),
            refresh_generation: 0,
            applied_generation: 0,
        }
    }

    /// Initialize the map surface if needed, then render whatever is known.
    pub fn on_mount(&mut self) -> Result<()> {
        if self.viewport.is_some() {
            return Ok(());
        }

        let initial = ViewFrame::centered(self.settings.fit.default_center, self.initial_zoom);
        let surface = self.mount.mount_map(initial)?;
        let mut viewport = MapViewport::new(surface, self.icons.clone(), self.settings.clone(), initial);

        let (wells, filter) = std::mem::take(&mut self.pending);
        viewport.set_filter(filter);
        let rendered = viewport.load_collection(wells);
        tracing::info!("Map mounted with {} markers", rendered);

        self.viewport = Some(viewport);
        Ok(())
    }

    /// Single re-entry point after wells are created, edited or deleted.
    pub fn refresh(&mut self, wells: Vec<Well>) -> usize {
        match self.viewport.as_mut() {
            Some(viewport) => viewport.load_collection(wells),
            None => {
                self.pending.0 = wells;
                0
            }
        }
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.refresh_generation += 1;
        RefreshTicket(self.refresh_generation)
    }

    /// Apply a fetched collection unless a newer one has already been applied.
    /// A newer refresh that failed does not hold back an older one that succeeds.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, wells: Vec<Well>) -> Option<usize> {
        if ticket.0 <= self.applied_generation {
            tracing::warn!(
                "Discarding stale well list (refresh {}, applied {})",
                ticket.0, self.applied_generation
            );
            return None;
        }
        self.applied_generation = ticket.0;
        Some(self.refresh(wells))
    }

    pub fn filter_by_status(&mut self, status: Option<WellStatus>) -> usize {
        match self.viewport.as_mut() {
            Some(viewport) => viewport.filter_by_status(status),
            None => {
                self.pending.1.status = status;
                0
            }
        }
    }

    pub fn filter_by_lift_type(&mut self, lift_type: Option<LiftType>) -> usize {
        match self.viewport.as_mut() {
            Some(viewport) => viewport.filter_by_lift_type(lift_type),
            None => {
                self.pending.1.lift_type = lift_type;
                0
            }
        }
    }

    pub fn filter(&self) -> WellFilter {
        self.viewport.as_ref().map(|v| v.filter()).unwrap_or(self.pending.1)
    }

    pub fn viewport(&self) -> Option<&MapViewport<M::Surface>> {
        self.viewport.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.viewport.is_some()
    }

    /// Remove every marker and release the surface. Safe to call repeatedly.
    pub fn on_unmount(&mut self) {
        if let Some(viewport) = self.viewport.take() {
            self.pending = viewport.dismantle();
            tracing::info!("Map unmounted");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::viewport::{FitSettings, ScreenSize};
    use crate::domain::well::{sample_well, GeoPoint};
    use crate::infrastructure::scene::SceneMapMount;

    fn controller() -> WellMapController<SceneMapMount> {
        let settings = ViewportSettings {
            fit: FitSettings {
                default_center: GeoPoint { latitude: 0.0, longitude: 0.0 },
                default_zoom: 2.0,
                max_zoom: 19.0,
                padding_px: 50.0,
            },
            popup_date_format: "%Y-%m-%d".to_string(),
        };
        let mount = SceneMapMount::new(ScreenSize::new(800.0, 600.0));
        WellMapController::new(mount, GeoIconResolver::with_default_assets("icons"), settings, 5.0)
    }

    #[test]
    fn test_mount_with_no_wells_centers_on_default() {
        let mut c = controller();
        c.on_mount().unwrap();
        let vp = c.viewport().unwrap();
        assert_eq!(vp.marker_count(), 0);
        assert_eq!(vp.frame().zoom, 2.0);
        assert_eq!(vp.surface().view().zoom, 2.0);
    }

    #[test]
    fn test_wells_before_mount_render_on_mount() {
        let mut c = controller();
        assert_eq!(c.refresh(vec![sample_well(1, 10.0, 20.0, WellStatus::Active)]), 0);
        c.filter_by_status(Some(WellStatus::Inactive));
        c.on_mount().unwrap();

        let vp = c.viewport().unwrap();
        assert_eq!(vp.collection().len(), 1);
        assert_eq!(vp.marker_count(), 0);
        assert_eq!(c.filter().status, Some(WellStatus::Inactive));
    }

    #[test]
    fn test_second_mount_does_not_reinitialize() {
        let mut c = controller();
        c.on_mount().unwrap();
        c.on_mount().unwrap();
        assert_eq!(c.viewport().unwrap().surface().marker_count(), 0);
    }

    #[test]
    fn test_refresh_rebuilds_markers() {
        let mut c = controller();
        c.on_mount().unwrap();
        let wells = vec![
            sample_well(1, 10.0, 20.0, WellStatus::Active),
            sample_well(2, -5.0, 30.0, WellStatus::Abandoned),
        ];
        assert_eq!(c.refresh(wells.clone()), 2);
        assert_eq!(c.refresh(wells[1..].to_vec()), 1);
        assert_eq!(c.viewport().unwrap().surface().marker_count(), 1);
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut c = controller();
        c.on_mount().unwrap();
        let older = c.begin_refresh();
        let newer = c.begin_refresh();

        assert_eq!(c.complete_refresh(newer, vec![sample_well(1, 1.0, 1.0, WellStatus::Active)]), Some(1));
        assert_eq!(c.complete_refresh(older, Vec::new()), None);
        assert_eq!(c.viewport().unwrap().marker_count(), 1);
    }

    #[test]
    fn test_older_refresh_applies_when_newer_one_failed() {
        let mut c = controller();
        c.on_mount().unwrap();
        let older = c.begin_refresh();
        let _failed = c.begin_refresh();

        let wells = vec![
            sample_well(1, 1.0, 1.0, WellStatus::Active),
            sample_well(2, 2.0, 2.0, WellStatus::Active),
        ];
        assert_eq!(c.complete_refresh(older, wells), Some(2));
        assert_eq!(c.viewport().unwrap().marker_count(), 2);
    }

    #[test]
    fn test_unmount_is_idempotent_and_keeps_collection() {
        let mut c = controller();
        c.on_mount().unwrap();
        c.refresh(vec![sample_well(1, 1.0, 1.0, WellStatus::Active)]);
        c.on_unmount();
        c.on_unmount();
        assert!(!c.is_mounted());

        c.on_mount().unwrap();
        assert_eq!(c.viewport().unwrap().marker_count(), 1);
    }
}
