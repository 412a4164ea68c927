// Channel chart controller - owns one chart instance and its resize watch
use crate::application::surface::{ChartMount, ChartSurface, ResizeSource};
use crate::application::time_series_binder::TimeSeriesBinder;
use crate::domain::channel::{Channel, ChannelReading};
use crate::domain::chart::TooltipTable;
use crate::domain::error::{Result, VizError};
use serde::Serialize;

/// Issued when a selection starts; only the newest ticket may bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    pub well_id: i64,
    pub channel_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BindOutcome {
    Bound { points: usize },
    /// A newer selection superseded this one; its data was dropped.
    Stale,
}

/// What the chart currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundChart {
    pub channel: Channel,
    pub readings: Vec<ChannelReading>,
    pub tooltips: TooltipTable,
}

pub struct ChannelChartController<M: ChartMount> {
    mount: M,
    chart: Option<M::Surface>,
    resize_watch: Option<ResizeSource>,
    binder: TimeSeriesBinder,
    generation: u64,
    // Generation whose channel is in `selected`; lags `generation` while a
    // reserved selection is still resolving its channel
    attached: u64,
    selected: Option<Channel>,
    bound: Option<BoundChart>,
    torn_down: bool,
}

impl<M: ChartMount> ChannelChartController<M> {
    pub fn new(mount: M, binder: TimeSeriesBinder) -> Self {
        Self {
            mount,
            chart: None,
            resize_watch: None,
            binder,
            generation: 0,
            attached: 0,
            selected: None,
            bound: None,
            torn_down: false,
        }
    }

    /// Start watching the container for size changes.
    pub fn on_mount(&mut self) {
        if self.torn_down || self.resize_watch.is_some() {
            return;
        }
        let source = if self.mount.resize_observer_supported() {
            ResizeSource::ContainerObserver
        } else {
            tracing::debug!("Resize observer unavailable, listening for window resize");
            ResizeSource::WindowEvents
        };
        self.mount.watch_resize(source);
        self.resize_watch = Some(source);
    }

    /// Record a new selection. `None` clears the chart but keeps the instance.
    pub fn begin_selection(&mut self, channel: Option<Channel>) -> Option<SelectionTicket> {
        match channel {
            Some(channel) => {
                let ticket = self.reserve_selection(channel.well_id, channel.id)?;
                self.attach_channel(&ticket, channel);
                Some(ticket)
            }
            None => {
                if self.torn_down {
                    tracing::warn!("Selection ignored: chart has been torn down");
                    return None;
                }
                self.generation += 1;
                self.attached = self.generation;
                self.selected = None;
                self.clear();
                None
            }
        }
    }

    /// Claim the next generation for a selection whose channel is not known
    /// yet. Any older ticket is superseded from this point on.
    pub fn reserve_selection(&mut self, well_id: i64, channel_id: i64) -> Option<SelectionTicket> {
        if self.torn_down {
            tracing::warn!("Selection ignored: chart has been torn down");
            return None;
        }
        self.generation += 1;
        Some(SelectionTicket {
            generation: self.generation,
            well_id,
            channel_id,
        })
    }

    /// Make `channel` the selection for a reserved ticket. Returns false when
    /// a newer selection has been requested meanwhile.
    pub fn attach_channel(&mut self, ticket: &SelectionTicket, channel: Channel) -> bool {
        if !self.is_current(ticket) {
            tracing::warn!("Dropping superseded selection of channel {}", channel.id);
            return false;
        }
        self.attached = ticket.generation;
        self.selected = Some(channel);
        true
    }

    /// Give up a reserved selection whose channel could not be resolved. The
    /// previous selection stays.
    pub fn abandon_selection(&mut self, ticket: &SelectionTicket) {
        if self.is_current(ticket) {
            self.attached = ticket.generation;
        }
    }

    /// Select `channel` only when nothing is selected or being selected.
    pub fn auto_select(&mut self, channel: Channel) -> Option<SelectionTicket> {
        if self.selected.is_some() || self.selection_pending() {
            return None;
        }
        self.begin_selection(Some(channel))
    }

    pub fn is_current(&self, ticket: &SelectionTicket) -> bool {
        !self.torn_down && ticket.generation == self.generation
    }

    /// A reserved selection is still waiting for its channel.
    pub fn selection_pending(&self) -> bool {
        self.attached != self.generation
    }

    /// Apply the result of the fetch issued for `ticket`.
    ///
    /// Results for superseded tickets are dropped. A failed fetch leaves the
    /// chart showing whatever it showed before.
    pub fn complete_selection(
        &mut self,
        ticket: SelectionTicket,
        result: Result<Vec<ChannelReading>>,
    ) -> Result<BindOutcome> {
        if !self.is_current(&ticket) {
            tracing::warn!(
                "Discarding stale readings for channel {} (generation {} < {})",
                ticket.channel_id, ticket.generation, self.generation
            );
            return Ok(BindOutcome::Stale);
        }

        let readings = result.inspect_err(|e| {
            tracing::error!("Error loading data for channel {}: {}", ticket.channel_id, e);
        })?;

        let Some(channel) = self.selected.clone() else {
            return Ok(BindOutcome::Stale);
        };
        self.bind(channel, readings)
    }

    /// Bind readings to the chart, creating the instance on first use.
    pub fn bind(&mut self, channel: Channel, readings: Vec<ChannelReading>) -> Result<BindOutcome> {
        if self.torn_down {
            return Err(VizError::MountFailed("chart view has been destroyed".to_string()));
        }

        if self.chart.is_none() {
            self.chart = Some(self.mount.init_chart()?);
        }

        let binding = self.binder.bind(&channel.name, &readings);
        if let Some(chart) = self.chart.as_mut() {
            chart.set_option(&binding.option);
            chart.resize();
        }

        let points = readings.len();
        tracing::debug!("Bound {} readings for channel {}", points, channel.id);
        self.bound = Some(BoundChart {
            channel,
            readings,
            tooltips: binding.tooltips,
        });
        Ok(BindOutcome::Bound { points })
    }

    fn clear(&mut self) {
        if let Some(chart) = self.chart.as_mut() {
            chart.clear();
        }
        self.bound = None;
    }

    /// The channel was removed upstream. Clears the selection when it was the
    /// selected one, and the chart when it is the one on display.
    pub fn channel_removed(&mut self, channel_id: i64) -> bool {
        if self.selected.as_ref().is_some_and(|c| c.id == channel_id) {
            self.begin_selection(None);
            true
        } else if self.bound.as_ref().is_some_and(|b| b.channel.id == channel_id) {
            self.clear();
            true
        } else {
            false
        }
    }

    /// Container size changed. Returns whether a layout pass ran.
    pub fn on_container_resized(&mut self) -> bool {
        self.relayout(ResizeSource::ContainerObserver)
    }

    /// Window size changed. Only acted on when the observer is unavailable.
    pub fn on_window_resized(&mut self) -> bool {
        self.relayout(ResizeSource::WindowEvents)
    }

    fn relayout(&mut self, source: ResizeSource) -> bool {
        if self.resize_watch != Some(source) {
            return false;
        }
        match self.chart.as_mut() {
            Some(chart) => {
                chart.resize();
                true
            }
            None => false,
        }
    }

    /// Tooltip for the hovered point, by series index.
    pub fn tooltip(&self, index: usize) -> Option<&str> {
        self.bound.as_ref().and_then(|b| b.tooltips.get(index))
    }

    pub fn selected(&self) -> Option<&Channel> {
        self.selected.as_ref()
    }

    pub fn bound(&self) -> Option<&BoundChart> {
        self.bound.as_ref()
    }

    pub fn chart(&self) -> Option<&M::Surface> {
        self.chart.as_ref()
    }

    pub fn resize_watch(&self) -> Option<ResizeSource> {
        self.resize_watch
    }

    pub fn mount(&self) -> &M {
        &self.mount
    }

    /// Dispose the chart and stop resize notifications. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if let Some(mut chart) = self.chart.take() {
            chart.dispose();
        }
        if let Some(source) = self.resize_watch.take() {
            self.mount.unwatch_resize(source);
        }
        self.bound = None;
        self.selected = None;
        self.torn_down = true;
    }
}

impl<M: ChartMount> Drop for ChannelChartController<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::scene::SceneChartMount;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn controller(observer: bool) -> ChannelChartController<SceneChartMount> {
        let binder = TimeSeriesBinder::new(FixedOffset::east_opt(0).unwrap(), "#5470c6");
        let mut c = ChannelChartController::new(SceneChartMount::new(observer), binder);
        c.on_mount();
        c
    }

    fn channel(id: i64, name: &str) -> Channel {
        Channel {
            id,
            well_id: 1,
            name: name.to_string(),
            date_from: None,
            date_to: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn readings(values: &[f64]) -> Vec<ChannelReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, i as u32, 0).unwrap();
                ChannelReading::new(t, *v)
            })
            .collect()
    }

    #[test]
    fn test_bind_creates_chart_once_and_replaces_option() {
        let mut c = controller(true);
        c.bind(channel(1, "A"), readings(&[1.0, 2.0])).unwrap();
        c.bind(channel(2, "B"), readings(&[3.0])).unwrap();

        let chart = c.chart().unwrap();
        assert_eq!(c.mount().charts_created(), 1);
        assert_eq!(chart.set_option_calls(), 2);
        assert_eq!(chart.series_values(), Some(vec![3.0]));
        assert_eq!(chart.title().as_deref(), Some("B - Time Series Data"));
    }

    #[test]
    fn test_stale_selection_does_not_overwrite_newer() {
        let mut c = controller(true);
        let ticket_a = c.begin_selection(Some(channel(1, "A"))).unwrap();
        let ticket_b = c.begin_selection(Some(channel(2, "B"))).unwrap();

        let outcome_b = c.complete_selection(ticket_b, Ok(readings(&[20.0, 21.0]))).unwrap();
        assert_eq!(outcome_b, BindOutcome::Bound { points: 2 });

        let outcome_a = c.complete_selection(ticket_a, Ok(readings(&[10.0]))).unwrap();
        assert_eq!(outcome_a, BindOutcome::Stale);

        assert_eq!(c.bound().unwrap().channel.name, "B");
        assert_eq!(c.chart().unwrap().series_values(), Some(vec![20.0, 21.0]));
    }

    #[test]
    fn test_failed_fetch_keeps_previous_chart() {
        let mut c = controller(true);
        let ticket = c.begin_selection(Some(channel(1, "A"))).unwrap();
        c.complete_selection(ticket, Ok(readings(&[5.0]))).unwrap();

        let ticket = c.begin_selection(Some(channel(2, "B"))).unwrap();
        let err = c
            .complete_selection(ticket, Err(VizError::FetchFailed("timeout".to_string())))
            .unwrap_err();
        assert_eq!(err, VizError::FetchFailed("timeout".to_string()));
        assert_eq!(c.chart().unwrap().series_values(), Some(vec![5.0]));
        assert_eq!(c.bound().unwrap().channel.name, "A");
    }

    #[test]
    fn test_null_selection_clears_but_keeps_instance() {
        let mut c = controller(true);
        let ticket = c.begin_selection(Some(channel(1, "A"))).unwrap();
        c.complete_selection(ticket, Ok(readings(&[1.0]))).unwrap();

        assert!(c.begin_selection(None).is_none());
        let chart = c.chart().unwrap();
        assert!(chart.is_cleared());
        assert!(!chart.is_disposed());
        assert!(c.bound().is_none());

        let ticket = c.begin_selection(Some(channel(2, "B"))).unwrap();
        c.complete_selection(ticket, Ok(readings(&[2.0]))).unwrap();
        assert_eq!(c.mount().charts_created(), 1);
    }

    #[test]
    fn test_null_selection_invalidates_in_flight_fetch() {
        let mut c = controller(true);
        let ticket = c.begin_selection(Some(channel(1, "A"))).unwrap();
        c.begin_selection(None);
        assert_eq!(
            c.complete_selection(ticket, Ok(readings(&[1.0]))).unwrap(),
            BindOutcome::Stale
        );
        assert!(c.chart().is_none());
    }

    #[test]
    fn test_resize_relayouts_once_without_touching_data() {
        let mut c = controller(true);
        c.bind(channel(1, "A"), readings(&[1.0, 2.0])).unwrap();
        let before = c.chart().unwrap().resize_calls();

        assert!(c.on_container_resized());
        let chart = c.chart().unwrap();
        assert_eq!(chart.resize_calls(), before + 1);
        assert_eq!(chart.set_option_calls(), 1);
        assert_eq!(chart.series_values(), Some(vec![1.0, 2.0]));

        // Window events are ignored while the observer is active
        assert!(!c.on_window_resized());
        assert_eq!(c.chart().unwrap().resize_calls(), before + 1);
    }

    #[test]
    fn test_window_fallback_when_observer_unsupported() {
        let mut c = controller(false);
        assert_eq!(c.resize_watch(), Some(ResizeSource::WindowEvents));
        c.bind(channel(1, "A"), readings(&[1.0])).unwrap();
        let before = c.chart().unwrap().resize_calls();

        assert!(c.on_window_resized());
        assert!(!c.on_container_resized());
        assert_eq!(c.chart().unwrap().resize_calls(), before + 1);
    }

    #[test]
    fn test_resize_before_bind_is_noop() {
        let mut c = controller(true);
        assert!(!c.on_container_resized());
    }

    #[test]
    fn test_channel_removed_clears_only_selected() {
        let mut c = controller(true);
        let ticket = c.begin_selection(Some(channel(1, "A"))).unwrap();
        c.complete_selection(ticket, Ok(readings(&[1.0]))).unwrap();

        assert!(!c.channel_removed(99));
        assert!(c.bound().is_some());
        assert!(c.channel_removed(1));
        assert!(c.selected().is_none());
        assert!(c.chart().unwrap().is_cleared());
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut c = controller(true);
        c.bind(channel(1, "A"), readings(&[1.0])).unwrap();
        c.teardown();
        c.teardown();

        assert!(c.chart().is_none());
        assert_eq!(c.resize_watch(), None);
        assert_eq!(c.mount().disposed_charts(), 1);
        assert!(!c.mount().is_watching());
        assert!(c.begin_selection(Some(channel(2, "B"))).is_none());
    }

    #[test]
    fn test_teardown_before_init_does_not_panic() {
        let binder = TimeSeriesBinder::new(FixedOffset::east_opt(0).unwrap(), "#000");
        let mut c = ChannelChartController::new(SceneChartMount::new(true), binder);
        c.teardown();
        assert_eq!(c.mount().disposed_charts(), 0);
    }

    #[test]
    fn test_reserved_selection_is_superseded_before_attach() {
        let mut c = controller(true);
        let older = c.reserve_selection(1, 1).unwrap();
        let newer = c.reserve_selection(1, 2).unwrap();
        assert!(c.selection_pending());

        assert!(c.attach_channel(&newer, channel(2, "B")));
        assert!(!c.attach_channel(&older, channel(1, "A")));
        assert!(!c.selection_pending());
        assert_eq!(c.selected().unwrap().id, 2);

        c.complete_selection(newer, Ok(readings(&[4.0]))).unwrap();
        assert_eq!(
            c.complete_selection(older, Ok(readings(&[1.0]))).unwrap(),
            BindOutcome::Stale
        );
        assert_eq!(c.bound().unwrap().channel.name, "B");
    }

    #[test]
    fn test_auto_select_yields_to_existing_or_pending_selection() {
        let mut c = controller(true);
        let pending = c.reserve_selection(1, 7).unwrap();
        assert!(c.auto_select(channel(1, "A")).is_none());

        assert!(c.attach_channel(&pending, channel(7, "G")));
        assert!(c.auto_select(channel(1, "A")).is_none());
        assert_eq!(c.selected().unwrap().id, 7);

        c.begin_selection(None);
        let unresolved = c.reserve_selection(1, 99).unwrap();
        c.abandon_selection(&unresolved);
        assert!(!c.selection_pending());
        assert!(c.auto_select(channel(1, "A")).is_some());
        assert_eq!(c.selected().unwrap().id, 1);
    }

    #[test]
    fn test_removing_displayed_channel_after_failed_switch_clears_chart() {
        let mut c = controller(true);
        let ticket = c.begin_selection(Some(channel(1, "A"))).unwrap();
        c.complete_selection(ticket, Ok(readings(&[5.0]))).unwrap();

        let ticket = c.begin_selection(Some(channel(2, "B"))).unwrap();
        c.complete_selection(ticket, Err(VizError::FetchFailed("timeout".to_string())))
            .unwrap_err();
        assert_eq!(c.selected().unwrap().id, 2);

        assert!(c.channel_removed(1));
        assert!(c.bound().is_none());
        assert!(c.chart().unwrap().is_cleared());
        assert_eq!(c.selected().unwrap().id, 2);
    }
}
