// Rendering seams - controllers drive these, concrete renderers implement them
use crate::domain::chart::ChartOption;
use crate::domain::error::Result;
use crate::domain::marker::MarkerSpec;
use crate::domain::viewport::{ScreenSize, ViewFrame};
use serde::Serialize;

/// Identifies a marker previously added to a map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MarkerHandle(pub u64);

pub trait MapSurface: Send {
    /// Logical size of the map container, used for bounds fitting.
    fn container_size(&self) -> ScreenSize;

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerHandle;

    /// Removing an unknown handle is a no-op.
    fn remove_marker(&mut self, handle: MarkerHandle);

    fn set_view(&mut self, frame: ViewFrame);
}

/// Mount point that can bring a map surface into existence.
pub trait MapMount: Send {
    type Surface: MapSurface;

    fn mount_map(&mut self, initial: ViewFrame) -> Result<Self::Surface>;
}

pub trait ChartSurface: Send {
    /// Replace the whole option; nothing from the previous option survives.
    fn set_option(&mut self, option: &ChartOption);

    /// Drop the data but keep the instance usable.
    fn clear(&mut self);

    /// Recompute layout for the current container size. Data is untouched.
    fn resize(&mut self);

    /// Release the rendering context. Must tolerate repeated calls.
    fn dispose(&mut self);
}

/// How container size changes reach the chart controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeSource {
    ContainerObserver,
    WindowEvents,
}

/// Mount point hosting one chart and its resize notifications.
pub trait ChartMount: Send {
    type Surface: ChartSurface;

    fn init_chart(&mut self) -> Result<Self::Surface>;

    fn resize_observer_supported(&self) -> bool;

    /// Start delivering resize notifications through `source`.
    fn watch_resize(&mut self, source: ResizeSource);

    /// Stop delivering resize notifications. Must tolerate repeated calls.
    fn unwatch_resize(&mut self, source: ResizeSource);
}
