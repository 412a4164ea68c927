// Application state for HTTP handlers
use crate::application::map_service::MapService;
use crate::application::selection_service::ChannelSelectionService;
use crate::infrastructure::scene::{SceneChartMount, SceneMapMount};

#[derive(Clone)]
pub struct AppState {
    pub map_service: MapService<SceneMapMount>,
    pub selection_service: ChannelSelectionService<SceneChartMount>,
}
