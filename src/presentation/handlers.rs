// HTTP request handlers
use crate::application::chart_controller::BindOutcome;
use crate::application::map_service::RefreshReport;
use crate::application::map_viewport::WellFilter;
use crate::application::surface::ResizeSource;
use crate::domain::channel::Channel;
use crate::domain::error::VizError;
use crate::domain::well::{LiftType, WellStatus};
use crate::infrastructure::scene::{ChartScene, MapScene};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct ApiError(VizError);

impl From<VizError> for ApiError {
    fn from(e: VizError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            VizError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
            VizError::MountFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_invalid_record() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Serialize)]
pub struct MapView {
    pub mounted: bool,
    pub filter: WellFilter,
    pub scene: Option<MapScene>,
}

#[derive(Serialize)]
pub struct FilterResponse {
    pub rendered: usize,
    pub filter: WellFilter,
}

/// Absent parameter leaves that filter as is; an empty one clears it.
#[derive(Deserialize)]
pub struct FilterQuery {
    pub status: Option<String>,
    pub lift_type: Option<String>,
}

#[derive(Serialize)]
pub struct ChartView {
    pub selected: Option<Channel>,
    pub resize_source: Option<ResizeSource>,
    pub scene: Option<ChartScene>,
}

#[derive(Serialize)]
pub struct RelayoutResponse {
    pub relayout: bool,
}

#[derive(Serialize)]
pub struct RemovalResponse {
    pub cleared: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current map scene
pub async fn get_map(State(state): State<Arc<AppState>>) -> Json<MapView> {
    let controller = state.map_service.controller().lock().await;
    Json(MapView {
        mounted: controller.is_mounted(),
        filter: controller.filter(),
        scene: controller.viewport().map(|v| v.surface().snapshot()),
    })
}

/// Re-fetch wells and rebuild the map
pub async fn refresh_map(State(state): State<Arc<AppState>>) -> ApiResult<RefreshReport> {
    Ok(Json(state.map_service.refresh().await?))
}

/// Set or clear the status / lift type filters
pub async fn filter_map(
    Query(query): Query<FilterQuery>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<FilterResponse> {
    let status = parse_filter::<WellStatus>(query.status)?;
    let lift_type = parse_filter::<LiftType>(query.lift_type)?;

    let mut controller = state.map_service.controller().lock().await;
    let mut rendered = None;
    if let Some(status) = status {
        rendered = Some(controller.filter_by_status(status));
    }
    if let Some(lift_type) = lift_type {
        rendered = Some(controller.filter_by_lift_type(lift_type));
    }

    let rendered = rendered
        .or_else(|| controller.viewport().map(|v| v.marker_count()))
        .unwrap_or(0);
    Ok(Json(FilterResponse {
        rendered,
        filter: controller.filter(),
    }))
}

fn parse_filter<T>(raw: Option<String>) -> Result<Option<Option<T>>, VizError>
where
    T: std::str::FromStr<Err = VizError>,
{
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(Some(None)),
        Some(s) => s.parse().map(|v| Some(Some(v))),
    }
}

/// Load a well's channels, auto-selecting the first when nothing is selected
pub async fn list_channels(
    Path(well_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<Channel>> {
    Ok(Json(state.selection_service.load_channels(well_id).await?))
}

/// Select a channel and bind its readings to the chart
pub async fn select_channel(
    Path((well_id, channel_id)): Path<(i64, i64)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<BindOutcome> {
    Ok(Json(state.selection_service.select_by_id(well_id, channel_id).await?))
}

/// Clear the selection; the chart instance is kept
pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.selection_service.clear_selection().await;
    StatusCode::NO_CONTENT
}

/// A channel was deleted upstream
pub async fn channel_removed(
    Path(channel_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> Json<RemovalResponse> {
    let cleared = state.selection_service.channel_removed(channel_id).await;
    Json(RemovalResponse { cleared })
}

/// Current chart scene
pub async fn get_chart(State(state): State<Arc<AppState>>) -> Json<ChartView> {
    let controller = state.selection_service.controller().lock().await;
    Json(ChartView {
        selected: controller.selected().cloned(),
        resize_source: controller.resize_watch(),
        scene: controller.chart().map(|c| c.snapshot()),
    })
}

/// Tooltip text for the hovered point
pub async fn chart_tooltip(
    Path(index): Path<usize>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let controller = state.selection_service.controller().lock().await;
    match controller.tooltip(index) {
        Some(text) => text.to_string().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Container resize reported by the client's resize observer
pub async fn chart_resize(State(state): State<Arc<AppState>>) -> Json<RelayoutResponse> {
    let relayout = state.selection_service.controller().lock().await.on_container_resized();
    Json(RelayoutResponse { relayout })
}

/// Window resize reported by clients without a resize observer
pub async fn window_resize(State(state): State<Arc<AppState>>) -> Json<RelayoutResponse> {
    let relayout = state.selection_service.controller().lock().await.on_window_resized();
    Json(RelayoutResponse { relayout })
}
