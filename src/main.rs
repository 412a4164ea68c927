// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::chart_controller::ChannelChartController;
use crate::application::map_service::MapService;
use crate::application::selection_service::ChannelSelectionService;
use crate::application::time_series_binder::TimeSeriesBinder;
use crate::application::well_map_controller::WellMapController;
use crate::application::well_source::WellSource;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::HttpWellSource;
use crate::infrastructure::icon_assets::load_icon_resolver;
use crate::infrastructure::scene::{SceneChartMount, SceneMapMount};
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    channel_removed, chart_resize, chart_tooltip, clear_selection, filter_map, get_chart, get_map,
    health_check, list_channels, refresh_map, select_channel, window_resize,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create well source (infrastructure layer)
    let source: Arc<dyn WellSource> = Arc::new(HttpWellSource::new(&config.api));

    // Create controllers; the browser client reports resizes through its own observer
    let mut map_controller = WellMapController::new(
        SceneMapMount::new(config.map.container_size()),
        load_icon_resolver(&config.icons),
        config.map.viewport_settings()?,
        config.map.initial_zoom,
    );
    map_controller.on_mount()?;

    let binder = TimeSeriesBinder::new(config.chart.display_offset()?, config.chart.line_color.clone());
    let mut chart_controller = ChannelChartController::new(SceneChartMount::new(true), binder);
    chart_controller.on_mount();

    // Create services (application layer)
    let map_service = MapService::new(source.clone(), Arc::new(Mutex::new(map_controller)));
    let selection_service =
        ChannelSelectionService::new(source.clone(), Arc::new(Mutex::new(chart_controller)));

    // Initial load; an unreachable backend leaves the default-centered map
    match map_service.refresh().await {
        Ok(report) => tracing::info!(
            "Loaded {} of {} wells ({} rejected)",
            report.rendered,
            report.received,
            report.rejected.len()
        ),
        Err(e) => tracing::warn!("Initial well load failed: {}", e),
    }

    // Create application state
    let state = Arc::new(AppState {
        map_service: map_service.clone(),
        selection_service: selection_service.clone(),
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/map", get(get_map))
        .route("/map/refresh", post(refresh_map))
        .route("/map/filter", post(filter_map))
        .route("/wells/:well_id/channels", get(list_channels))
        .route("/wells/:well_id/channels/:channel_id/select", post(select_channel))
        .route("/chart", get(get_chart))
        .route("/chart/selection", delete(clear_selection))
        .route("/chart/channel-removed/:channel_id", post(channel_removed))
        .route("/chart/tooltip/:index", get(chart_tooltip))
        .route("/chart/resize", post(chart_resize))
        .route("/chart/window-resize", post(window_resize))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting well-explorer-viz on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Release the chart, its resize watch and the map markers before exit
    selection_service.controller().lock().await.teardown();
    map_service.controller().lock().await.on_unmount();

    Ok(())
}
