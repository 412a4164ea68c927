// Application layer - Controllers, services and the seams they drive
pub mod chart_controller;
pub mod icon_resolver;
pub mod map_service;
pub mod map_viewport;
pub mod selection_service;
pub mod surface;
pub mod time_series_binder;
pub mod well_map_controller;
pub mod well_source;
