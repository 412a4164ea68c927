// Map service - Use case for refreshing the well map from the source
use crate::application::surface::MapMount;
use crate::application::well_map_controller::WellMapController;
use crate::application::well_source::WellSource;
use crate::domain::error::{Result, VizError};
use crate::domain::well::{Well, WellRecord};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshReport {
    pub received: usize,
    pub rendered: usize,
    pub rejected: Vec<String>,
    /// False when a newer refresh overtook this one.
    pub applied: bool,
}

pub struct MapService<M: MapMount> {
    source: Arc<dyn WellSource>,
    controller: Arc<Mutex<WellMapController<M>>>,
}

impl<M: MapMount> Clone for MapService<M> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            controller: self.controller.clone(),
        }
    }
}

impl<M: MapMount> MapService<M> {
    pub fn new(source: Arc<dyn WellSource>, controller: Arc<Mutex<WellMapController<M>>>) -> Self {
        Self { source, controller }
    }

    pub fn controller(&self) -> &Arc<Mutex<WellMapController<M>>> {
        &self.controller
    }

    /// Re-fetch every well and rebuild the map. On fetch failure the map keeps
    /// its current markers.
    pub async fn refresh(&self) -> Result<RefreshReport> {
        let ticket = self.controller.lock().await.begin_refresh();

        let records = self.source.list_wells().await.map_err(|e| {
            tracing::error!("Error fetching wells: {:#}", e);
            VizError::FetchFailed(format!("{:#}", e))
        })?;
        let received = records.len();
        let (wells, rejected) = validate_wells(records);

        let outcome = self.controller.lock().await.complete_refresh(ticket, wells);
        Ok(RefreshReport {
            received,
            rendered: outcome.unwrap_or(0),
            rejected: rejected.iter().map(ToString::to_string).collect(),
            applied: outcome.is_some(),
        })
    }
}

/// Split raw records into valid wells and the reasons others were rejected.
pub fn validate_wells(records: Vec<WellRecord>) -> (Vec<Well>, Vec<VizError>) {
    let mut wells = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        match Well::try_from(record) {
            Ok(well) => wells.push(well),
            Err(e) => {
                tracing::error!("Rejected well record: {}", e);
                rejected.push(e);
            }
        }
    }

    (wells, rejected)
}
