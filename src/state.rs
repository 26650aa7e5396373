use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    config::AppConfig,
    models::trip::TripRecord,
    services::{sheet::SyncStatus, storage::RecordStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub sheet_queue: mpsc::Sender<TripRecord>,
    pub sync: SyncStatus,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn RecordStore>,
        sheet_queue: mpsc::Sender<TripRecord>,
        sync: SyncStatus,
    ) -> Self {
        Self {
            config,
            store,
            sheet_queue,
            sync,
        }
    }
}
