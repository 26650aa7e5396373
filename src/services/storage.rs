use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};

use crate::{error::AppError, models::trip::TripRecord};

const TRIPS_FILE: &str = "naylos_trips.json";

/// Persistence boundary for the trip list. The file-backed store is the
/// production medium; the in-memory store backs tests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Full ordered trip list, empty if nothing was ever written.
    async fn load(&self) -> Result<Vec<TripRecord>, AppError>;

    /// Appends one record and persists the whole updated list.
    async fn append(&self, record: TripRecord) -> Result<(), AppError>;

    /// Replaces the whole list. Only the remote bootstrap uses this.
    async fn replace_all(&self, records: Vec<TripRecord>) -> Result<(), AppError>;
}

/// Stores the trip list as one pretty-printed JSON document on disk.
/// Every mutation re-serializes the full list; entry volume is manual, so
/// whole-document writes stay cheap.
#[derive(Clone)]
pub struct JsonFileStore {
    root: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_structure(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.root()).await?;
        Ok(())
    }

    fn trips_path(&self) -> PathBuf {
        self.root().join(TRIPS_FILE)
    }

    async fn read_all(&self) -> Result<Vec<TripRecord>, AppError> {
        let path = self.trips_path();
        if !fs::try_exists(&path).await? {
            return Ok(Vec::new());
        }
        let raw = fs::read(&path).await?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<TripRecord> =
            serde_json::from_slice(&raw).map_err(|err| AppError::Other(err.into()))?;
        Ok(records)
    }

    async fn write_all(&self, records: &[TripRecord]) -> Result<(), AppError> {
        self.ensure_structure().await?;
        let data =
            serde_json::to_vec_pretty(records).map_err(|err| AppError::Other(err.into()))?;
        fs::write(self.trips_path(), data).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<TripRecord>, AppError> {
        self.read_all().await
    }

    async fn append(&self, record: TripRecord) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        records.push(record);
        self.write_all(&records).await
    }

    async fn replace_all(&self, records: Vec<TripRecord>) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        self.write_all(&records).await
    }
}

/// Keeps the trip list in memory only. Used by tests that do not care
/// about the on-disk format.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<TripRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self) -> Result<Vec<TripRecord>, AppError> {
        Ok(self.records.lock().await.clone())
    }

    async fn append(&self, record: TripRecord) -> Result<(), AppError> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn replace_all(&self, records: Vec<TripRecord>) -> Result<(), AppError> {
        *self.records.lock().await = records;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;
    use crate::{derive, models::form::TripForm};

    fn sample_record(n: u32) -> TripRecord {
        let now = Local.with_ymd_and_hms(2025, 6, 15, 9, 0, 0).unwrap();
        let mut form = TripForm::with_defaults(now);
        form.duration_hours = "01".into();
        form.num_attendees = "4".into();
        form.trip_cost = "100".into();
        form.trip_type = "nile".into();
        let mut record = derive::derive(&form, &[], now).unwrap();
        record.trip_number = n;
        record
    }

    #[tokio::test]
    async fn memory_store_preserves_insertion_order() {
        let store = MemoryStore::new();
        for n in 1..=3 {
            store.append(sample_record(n)).await.unwrap();
        }
        let numbers: Vec<u32> = store
            .load()
            .await
            .unwrap()
            .iter()
            .map(|t| t.trip_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn replace_all_overwrites_previous_contents() {
        let store = MemoryStore::new();
        store.append(sample_record(1)).await.unwrap();
        store
            .replace_all(vec![sample_record(7), sample_record(8)])
            .await
            .unwrap();
        let records = store.load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].trip_number, 7);
    }
}
