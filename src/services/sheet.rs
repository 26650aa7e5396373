//! Best-effort bridge to the spreadsheet row store: a one-time bootstrap of
//! the local list when it is empty, and a fire-and-forget push of every new
//! trip. Neither direction retries; a failure never touches local data.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Local, NaiveDate};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use url::Url;

use crate::{
    derive::CREATED_AT_FORMAT,
    error::AppError,
    models::trip::{TripRecord, TripType, DEFAULT_MANAGER, DEFAULT_VESSEL, RESTAURANT_SEPARATOR},
    services::storage::RecordStore,
};

/// Remote column contract. Each attribute lists the canonical sheet column
/// first, then the aliases older sheets used for it.
pub const REMOTE_SCHEMA_VERSION: u32 = 1;

const COL_ID: &[&str] = &["_id"];
const COL_TRIP_NUMBER: &[&str] = &["tripNumber"];
const COL_TRIP_DATE: &[&str] = &["tripDate"];
const COL_TRIP_TIME: &[&str] = &["tripTime"];
const COL_TRIP_DURATION: &[&str] = &["tripDuration"];
const COL_PARTICIPANTS: &[&str] = &["participants", "numAttendees"];
const COL_TRIP_COST: &[&str] = &["tripCost"];
const COL_EXTRA_COST: &[&str] = &["extraCost"];
const COL_EXTRA_SERVICE: &[&str] = &["extraService"];
const COL_TOTAL_COST: &[&str] = &["totalCost"];
const COL_TRIP_TYPE: &[&str] = &["tripType"];
const COL_RESTAURANT: &[&str] = &["restaurant", "restaurantName"];
const COL_BOAT: &[&str] = &["boat", "vesselName"];
const COL_MANAGER: &[&str] = &["manager", "tripManager"];
const COL_MALL: &[&str] = &["mall", "isMall"];
const COL_NOTES: &[&str] = &["notes", "additionalNotes"];
const COL_CREATED_AT: &[&str] = &["createdAt"];

const MALL_YES: &str = "نعم";
const MALL_NO: &str = "لا";

/// One row in the remote schema, as POSTed on push.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetRow {
    trip_number: u32,
    trip_date: NaiveDate,
    trip_time: String,
    trip_duration: String,
    participants: u32,
    trip_cost: f64,
    extra_cost: f64,
    extra_service: String,
    total_cost: f64,
    trip_type: &'static str,
    restaurant: String,
    boat: String,
    manager: String,
    mall: &'static str,
    notes: String,
    created_at: String,
}

impl SheetRow {
    fn from_record(record: &TripRecord) -> Self {
        Self {
            trip_number: record.trip_number,
            trip_date: record.trip_date,
            trip_time: record.trip_time.clone(),
            trip_duration: record.trip_duration.clone(),
            participants: record.num_attendees,
            trip_cost: record.trip_cost,
            extra_cost: record.extra_cost,
            extra_service: record.extra_service.clone(),
            total_cost: record.total_cost,
            trip_type: record.trip_type.as_wire(),
            restaurant: record.restaurants_joined(),
            boat: record.vessel_name.clone(),
            manager: record.trip_manager.clone(),
            mall: if record.is_mall { MALL_YES } else { MALL_NO },
            notes: record.additional_notes.clone(),
            created_at: record.created_at.clone(),
        }
    }
}

fn text_cell(row: &Value, columns: &[&str]) -> Option<String> {
    columns.iter().find_map(|name| match row.get(name) {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn number_cell(row: &Value, columns: &[&str]) -> Option<f64> {
    columns.iter().find_map(|name| match row.get(name) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// The mall flag arrives as the localized affirmative, a native boolean, or
/// a boolean under the legacy alias; anything else is `false`.
fn flag_cell(row: &Value, columns: &[&str]) -> bool {
    columns.iter().any(|name| match row.get(name) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.trim() == MALL_YES,
        _ => false,
    })
}

fn restaurants_cell(row: &Value, columns: &[&str]) -> Vec<String> {
    for name in columns {
        match row.get(name) {
            Some(Value::String(joined)) => {
                return joined
                    .split(RESTAURANT_SEPARATOR)
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(String::from)
                    .collect();
            }
            Some(Value::Array(items)) => {
                return items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(String::from)
                    .collect();
            }
            _ => {}
        }
    }
    Vec::new()
}

/// Maps one remote row into the local record shape. A row without a usable
/// trip date makes the whole payload malformed.
fn record_from_row(
    row: &Value,
    idx: usize,
    now: DateTime<Local>,
) -> Result<TripRecord, anyhow::Error> {
    let trip_date = text_cell(row, COL_TRIP_DATE)
        .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
        .ok_or_else(|| anyhow!("row {idx} has no usable tripDate"))?;

    let trip_type = text_cell(row, COL_TRIP_TYPE)
        .and_then(|raw| TripType::from_wire(&raw))
        .unwrap_or_else(|| {
            warn!(row = idx, "unknown trip type in sheet row, treating as nile");
            TripType::Nile
        });

    let trip_cost = number_cell(row, COL_TRIP_COST).unwrap_or(0.0);
    let extra_cost = number_cell(row, COL_EXTRA_COST).unwrap_or(0.0);
    let total_cost = number_cell(row, COL_TOTAL_COST)
        .filter(|total| *total > 0.0)
        .unwrap_or(trip_cost + extra_cost);

    let restaurant_name = if trip_type.serves_food_or_drink() {
        restaurants_cell(row, COL_RESTAURANT)
    } else {
        Vec::new()
    };

    Ok(TripRecord {
        id: number_cell(row, COL_ID)
            .map(|id| id as i64)
            .unwrap_or_else(|| now.timestamp_millis() + idx as i64),
        trip_date,
        trip_time: text_cell(row, COL_TRIP_TIME).unwrap_or_default(),
        trip_duration: text_cell(row, COL_TRIP_DURATION).unwrap_or_default(),
        num_attendees: number_cell(row, COL_PARTICIPANTS).unwrap_or(0.0) as u32,
        trip_cost,
        extra_cost,
        extra_service: text_cell(row, COL_EXTRA_SERVICE).unwrap_or_default(),
        total_cost,
        trip_type,
        restaurant_name,
        vessel_name: text_cell(row, COL_BOAT).unwrap_or_else(|| DEFAULT_VESSEL.to_string()),
        trip_manager: text_cell(row, COL_MANAGER).unwrap_or_else(|| DEFAULT_MANAGER.to_string()),
        additional_notes: text_cell(row, COL_NOTES).unwrap_or_default(),
        is_mall: flag_cell(row, COL_MALL),
        trip_number: number_cell(row, COL_TRIP_NUMBER)
            .map(|n| n as u32)
            .unwrap_or(idx as u32 + 1),
        created_at: text_cell(row, COL_CREATED_AT)
            .unwrap_or_else(|| now.format(CREATED_AT_FORMAT).to_string()),
    })
}

#[derive(Clone)]
pub struct SheetClient {
    http: Client,
    endpoint: Url,
}

impl SheetClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    /// All remote rows, mapped into the local record shape.
    pub async fn fetch_all(&self) -> Result<Vec<TripRecord>, AppError> {
        let rows: Vec<Value> = self
            .http
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let now = Local::now();
        rows.iter()
            .enumerate()
            .map(|(idx, row)| record_from_row(row, idx, now).map_err(AppError::Other))
            .collect()
    }

    /// Appends one row in the remote schema.
    pub async fn push(&self, record: &TripRecord) -> Result<(), AppError> {
        self.http
            .post(self.endpoint.clone())
            .json(&SheetRow::from_record(record))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Outcome of the background sync calls, shown as banners on the next page
/// render. Both slots are one-shot: reading takes the message.
#[derive(Clone, Default)]
pub struct SyncStatus {
    inner: Arc<RwLock<SyncState>>,
}

#[derive(Default)]
struct SyncState {
    notice: Option<String>,
    error: Option<String>,
}

impl SyncStatus {
    pub async fn set_notice(&self, text: impl Into<String>) {
        self.inner.write().await.notice = Some(text.into());
    }

    pub async fn set_error(&self, text: impl Into<String>) {
        self.inner.write().await.error = Some(text.into());
    }

    pub async fn take_notice(&self) -> Option<String> {
        self.inner.write().await.notice.take()
    }

    pub async fn take_error(&self) -> Option<String> {
        self.inner.write().await.error.take()
    }
}

/// Spawns the push worker and returns the queue feeding it. The submit
/// handler enqueues and moves on; a failed push is reported and dropped,
/// the local record stays committed.
pub fn spawn_push_worker(client: SheetClient, status: SyncStatus) -> mpsc::Sender<TripRecord> {
    let (tx, mut rx) = mpsc::channel::<TripRecord>(32);
    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            match client.push(&record).await {
                Ok(()) => {
                    info!(trip_number = record.trip_number, "trip pushed to sheet");
                    status
                        .set_notice("تم إرسال الرحلة بنجاح إلى Google Sheet ✅")
                        .await;
                }
                Err(err) => {
                    warn!("sheet push failed: {err}");
                    status
                        .set_error("حصل خطأ أثناء الإرسال إلى Google Sheet ❌")
                        .await;
                }
            }
        }
    });
    tx
}

/// One-time seed of the local store from the sheet, only when the store is
/// empty. Any failure degrades to a no-op; nothing retries.
pub async fn bootstrap_if_empty(
    client: SheetClient,
    store: Arc<dyn RecordStore>,
    status: SyncStatus,
) {
    match store.load().await {
        Ok(existing) if !existing.is_empty() => return,
        Ok(_) => {}
        Err(err) => {
            warn!("skipping sheet bootstrap, store unreadable: {err}");
            return;
        }
    }

    match client.fetch_all().await {
        Ok(records) if records.is_empty() => {
            info!("sheet is empty, nothing to bootstrap");
        }
        Ok(records) => match store.replace_all(records).await {
            Ok(()) => {
                info!("local store seeded from sheet");
                status
                    .set_notice("تم جلب الرحلات من Google Sheet (محليًا).")
                    .await;
            }
            Err(err) => warn!("persisting bootstrapped trips failed: {err}"),
        },
        Err(err) => {
            warn!("sheet bootstrap failed: {err}");
            status.set_error("خطأ في جلب البيانات من الشيت").await;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn sample_record() -> TripRecord {
        TripRecord {
            id: 1750000000000,
            trip_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            trip_time: "14:30".into(),
            trip_duration: "02:30".into(),
            num_attendees: 12,
            trip_cost: 1500.0,
            extra_cost: 250.0,
            extra_service: "تصوير".into(),
            total_cost: 1750.0,
            trip_type: TripType::FoodAndDrink,
            restaurant_name: vec!["وردة".into(), "موخيتو".into()],
            vessel_name: DEFAULT_VESSEL.into(),
            trip_manager: DEFAULT_MANAGER.into(),
            additional_notes: "حجز عائلي".into(),
            is_mall: false,
            trip_number: 3,
            created_at: "15/06/2025 14:25:00".into(),
        }
    }

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 15, 14, 30, 0).unwrap()
    }

    #[test]
    fn push_payload_round_trips_through_the_bootstrap_mapping() {
        let record = sample_record();
        let row = serde_json::to_value(SheetRow::from_record(&record)).unwrap();
        let mapped = record_from_row(&row, 0, fixed_now()).unwrap();

        // `id` is not represented remotely and is re-synthesized.
        assert_eq!(mapped.trip_date, record.trip_date);
        assert_eq!(mapped.trip_time, record.trip_time);
        assert_eq!(mapped.trip_duration, record.trip_duration);
        assert_eq!(mapped.num_attendees, record.num_attendees);
        assert_eq!(mapped.trip_cost, record.trip_cost);
        assert_eq!(mapped.extra_cost, record.extra_cost);
        assert_eq!(mapped.extra_service, record.extra_service);
        assert_eq!(mapped.total_cost, record.total_cost);
        assert_eq!(mapped.trip_type, record.trip_type);
        assert_eq!(mapped.restaurant_name, record.restaurant_name);
        assert_eq!(mapped.vessel_name, record.vessel_name);
        assert_eq!(mapped.trip_manager, record.trip_manager);
        assert_eq!(mapped.additional_notes, record.additional_notes);
        assert_eq!(mapped.is_mall, record.is_mall);
        assert_eq!(mapped.trip_number, record.trip_number);
        assert_eq!(mapped.created_at, record.created_at);
    }

    #[test]
    fn legacy_aliases_are_honored_on_bootstrap() {
        let row = json!({
            "tripDate": "2025-06-20",
            "tripTime": "09:00",
            "tripDuration": "01:00",
            "numAttendees": "8",
            "tripCost": "400",
            "tripType": "drink",
            "restaurantName": "كيمس ، وردة",
            "vesselName": "أباظة",
            "tripManager": "شركة أباظة",
            "additionalNotes": "ملاحظة",
            "isMall": true,
        });
        let record = record_from_row(&row, 4, fixed_now()).unwrap();
        assert_eq!(record.num_attendees, 8);
        assert_eq!(record.trip_cost, 400.0);
        assert_eq!(record.total_cost, 400.0);
        assert_eq!(
            record.restaurant_name,
            vec!["كيمس".to_string(), "وردة".to_string()]
        );
        assert_eq!(record.additional_notes, "ملاحظة");
        assert!(record.is_mall);
        // No tripNumber column: falls back to the row position.
        assert_eq!(record.trip_number, 5);
    }

    #[test]
    fn localized_affirmative_and_native_bool_both_mean_mall() {
        let base = json!({"tripDate": "2025-06-20"});

        let mut row = base.clone();
        row["mall"] = json!("نعم");
        assert!(record_from_row(&row, 0, fixed_now()).unwrap().is_mall);

        let mut row = base.clone();
        row["mall"] = json!(true);
        assert!(record_from_row(&row, 0, fixed_now()).unwrap().is_mall);

        let mut row = base.clone();
        row["mall"] = json!("لا");
        assert!(!record_from_row(&row, 0, fixed_now()).unwrap().is_mall);

        let mut row = base;
        row["mall"] = json!("yes");
        assert!(!record_from_row(&row, 0, fixed_now()).unwrap().is_mall);
    }

    #[test]
    fn row_without_a_date_is_malformed() {
        let row = json!({"tripTime": "09:00"});
        assert!(record_from_row(&row, 0, fixed_now()).is_err());
    }

    #[test]
    fn unknown_trip_type_normalizes_to_nile_and_drops_restaurants() {
        let row = json!({
            "tripDate": "2025-06-20",
            "tripType": "cruise",
            "restaurant": "وردة",
        });
        let record = record_from_row(&row, 0, fixed_now()).unwrap();
        assert_eq!(record.trip_type, TripType::Nile);
        assert!(record.restaurant_name.is_empty());
    }
}
