use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::Form;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    derive,
    error::AppError,
    models::{
        form::TripForm,
        trip::{TripRecord, RESTAURANTS},
    },
    services::export::{self, ExportError},
    state::AppState,
};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/trips", post(trip_submit))
        .route("/export", get(export_download))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    form: TripForm,
    today: String,
    next_trip_number: u32,
    hour_options: Vec<SelectOption>,
    minute_options: Vec<SelectOption>,
    restaurants: Vec<RestaurantOption>,
    trips: Vec<TripView>,
    trip_count: usize,
    show_error: bool,
    error_message: String,
    show_notice: bool,
    notice_message: String,
    show_sync_notice: bool,
    sync_notice_message: String,
    show_sync_error: bool,
    sync_error_message: String,
}

#[derive(Clone)]
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Clone)]
struct RestaurantOption {
    name: String,
    checked: bool,
}

#[derive(Clone)]
struct TripView {
    trip_number: u32,
    trip_date: String,
    trip_time: String,
    duration: String,
    num_attendees: u32,
    vessel_name: String,
    trip_manager: String,
    type_label: String,
    restaurants: String,
    has_restaurants: bool,
    trip_cost: String,
    extra_cost: String,
    extra_service: String,
    has_extra_service: bool,
    total_cost: String,
    mall: String,
    additional_notes: String,
    has_notes: bool,
    created_at: String,
}

impl TripView {
    fn from_record(record: &TripRecord) -> Self {
        Self {
            trip_number: record.trip_number,
            trip_date: record.trip_date.to_string(),
            trip_time: record.trip_time.clone(),
            duration: record.duration_text(),
            num_attendees: record.num_attendees,
            vessel_name: record.vessel_name.clone(),
            trip_manager: record.trip_manager.clone(),
            type_label: record.trip_type.label().to_string(),
            restaurants: record.restaurants_joined(),
            has_restaurants: !record.restaurant_name.is_empty(),
            trip_cost: record.trip_cost.to_string(),
            extra_cost: record.extra_cost.to_string(),
            extra_service: record.extra_service.clone(),
            has_extra_service: !record.extra_service.trim().is_empty(),
            total_cost: record.total_cost.to_string(),
            mall: record.mall_text().to_string(),
            additional_notes: record.additional_notes.clone(),
            has_notes: !record.additional_notes.trim().is_empty(),
            created_at: record.created_at.clone(),
        }
    }
}

async fn build_page(
    state: &AppState,
    form: TripForm,
    trips: Vec<TripRecord>,
    error: Option<String>,
    notice: Option<String>,
) -> IndexTemplate {
    let sync_notice = state.sync.take_notice().await;
    let sync_error = state.sync.take_error().await;

    let selected_date = NaiveDate::parse_from_str(form.trip_date.trim(), "%Y-%m-%d").ok();
    let next_trip_number = match selected_date {
        Some(date) => trips.iter().filter(|t| t.trip_date == date).count() as u32 + 1,
        None => 1,
    };

    let hour_options = (0..=24)
        .map(|h| SelectOption {
            value: format!("{h:02}"),
            label: format!("{h} ساعة"),
            selected: form.duration_hours == format!("{h:02}"),
        })
        .collect();
    let minute_options = (1..60)
        .map(|m| SelectOption {
            value: format!("{m:02}"),
            label: format!("{m} دقيقة"),
            selected: form.duration_minutes == format!("{m:02}"),
        })
        .collect();

    let restaurants = RESTAURANTS
        .iter()
        .map(|name| RestaurantOption {
            name: name.to_string(),
            checked: form.restaurant_name.iter().any(|chosen| chosen == name),
        })
        .collect();

    IndexTemplate {
        today: Local::now().date_naive().to_string(),
        next_trip_number,
        hour_options,
        minute_options,
        restaurants,
        trip_count: trips.len(),
        trips: trips.iter().map(TripView::from_record).collect(),
        form,
        show_error: error.is_some(),
        error_message: error.unwrap_or_default(),
        show_notice: notice.is_some(),
        notice_message: notice.unwrap_or_default(),
        show_sync_notice: sync_notice.is_some(),
        sync_notice_message: sync_notice.unwrap_or_default(),
        show_sync_error: sync_error.is_some(),
        sync_error_message: sync_error.unwrap_or_default(),
    }
}

#[derive(Deserialize)]
struct IndexQuery {
    saved: Option<u8>,
}

async fn index(
    State(state): State<AppState>,
    Query(query): Query<IndexQuery>,
) -> Result<Response, AppError> {
    let trips = state.store.load().await?;
    let notice = if query.saved.unwrap_or(0) == 1 {
        Some("تم تسجيل الرحلة محليًا!".to_string())
    } else {
        None
    };
    let page = build_page(
        &state,
        TripForm::with_defaults(Local::now()),
        trips,
        None,
        notice,
    )
    .await;
    Ok(AskamaTemplateResponse::into_response(page))
}

async fn trip_submit(
    State(state): State<AppState>,
    Form(form): Form<TripForm>,
) -> Result<Response, AppError> {
    let existing = state.store.load().await?;
    match derive::derive(&form, &existing, Local::now()) {
        Ok(record) => {
            state.store.append(record.clone()).await?;
            info!(
                trip_number = record.trip_number,
                date = %record.trip_date,
                "trip recorded"
            );
            // The local commit stands regardless of what the push does.
            if state.sheet_queue.send(record).await.is_err() {
                warn!("sheet worker unavailable, push skipped");
            }
            Ok(Redirect::to("/?saved=1").into_response())
        }
        Err(err) => {
            let page = build_page(&state, form, existing, Some(err.to_string()), None).await;
            Ok((
                StatusCode::BAD_REQUEST,
                AskamaTemplateResponse::into_response(page),
            )
                .into_response())
        }
    }
}

async fn export_download(State(state): State<AppState>) -> Result<Response, AppError> {
    let trips = state.store.load().await?;
    match export::workbook(&trips) {
        Ok(bytes) => {
            info!(rows = trips.len(), "excel export generated");
            let filename = export::file_name(Local::now().date_naive());
            Ok((
                [
                    (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response())
        }
        Err(ExportError::EmptySource) => {
            let message = ExportError::EmptySource.to_string();
            let page = build_page(
                &state,
                TripForm::with_defaults(Local::now()),
                trips,
                Some(message),
                None,
            )
            .await;
            Ok((
                StatusCode::BAD_REQUEST,
                AskamaTemplateResponse::into_response(page),
            )
                .into_response())
        }
        Err(ExportError::Workbook(err)) => Err(AppError::Workbook(err)),
    }
}
