//! Renders the trip list as a one-sheet Excel workbook for download.

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use thiserror::Error;

use crate::models::trip::TripRecord;

pub const SHEET_NAME: &str = "رحلات نايلوس";

pub const HEADERS: [&str; 16] = [
    "رقم الرحلة",
    "تاريخ الرحلة",
    "وقت الرحلة",
    "مدة الرحلة",
    "عدد المتواجدين",
    "تكلفة الرحلة",
    "تكلفة الخدمات الإضافية",
    "نوع الخدمة الإضافية",
    "إجمالي التكلفة",
    "نوع الرحلة",
    "اسم المطعم",
    "اسم المركب/الزودياك",
    "المسؤول عن الرحلة",
    "تابعة للمول",
    "ملاحظات إضافية",
    "تاريخ التسجيل",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("لا توجد رحلات مسجلة للتصدير")]
    EmptySource,
    #[error(transparent)]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

pub fn file_name(today: NaiveDate) -> String {
    format!("naylos_trips_{}.xlsx", today.format("%Y-%m-%d"))
}

/// One worksheet row per record, in header order. Kept separate from the
/// workbook writing so the projection is assertable in tests.
pub fn rows(records: &[TripRecord]) -> Vec<[String; 16]> {
    records
        .iter()
        .map(|record| {
            [
                record.trip_number.to_string(),
                record.trip_date.to_string(),
                record.trip_time.clone(),
                record.trip_duration.clone(),
                record.num_attendees.to_string(),
                record.trip_cost.to_string(),
                record.extra_cost.to_string(),
                placeholder(&record.extra_service),
                record.total_cost.to_string(),
                record.trip_type.label().to_string(),
                placeholder(&record.restaurants_joined()),
                record.vessel_name.clone(),
                record.trip_manager.clone(),
                record.mall_text().to_string(),
                placeholder(&record.additional_notes),
                record.created_at.clone(),
            ]
        })
        .collect()
}

fn placeholder(text: &str) -> String {
    if text.trim().is_empty() {
        "-".to_string()
    } else {
        text.to_string()
    }
}

/// Serialized `.xlsx` workbook, or `EmptySource` when there is nothing to
/// export (no file is produced in that case).
pub fn workbook(records: &[TripRecord]) -> Result<Vec<u8>, ExportError> {
    if records.is_empty() {
        return Err(ExportError::EmptySource);
    }

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in rows(records).iter().enumerate() {
        for (col, cell) in row.iter().enumerate() {
            sheet.write_string(idx as u32 + 1, col as u16, cell.as_str())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}
