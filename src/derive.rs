//! Turns a raw form submission plus the current store contents into a
//! fully-populated trip record, or the first validation failure.

use chrono::{DateTime, Local, NaiveDate};
use thiserror::Error;

use crate::models::{
    form::TripForm,
    trip::{TripRecord, TripType},
};

/// Format used for the human-readable registration timestamp.
pub const CREATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Validation failures, in the order the rules run. The messages are the
/// notices shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("يرجى ملء جميع الحقول المطلوبة")]
    MissingField(&'static str),
    #[error("⚠️ تكلفة الرحلة يجب أن تكون أكبر من صفر")]
    InvalidCost,
    #[error("يرجى اختيار مطعم واحد على الأقل")]
    MissingSelection,
    #[error("لا يمكن تسجيل رحلة بتاريخ قديم")]
    PastDate,
}

/// Validates `form` fail-fast and derives the record to append. `existing`
/// is the store's current contents (numbering counts only local records);
/// `now` stamps id, registration timestamp, and the "today" boundary.
pub fn derive(
    form: &TripForm,
    existing: &[TripRecord],
    now: DateTime<Local>,
) -> Result<TripRecord, ValidationError> {
    // A value that does not parse counts the same as a missing one.
    let trip_date = {
        let raw = form.trip_date.trim();
        if raw.is_empty() {
            return Err(ValidationError::MissingField("tripDate"));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ValidationError::MissingField("tripDate"))?
    };

    let trip_time = form.trip_time.trim();
    if trip_time.is_empty() {
        return Err(ValidationError::MissingField("tripTime"));
    }

    let trip_duration = form.trip_duration();
    if trip_duration.is_empty() {
        return Err(ValidationError::MissingField("tripDuration"));
    }

    let num_attendees = form
        .num_attendees
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ValidationError::MissingField("numAttendees"))?;

    let trip_type = TripType::from_wire(form.trip_type.trim())
        .ok_or(ValidationError::MissingField("tripType"))?;

    if form.vessel_name.trim().is_empty() {
        return Err(ValidationError::MissingField("vesselName"));
    }
    if form.trip_manager.trim().is_empty() {
        return Err(ValidationError::MissingField("tripManager"));
    }

    let trip_cost = if form.is_mall {
        0.0
    } else {
        match form.trip_cost.trim().parse::<f64>() {
            Ok(cost) if cost > 0.0 => cost,
            _ => return Err(ValidationError::InvalidCost),
        }
    };

    let restaurant_name = if trip_type.serves_food_or_drink() {
        let selected: Vec<String> = form
            .restaurant_name
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if selected.is_empty() {
            return Err(ValidationError::MissingSelection);
        }
        selected
    } else {
        Vec::new()
    };

    if trip_date < now.date_naive() {
        return Err(ValidationError::PastDate);
    }

    let extra_cost = form
        .extra_cost
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0)
        .max(0.0);

    let trip_number = existing
        .iter()
        .filter(|trip| trip.trip_date == trip_date)
        .count() as u32
        + 1;

    Ok(TripRecord {
        id: now.timestamp_millis(),
        trip_date,
        trip_time: trip_time.to_string(),
        trip_duration,
        num_attendees,
        trip_cost,
        extra_cost,
        extra_service: form.extra_service.trim().to_string(),
        total_cost: trip_cost + extra_cost,
        trip_type,
        restaurant_name,
        vessel_name: form.vessel_name.trim().to_string(),
        trip_manager: form.trip_manager.trim().to_string(),
        additional_notes: form.additional_notes.trim().to_string(),
        is_mall: form.is_mall,
        trip_number,
        created_at: now.format(CREATED_AT_FORMAT).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).unwrap()
    }

    fn valid_form() -> TripForm {
        let mut form = TripForm::with_defaults(fixed_now());
        form.duration_hours = "02".into();
        form.duration_minutes = "30".into();
        form.num_attendees = "12".into();
        form.trip_cost = "1500".into();
        form.extra_cost = "250".into();
        form.trip_type = "nile".into();
        form
    }

    #[test]
    fn total_cost_is_sum_of_parts() {
        let record = derive(&valid_form(), &[], fixed_now()).unwrap();
        assert_eq!(record.trip_cost, 1500.0);
        assert_eq!(record.extra_cost, 250.0);
        assert_eq!(record.total_cost, 1750.0);
    }

    #[test]
    fn mall_trip_forces_zero_cost() {
        let mut form = valid_form();
        form.is_mall = true;
        form.trip_cost = "9999".into();
        let record = derive(&form, &[], fixed_now()).unwrap();
        assert!(record.is_mall);
        assert_eq!(record.trip_cost, 0.0);
        assert_eq!(record.total_cost, record.extra_cost);
    }

    #[test]
    fn numbering_is_gapless_per_date() {
        let mut stored = Vec::new();
        for expected in 1..=4 {
            let record = derive(&valid_form(), &stored, fixed_now()).unwrap();
            assert_eq!(record.trip_number, expected);
            stored.push(record);
        }
    }

    #[test]
    fn numbering_restarts_on_a_new_date() {
        let mut stored = vec![derive(&valid_form(), &[], fixed_now()).unwrap()];
        stored[0].trip_date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let record = derive(&valid_form(), &stored, fixed_now()).unwrap();
        assert_eq!(record.trip_number, 1);
    }

    #[test]
    fn past_date_is_rejected_today_is_not() {
        let mut form = valid_form();
        form.trip_date = "2025-06-14".into();
        assert_eq!(
            derive(&form, &[], fixed_now()),
            Err(ValidationError::PastDate)
        );

        form.trip_date = "2025-06-15".into();
        assert!(derive(&form, &[], fixed_now()).is_ok());
    }

    #[test]
    fn drink_trip_requires_a_restaurant() {
        let mut form = valid_form();
        form.trip_type = "drink".into();
        assert_eq!(
            derive(&form, &[], fixed_now()),
            Err(ValidationError::MissingSelection)
        );

        form.restaurant_name = vec!["وردة".into()];
        let record = derive(&form, &[], fixed_now()).unwrap();
        assert_eq!(record.restaurant_name, vec!["وردة".to_string()]);
    }

    #[test]
    fn nile_trip_drops_restaurant_selection() {
        let mut form = valid_form();
        form.restaurant_name = vec!["وردة".into()];
        let record = derive(&form, &[], fixed_now()).unwrap();
        assert!(record.restaurant_name.is_empty());
    }

    #[test]
    fn missing_fields_are_reported_in_order() {
        let mut form = valid_form();
        form.trip_date.clear();
        form.num_attendees.clear();
        assert_eq!(
            derive(&form, &[], fixed_now()),
            Err(ValidationError::MissingField("tripDate"))
        );

        form.trip_date = "2025-06-15".into();
        assert_eq!(
            derive(&form, &[], fixed_now()),
            Err(ValidationError::MissingField("numAttendees"))
        );
    }

    #[test]
    fn unparseable_date_counts_as_missing() {
        let mut form = valid_form();
        form.trip_date = "yesterday".into();
        assert_eq!(
            derive(&form, &[], fixed_now()),
            Err(ValidationError::MissingField("tripDate"))
        );
    }

    #[test]
    fn zero_cost_without_mall_is_invalid() {
        let mut form = valid_form();
        form.trip_cost = "0".into();
        assert_eq!(derive(&form, &[], fixed_now()), Err(ValidationError::InvalidCost));

        form.trip_cost = "abc".into();
        assert_eq!(derive(&form, &[], fixed_now()), Err(ValidationError::InvalidCost));
    }

    #[test]
    fn unparseable_extra_cost_defaults_to_zero() {
        let mut form = valid_form();
        form.extra_cost = "n/a".into();
        let record = derive(&form, &[], fixed_now()).unwrap();
        assert_eq!(record.extra_cost, 0.0);
        assert_eq!(record.total_cost, record.trip_cost);
    }
}
