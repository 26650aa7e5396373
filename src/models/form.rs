use chrono::{DateTime, Local};
use serde::Deserialize;

use super::trip::{DEFAULT_MANAGER, DEFAULT_VESSEL};

/// Raw form submission, everything still text. Derivation turns this plus
/// the current store contents into a `TripRecord`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripForm {
    #[serde(default)]
    pub trip_date: String,
    #[serde(default)]
    pub trip_time: String,
    #[serde(default)]
    pub duration_hours: String,
    #[serde(default)]
    pub duration_minutes: String,
    #[serde(default)]
    pub num_attendees: String,
    #[serde(default)]
    pub trip_cost: String,
    #[serde(default)]
    pub extra_cost: String,
    #[serde(default)]
    pub extra_service: String,
    #[serde(default)]
    pub trip_type: String,
    #[serde(default)]
    pub restaurant_name: Vec<String>,
    #[serde(default = "default_vessel")]
    pub vessel_name: String,
    #[serde(default = "default_manager")]
    pub trip_manager: String,
    #[serde(default)]
    pub additional_notes: String,
    #[serde(default)]
    pub is_mall: bool,
}

fn default_vessel() -> String {
    DEFAULT_VESSEL.to_string()
}

fn default_manager() -> String {
    DEFAULT_MANAGER.to_string()
}

impl TripForm {
    /// Empty form with date and time prefilled, as shown on page load and
    /// after a successful submission.
    pub fn with_defaults(now: DateTime<Local>) -> Self {
        Self {
            trip_date: now.date_naive().to_string(),
            trip_time: now.format("%H:%M").to_string(),
            duration_hours: String::new(),
            duration_minutes: String::new(),
            num_attendees: String::new(),
            trip_cost: String::new(),
            extra_cost: String::new(),
            extra_service: String::new(),
            trip_type: String::new(),
            restaurant_name: Vec::new(),
            vessel_name: default_vessel(),
            trip_manager: default_manager(),
            additional_notes: String::new(),
            is_mall: false,
        }
    }

    /// Combined `HH:MM` duration from the two selects. A single filled half
    /// is padded with "00"; both empty means the duration is missing.
    pub fn trip_duration(&self) -> String {
        let hours = self.duration_hours.trim();
        let minutes = self.duration_minutes.trim();
        if hours.is_empty() && minutes.is_empty() {
            return String::new();
        }
        format!(
            "{:0>2}:{:0>2}",
            if hours.is_empty() { "00" } else { hours },
            if minutes.is_empty() { "00" } else { minutes },
        )
    }
}
