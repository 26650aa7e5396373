use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Vessel and manager are fixed for the current operation; they stay fields
/// so a future form revision can make them editable.
pub const DEFAULT_VESSEL: &str = "أباظة";
pub const DEFAULT_MANAGER: &str = "شركة أباظة";

/// Restaurant catalog shown as checkboxes. The last entry is the free-text
/// "other" category.
pub const RESTAURANTS: [&str; 8] = [
    "دار نورة",
    "وردة",
    "سكند كب",
    "موخيتو",
    "كيمس",
    "انكل زاك",
    "نيليرا/ عشق الخليج",
    "اخري",
];

/// Separator used whenever the restaurant set travels as one sheet cell.
pub const RESTAURANT_SEPARATOR: &str = " ، ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "nile")]
    Nile,
    #[serde(rename = "food and drink")]
    FoodAndDrink,
    #[serde(rename = "drink")]
    Drink,
}

impl TripType {
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "nile" => Some(TripType::Nile),
            "food and drink" => Some(TripType::FoodAndDrink),
            "drink" => Some(TripType::Drink),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            TripType::Nile => "nile",
            TripType::FoodAndDrink => "food and drink",
            TripType::Drink => "drink",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TripType::Nile => "رحلة نيلية",
            TripType::FoodAndDrink => "طعام ومشروبات",
            TripType::Drink => "مشروبات",
        }
    }

    /// Restaurant selection is only meaningful for these two types.
    pub fn serves_food_or_drink(&self) -> bool {
        matches!(self, TripType::FoodAndDrink | TripType::Drink)
    }
}

/// One registered river trip. Created once by derivation, never edited;
/// serialized field names are the store's on-disk contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    pub id: i64,
    pub trip_date: NaiveDate,
    pub trip_time: String,
    pub trip_duration: String,
    pub num_attendees: u32,
    pub trip_cost: f64,
    pub extra_cost: f64,
    #[serde(default)]
    pub extra_service: String,
    pub total_cost: f64,
    pub trip_type: TripType,
    #[serde(default)]
    pub restaurant_name: Vec<String>,
    pub vessel_name: String,
    pub trip_manager: String,
    #[serde(default)]
    pub additional_notes: String,
    pub is_mall: bool,
    pub trip_number: u32,
    pub created_at: String,
}

impl TripRecord {
    pub fn restaurants_joined(&self) -> String {
        self.restaurant_name.join(RESTAURANT_SEPARATOR)
    }

    pub fn mall_text(&self) -> &'static str {
        if self.is_mall {
            "نعم"
        } else {
            "لا"
        }
    }

    /// Humanized form of the `HH:MM` duration for the trips list.
    pub fn duration_text(&self) -> String {
        let mut parts = self.trip_duration.splitn(2, ':');
        let hours: u32 = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0);
        let minutes: u32 = parts
            .next()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0);

        let mut out = Vec::new();
        if hours > 0 {
            out.push(format!(
                "{hours} {}",
                if hours == 1 { "ساعة" } else { "ساعات" }
            ));
        }
        if minutes > 0 {
            out.push(format!("{minutes} دقيقة"));
        }
        if out.is_empty() {
            "0 دقيقة".into()
        } else {
            out.join(" و ")
        }
    }
}
