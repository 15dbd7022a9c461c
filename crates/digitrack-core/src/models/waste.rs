use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A truckload of mixed waste received at the facility gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteIntake {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub mrf_id: String,
    pub vehicle_id: String,
    pub weight: f64,
    pub date: DateTime<Utc>,
    pub operator_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Client payload for a new intake record. The server replaces
/// `operator_id` with the authenticated user's id; it is sent anyway
/// because the API validates the field as required.
#[derive(Debug, Clone, Serialize)]
pub struct NewWasteIntake {
    pub mrf_id: String,
    pub vehicle_id: String,
    pub weight: f64,
    pub date: DateTime<Utc>,
    pub operator_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A portion of an intake sorted into one recovered-material category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortedWaste {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub intake_id: String,
    pub category: String,
    pub weight: f64,
    pub operator_id: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewSortedWaste {
    pub intake_id: String,
    pub category: String,
    pub weight: f64,
    pub date: DateTime<Utc>,
    pub operator_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A recoverable-material category with its going unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit_price: f64,
}
