use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sale of recovered material to a buyer. `total_amount` is
/// recomputed server-side as `weight * unit_price`; the value sent by
/// the client is a preview only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasteSale {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub mrf_id: String,
    pub category: String,
    pub weight: f64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_contact: Option<String>,
    pub date: DateTime<Utc>,
    pub operator_id: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWasteSale {
    pub mrf_id: String,
    pub category: String,
    pub weight: f64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub buyer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_contact: Option<String>,
    pub date: DateTime<Utc>,
    pub operator_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Per-category slice of the sales summary aggregation. The grouping key
/// comes back under Mongo's `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySales {
    #[serde(rename = "_id")]
    pub category: String,
    pub total_weight: f64,
    pub total_amount: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallSales {
    pub total_weight: f64,
    pub total_amount: f64,
    pub total_transactions: i64,
}

/// Response of `GET /sales/summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesSummary {
    #[serde(default)]
    pub category_wise: Vec<CategorySales>,
    #[serde(default)]
    pub overall: OverallSales,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_parses_aggregation_shape() {
        let json = r#"{
            "category_wise": [
                {"_id": "PET", "total_weight": 120.0, "total_amount": 3600.0, "count": 4},
                {"_id": "Cardboard", "total_weight": 80.5, "total_amount": 805.0, "count": 2}
            ],
            "overall": {"total_weight": 200.5, "total_amount": 4405.0, "total_transactions": 6}
        }"#;
        let summary: SalesSummary = serde_json::from_str(json).expect("valid summary");
        assert_eq!(summary.category_wise.len(), 2);
        assert_eq!(summary.category_wise[0].category, "PET");
        assert_eq!(summary.overall.total_transactions, 6);
    }

    #[test]
    fn empty_summary_defaults() {
        let summary: SalesSummary = serde_json::from_str("{}").unwrap();
        assert!(summary.category_wise.is_empty());
        assert_eq!(summary.overall.total_amount, 0.0);
    }
}
