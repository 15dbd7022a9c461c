use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::sale::CategorySales;

/// Intake rollup inside a daily report. The aggregation's `_id` (always
/// null) is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeSummary {
    #[serde(default)]
    pub total_weight: f64,
    #[serde(default)]
    pub count: i64,
}

/// Weight sorted into one category for the reporting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeight {
    #[serde(rename = "_id")]
    pub category: String,
    pub total_weight: f64,
}

/// Response of `GET /reports/daily`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub waste_intake: IntakeSummary,
    #[serde(default)]
    pub sorted_waste: Vec<CategoryWeight>,
    #[serde(default)]
    pub sales: Vec<CategorySales>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyTotals {
    #[serde(default)]
    pub total_intake_weight: f64,
    #[serde(default)]
    pub total_intake_count: i64,
    #[serde(default)]
    pub total_sales_amount: f64,
    #[serde(default)]
    pub total_sales_weight: f64,
}

/// Response of `GET /reports/monthly`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub daily_summaries: Vec<DailyReport>,
    #[serde(default)]
    pub monthly_totals: MonthlyTotals,
}

/// Per-facility rollup inside the panchayat report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MrfSummary {
    #[serde(default)]
    pub total_intake_weight: f64,
    #[serde(default)]
    pub intake_count: i64,
    #[serde(default)]
    pub total_sales_amount: f64,
    #[serde(default)]
    pub total_sales_weight: f64,
    #[serde(default)]
    pub transaction_count: i64,
}

/// Response of `GET /reports/panchayat` (panchayat role only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanchayatReport {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub mrf_summary: HashMap<String, MrfSummary>,
    #[serde(default)]
    pub overall_totals: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_report_tolerates_aggregation_ids() {
        let json = r#"{
            "date": "2026-02-03",
            "waste_intake": {"_id": null, "total_weight": 410.5, "count": 1},
            "sorted_waste": [{"_id": "PET", "total_weight": 95.0}],
            "sales": []
        }"#;
        let report: DailyReport = serde_json::from_str(json).expect("valid report");
        assert_eq!(report.waste_intake.count, 1);
        assert_eq!(report.sorted_waste[0].category, "PET");
        assert!(report.sales.is_empty());
    }

    #[test]
    fn daily_report_empty_intake_defaults() {
        let json = r#"{"date": "2026-02-03", "waste_intake": {"total_weight": 0, "count": 0}}"#;
        let report: DailyReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.waste_intake.total_weight, 0.0);
        assert!(report.sorted_waste.is_empty());
    }
}
