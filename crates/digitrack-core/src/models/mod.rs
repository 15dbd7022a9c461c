//! Data models for MRF DigiTrack entities.
//!
//! This module contains all the data structures exchanged with the
//! DigiTrack API:
//!
//! - `User`, `Role`, `UserCreate`: facility staff accounts
//! - `WasteIntake`, `SortedWaste`, `WasteCategory`: waste tracking records
//! - `WasteSale`, `SalesSummary`: recovered-material sales
//! - Report types: `DailyReport`, `MonthlyReport`, `PanchayatReport`

pub mod report;
pub mod sale;
pub mod user;
pub mod waste;

pub use report::{
    CategoryWeight, DailyReport, IntakeSummary, MonthlyReport, MonthlyTotals, MrfSummary,
    PanchayatReport,
};
pub use sale::{CategorySales, NewWasteSale, OverallSales, SalesSummary, WasteSale};
pub use user::{Role, User, UserCreate};
pub use waste::{NewSortedWaste, NewWasteIntake, SortedWaste, WasteCategory, WasteIntake};
