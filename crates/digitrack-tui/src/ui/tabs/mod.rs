pub mod dashboard;
pub mod intake;
pub mod reports;
pub mod sales;
pub mod sorting;
pub mod users;
