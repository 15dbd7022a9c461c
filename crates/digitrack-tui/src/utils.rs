//! Formatting helpers for tables and detail panes.

use chrono::{DateTime, Utc};

/// Format a weight in kilograms for display
pub fn format_weight(kg: f64) -> String {
    if kg >= 1000.0 {
        format!("{:.2} t", kg / 1000.0)
    } else {
        format!("{:.1} kg", kg)
    }
}

/// Format a money amount with two decimals
pub fn format_amount(amount: f64) -> String {
    format!("₹{:.2}", amount)
}

/// Date portion of a timestamp, for table cells
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(410.5), "410.5 kg");
        assert_eq!(format_weight(1250.0), "1.25 t");
        assert_eq!(format_weight(0.0), "0.0 kg");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(3600.0), "₹3600.00");
        assert_eq!(format_amount(0.5), "₹0.50");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
    }
}
