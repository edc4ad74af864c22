//! Calendar date helpers. Dates travel as `YYYY-MM-DD` strings.

use chrono::{NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Parse a `YYYY-MM-DD` value, naming the field in the error.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| format!("{} must be a date formatted YYYY-MM-DD, got '{}'", field, value))
}

/// Validate an optional date field, returning the normalised string.
pub fn validate_optional(field: &str, value: Option<String>) -> Result<Option<String>, String> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => parse_date(field, &v).map(|d| Some(d.format(DATE_FORMAT).to_string())),
        None => Ok(None),
    }
}

/// Inclusive range overlap.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// A due date strictly before today is overdue.
pub fn is_overdue(due_date: Option<&str>, today: NaiveDate) -> bool {
    due_date
        .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
        .map(|d| d < today)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        assert!(parse_date("due_date", "2024-02-30").is_err());
        assert!(parse_date("due_date", "03/04/2024").is_err());
        let err = parse_date("due_date", "tomorrow").unwrap_err();
        assert!(err.contains("due_date"));
        assert_eq!(parse_date("due_date", " 2024-03-04 ").unwrap(), d("2024-03-04"));
    }

    #[test]
    fn test_validate_optional_blank_is_none() {
        assert_eq!(validate_optional("purchase_date", Some("  ".into())), Ok(None));
        assert_eq!(validate_optional("purchase_date", None), Ok(None));
        assert!(validate_optional("purchase_date", Some("2024-13-01".into())).is_err());
    }

    #[test]
    fn test_ranges_overlap_is_inclusive() {
        assert!(ranges_overlap(d("2024-01-01"), d("2024-01-05"), d("2024-01-05"), d("2024-01-09")));
        assert!(ranges_overlap(d("2024-01-03"), d("2024-01-04"), d("2024-01-01"), d("2024-01-09")));
        assert!(!ranges_overlap(d("2024-01-01"), d("2024-01-04"), d("2024-01-05"), d("2024-01-09")));
    }

    #[test]
    fn test_is_overdue() {
        let today = d("2024-06-10");
        assert!(is_overdue(Some("2024-06-09"), today));
        assert!(!is_overdue(Some("2024-06-10"), today));
        assert!(!is_overdue(None, today));
        assert!(!is_overdue(Some("garbage"), today));
    }
}
