//! Lenient coercion of submitted form values.
//!
//! Optional fields never fail a save: anything that does not parse becomes
//! `None` (or `false`) and the caller stores the column default.

use crate::types::{Date, DbId};

/// Parse a record id. Only positive integers identify an existing row, so an
/// empty string, `"0"`, or garbage all mean "no id".
pub fn parse_id(value: &str) -> Option<DbId> {
    value.trim().parse::<DbId>().ok().filter(|id| *id > 0)
}

/// Parse an optional integer metric.
///
/// Decimal input is truncated toward zero (`"12.9"` -> `12`).
pub fn parse_optional_int(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(n) = value.parse::<i32>() {
        return Some(n);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
        .map(|f| f.trunc() as i32)
}

/// Parse a performance score, clamped to `0..=100`.
pub fn parse_score(value: &str) -> Option<i32> {
    parse_optional_int(value).map(|n| n.clamp(0, 100))
}

/// Parse an optional `YYYY-MM-DD` date. Empty or whitespace-only input is
/// `None`, never an empty-string date.
pub fn parse_optional_date(value: &str) -> Option<Date> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match Date::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::debug!(value, "Ignoring unparseable date");
            None
        }
    }
}

/// Interpret a checkbox / toggle value.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Trimmed text, or `None` when blank.
pub fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn optional_int_coercion() {
        assert_eq!(parse_optional_int("1200"), Some(1200));
        assert_eq!(parse_optional_int("12.9"), Some(12));
        assert_eq!(parse_optional_int(""), None);
        assert_eq!(parse_optional_int("lots"), None);
        assert_eq!(parse_optional_int("1e20"), None);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(parse_score("150"), Some(100));
        assert_eq!(parse_score("-5"), Some(0));
        assert_eq!(parse_score("88"), Some(88));
        assert_eq!(parse_score(" "), None);
    }

    #[test]
    fn blank_dates_are_none() {
        assert_eq!(parse_optional_date(""), None);
        assert_eq!(parse_optional_date("   "), None);
        assert_eq!(parse_optional_date("2024-13-01"), None);
        assert_eq!(
            parse_optional_date("2024-03-09"),
            Date::from_ymd_opt(2024, 3, 9)
        );
    }

    #[test]
    fn flags() {
        assert!(parse_flag("1"));
        assert!(parse_flag("on"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank("  x "), Some("x".to_string()));
        assert_eq!(non_blank("\n\t"), None);
    }
}
