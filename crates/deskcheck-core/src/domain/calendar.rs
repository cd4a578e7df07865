//! Calendar helpers for trade and mark dates.

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Weekday};

use crate::ValidationError;

const ISO_DATE: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(value: &str) -> Result<Date, ValidationError> {
    Date::parse(value.trim(), ISO_DATE).map_err(|_| ValidationError::InvalidDate {
        value: value.to_owned(),
    })
}

/// Format a date back to ISO `YYYY-MM-DD`.
pub fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE)
        .unwrap_or_else(|_| date.to_string())
}

/// Saturday/Sunday check; no holiday calendar is applied.
pub fn is_weekend(date: Date) -> bool {
    matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// Walk forward `days` business days from `start`, skipping weekends.
pub fn add_business_days(start: Date, days: u32) -> Date {
    let mut current = start;
    let mut remaining = days;
    while remaining > 0 {
        current = current.next_day().unwrap_or(current);
        if !is_weekend(current) {
            remaining -= 1;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_iso_date("2024-06-05").unwrap(), date!(2024 - 06 - 05));
        assert!(parse_iso_date("06/05/2024").is_err());
        assert!(parse_iso_date("2024-13-01").is_err());
    }

    #[test]
    fn round_trips_formatting() {
        assert_eq!(format_iso_date(date!(2024 - 06 - 05)), "2024-06-05");
    }

    #[test]
    fn detects_weekends() {
        assert!(is_weekend(date!(2024 - 06 - 08))); // Saturday
        assert!(is_weekend(date!(2024 - 06 - 09))); // Sunday
        assert!(!is_weekend(date!(2024 - 06 - 10)));
    }

    #[test]
    fn business_day_walk_skips_weekends() {
        // Wednesday + 2 business days = Friday.
        assert_eq!(
            add_business_days(date!(2024 - 06 - 05), 2),
            date!(2024 - 06 - 07)
        );
        // Thursday + 2 business days = Monday.
        assert_eq!(
            add_business_days(date!(2024 - 06 - 06), 2),
            date!(2024 - 06 - 10)
        );
        // Friday start, zero days is a no-op.
        assert_eq!(
            add_business_days(date!(2024 - 06 - 07), 0),
            date!(2024 - 06 - 07)
        );
    }
}
